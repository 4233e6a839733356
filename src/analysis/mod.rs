//! Flow-sensitive analyses over the immutable tree.

pub mod batch;
pub mod close_resource;
pub mod policy;

pub use batch::analyze_units;
pub use close_resource::{analyze_method, analyze_unit, CloseResourceRule, Finding};
pub use policy::ClosePolicy;
