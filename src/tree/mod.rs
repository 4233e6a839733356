//! Immutable syntax tree: kind tags, node model, and traversal.

pub mod kind;
pub mod model;
pub mod walk;

pub use kind::{Kind, KIND_COUNT};
pub use model::{Span, SymbolId, Tree};
pub use walk::{walk, Dispatcher, TreeVisitor};
