//! leaklint: flow-sensitive detection of resources opened but never closed.
//!
//! The crate is layered the way the data flows:
//!
//! - [`tree`]: the immutable syntax tree (kind tags, node model, and a
//!   kind-filtered depth-first walk),
//! - [`analysis`]: the close-resource rule, its injectable [`ClosePolicy`],
//!   and rayon-parallel batch driving,
//! - [`report`]: text and serde renderings of the findings.
//!
//! ```
//! use leaklint::analysis::{analyze_unit, ClosePolicy};
//! use leaklint::tree::model::{CompilationUnit, Span, Tree};
//!
//! let unit = Tree::CompilationUnit(CompilationUnit {
//!     package: None,
//!     types: vec![],
//!     span: Span::new(1, 1),
//! });
//! let findings = analyze_unit(&unit, &ClosePolicy::default());
//! assert!(findings.is_empty());
//! ```

pub mod analysis;
pub mod error;
pub mod report;
pub mod tree;

pub use analysis::{analyze_unit, analyze_units, ClosePolicy, Finding};
pub use error::{Result, TreeError};
pub use report::{format_findings_text, UnitReport};
pub use tree::{walk, Dispatcher, Kind, Span, SymbolId, Tree, TreeVisitor};
