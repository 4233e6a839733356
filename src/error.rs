//! Error types for tree construction and analysis.

use thiserror::Error;

use crate::tree::Kind;

/// Errors raised at the parser boundary when a tree does not conform to the
/// structural contract of its node kinds.
///
/// A [`TreeError::InvalidChild`] is non-recoverable: it indicates a
/// parser/model mismatch, and building of that compilation unit is aborted.
/// A [`TreeError::Unsupported`] is recoverable: callers treat it as "feature
/// not yet covered" and skip the construct rather than failing the analysis.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A child slot holds a node of a kind the grammar does not allow there.
    #[error("{parent:?} node holds a {child:?} child where {expected} is required")]
    InvalidChild {
        parent: Kind,
        child: Kind,
        expected: &'static str,
    },

    /// The construct exists in the grammar but is not yet modeled.
    #[error("construct not implemented: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_child_message_names_both_kinds() {
        let err = TreeError::InvalidChild {
            parent: Kind::If,
            child: Kind::Block,
            expected: "an expression",
        };
        let msg = err.to_string();
        assert!(msg.contains("If"));
        assert!(msg.contains("Block"));
        assert!(msg.contains("an expression"));
    }

    #[test]
    fn unsupported_message_carries_construct_name() {
        let err = TreeError::Unsupported("lambda expression".to_string());
        assert_eq!(
            err.to_string(),
            "construct not implemented: lambda expression"
        );
    }
}
