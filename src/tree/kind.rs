//! Syntactic kind tags.
//!
//! Every tree node carries exactly one [`Kind`]. The set is closed: adding a
//! construct means adding a variant here and a payload struct in
//! [`crate::tree::model`], and the compiler then forces every exhaustive
//! match (traversal, validation, analyses) to handle it.

use serde::{Deserialize, Serialize};

/// Category tag identifying a syntactic construct and its child shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    CompilationUnit,
    Class,
    Method,
    Block,
    If,
    While,
    DoWhile,
    For,
    EnhancedFor,
    Switch,
    CaseGroup,
    Try,
    Catch,
    Variable,
    ExpressionStatement,
    Return,
    Throw,
    Break,
    Continue,
    Empty,
    Labeled,
    Synchronized,
    Assignment,
    Binary,
    Unary,
    Conditional,
    Parenthesized,
    TypeCast,
    InstanceOf,
    ArrayAccess,
    MethodInvocation,
    NewClass,
    NewArray,
    MemberSelect,
    Identifier,
    Literal,
    Unsupported,
}

impl Kind {
    /// All kinds, in declaration order. Used to size interest bitsets.
    pub const ALL: [Kind; 37] = [
        Kind::CompilationUnit,
        Kind::Class,
        Kind::Method,
        Kind::Block,
        Kind::If,
        Kind::While,
        Kind::DoWhile,
        Kind::For,
        Kind::EnhancedFor,
        Kind::Switch,
        Kind::CaseGroup,
        Kind::Try,
        Kind::Catch,
        Kind::Variable,
        Kind::ExpressionStatement,
        Kind::Return,
        Kind::Throw,
        Kind::Break,
        Kind::Continue,
        Kind::Empty,
        Kind::Labeled,
        Kind::Synchronized,
        Kind::Assignment,
        Kind::Binary,
        Kind::Unary,
        Kind::Conditional,
        Kind::Parenthesized,
        Kind::TypeCast,
        Kind::InstanceOf,
        Kind::ArrayAccess,
        Kind::MethodInvocation,
        Kind::NewClass,
        Kind::NewArray,
        Kind::MemberSelect,
        Kind::Identifier,
        Kind::Literal,
        Kind::Unsupported,
    ];

    /// Dense index of this kind, suitable for bitset membership tests.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether nodes of this kind may appear in a statement slot.
    #[must_use]
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            Kind::Block
                | Kind::If
                | Kind::While
                | Kind::DoWhile
                | Kind::For
                | Kind::EnhancedFor
                | Kind::Switch
                | Kind::Try
                | Kind::Variable
                | Kind::ExpressionStatement
                | Kind::Return
                | Kind::Throw
                | Kind::Break
                | Kind::Continue
                | Kind::Empty
                | Kind::Labeled
                | Kind::Synchronized
                | Kind::Unsupported
        )
    }

    /// Whether nodes of this kind may appear in an expression slot.
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Kind::Assignment
                | Kind::Binary
                | Kind::Unary
                | Kind::Conditional
                | Kind::Parenthesized
                | Kind::TypeCast
                | Kind::InstanceOf
                | Kind::ArrayAccess
                | Kind::MethodInvocation
                | Kind::NewClass
                | Kind::NewArray
                | Kind::MemberSelect
                | Kind::Identifier
                | Kind::Literal
                | Kind::Unsupported
        )
    }
}

/// Number of distinct kinds. Interest bitsets are sized with this.
pub const KIND_COUNT: usize = Kind::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_table_matches_indices() {
        for (i, kind) in Kind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(KIND_COUNT, Kind::ALL.len());
    }

    #[test]
    fn statement_and_expression_categories_overlap_only_on_unsupported() {
        for kind in Kind::ALL {
            if kind.is_statement() && kind.is_expression() {
                assert_eq!(kind, Kind::Unsupported);
            }
        }
    }

    #[test]
    fn structural_kinds_are_neither_statement_nor_expression() {
        for kind in [
            Kind::CompilationUnit,
            Kind::Class,
            Kind::Method,
            Kind::CaseGroup,
            Kind::Catch,
        ] {
            assert!(!kind.is_statement());
            assert!(!kind.is_expression());
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Kind::MethodInvocation).unwrap();
        assert_eq!(json, r#""method_invocation""#);
        let back: Kind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Kind::MethodInvocation);
    }
}
