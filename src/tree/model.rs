//! Immutable tree node model.
//!
//! One tagged-union [`Tree`] with a payload struct per syntactic kind. A node
//! exclusively owns its children (`Box`/`Vec`, never shared), so the tree is a
//! strict hierarchy with no back-edges; once built it is never mutated, which
//! is what makes concurrent read-only traversal safe.
//!
//! Grammar-mandatory children are plain fields: a parser cannot build an `If`
//! without a condition, the compiler rejects it. Grammar-optional children
//! (`else` branch, `return` value, `finally` block, variable initializer) are
//! `Option` fields. Because child slots are uniformly typed as [`Tree`] so
//! the traversal can reach every node, the finer per-slot category contract
//! (statement vs. expression kinds) is enforced by [`Tree::validate`] at the
//! parser boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::tree::kind::Kind;

/// Source position (1-indexed line and column) for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Identity of a local variable or parameter, assigned by the parser's
/// symbol resolution. Two identifier occurrences with the same `SymbolId`
/// refer to the same binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// Root node: one per source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    /// Top-level type declarations (`Class` nodes).
    pub types: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    /// Member declarations (`Method` and `Variable` nodes).
    pub members: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Formal parameters (`Variable` nodes without initializers).
    pub parameters: Vec<Tree>,
    /// Absent for abstract/native methods.
    pub block: Option<Box<Tree>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub body: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct If {
    pub condition: Box<Tree>,
    pub then_branch: Box<Tree>,
    pub else_branch: Option<Box<Tree>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct While {
    pub condition: Box<Tree>,
    pub body: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWhile {
    pub body: Box<Tree>,
    pub condition: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct For {
    pub init: Vec<Tree>,
    pub condition: Option<Box<Tree>>,
    pub update: Vec<Tree>,
    pub body: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedFor {
    /// The loop variable (`Variable` node without initializer).
    pub variable: Box<Tree>,
    pub expression: Box<Tree>,
    pub body: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    pub expression: Box<Tree>,
    /// `CaseGroup` nodes in source order.
    pub cases: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseGroup {
    /// Case label expressions; empty for a lone `default:`.
    pub labels: Vec<Tree>,
    pub body: Vec<Tree>,
    pub is_default: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Try {
    /// try-with-resources declarations (`Variable` nodes), auto-closed.
    pub resources: Vec<Tree>,
    /// The protected block (`Block` node).
    pub block: Box<Tree>,
    /// `Catch` nodes in source order.
    pub catches: Vec<Tree>,
    pub finally: Option<Box<Tree>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catch {
    /// The caught exception parameter (`Variable` node).
    pub parameter: Box<Tree>,
    pub block: Box<Tree>,
    pub span: Span,
}

/// Local variable declaration, method parameter, catch parameter, or
/// try-with-resources declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub type_name: String,
    pub name: String,
    pub symbol: SymbolId,
    pub initializer: Option<Box<Tree>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Return {
    pub expression: Option<Box<Tree>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Throw {
    pub expression: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Break {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Continue {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labeled {
    pub label: String,
    pub statement: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synchronized {
    pub lock: Box<Tree>,
    pub block: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub target: Box<Tree>,
    pub value: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub left: Box<Tree>,
    pub operator: String,
    pub right: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unary {
    pub operator: String,
    pub operand: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: Box<Tree>,
    pub true_expr: Box<Tree>,
    pub false_expr: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parenthesized {
    pub expression: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCast {
    pub type_name: String,
    pub expression: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceOf {
    pub expression: Box<Tree>,
    pub type_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayAccess {
    pub array: Box<Tree>,
    pub index: Box<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInvocation {
    /// `Identifier` for unqualified calls, `MemberSelect` for `recv.m(...)`.
    pub callee: Box<Tree>,
    pub arguments: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    pub type_name: String,
    pub arguments: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArray {
    pub element_type: String,
    pub dimensions: Vec<Tree>,
    pub initializers: Vec<Tree>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSelect {
    pub expression: Box<Tree>,
    pub member: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    /// `None` for names the parser could not resolve (fields, statics).
    pub symbol: Option<SymbolId>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub span: Span,
}

/// Placeholder for a construct the grammar port does not cover yet.
/// Semantic accessors through it signal [`TreeError::Unsupported`] instead of
/// silently returning a wrong value, so partial ports stay safe to extend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unsupported {
    pub construct: String,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A syntax tree node. One variant per [`Kind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tree {
    CompilationUnit(CompilationUnit),
    Class(Class),
    Method(Method),
    Block(Block),
    If(If),
    While(While),
    DoWhile(DoWhile),
    For(For),
    EnhancedFor(EnhancedFor),
    Switch(Switch),
    CaseGroup(CaseGroup),
    Try(Try),
    Catch(Catch),
    Variable(Variable),
    ExpressionStatement(ExpressionStatement),
    Return(Return),
    Throw(Throw),
    Break(Break),
    Continue(Continue),
    Empty(Empty),
    Labeled(Labeled),
    Synchronized(Synchronized),
    Assignment(Assignment),
    Binary(Binary),
    Unary(Unary),
    Conditional(Conditional),
    Parenthesized(Parenthesized),
    TypeCast(TypeCast),
    InstanceOf(InstanceOf),
    ArrayAccess(ArrayAccess),
    MethodInvocation(MethodInvocation),
    NewClass(NewClass),
    NewArray(NewArray),
    MemberSelect(MemberSelect),
    Identifier(Identifier),
    Literal(Literal),
    Unsupported(Unsupported),
}

impl Tree {
    /// The kind tag of this node. Total, never fails.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Tree::CompilationUnit(_) => Kind::CompilationUnit,
            Tree::Class(_) => Kind::Class,
            Tree::Method(_) => Kind::Method,
            Tree::Block(_) => Kind::Block,
            Tree::If(_) => Kind::If,
            Tree::While(_) => Kind::While,
            Tree::DoWhile(_) => Kind::DoWhile,
            Tree::For(_) => Kind::For,
            Tree::EnhancedFor(_) => Kind::EnhancedFor,
            Tree::Switch(_) => Kind::Switch,
            Tree::CaseGroup(_) => Kind::CaseGroup,
            Tree::Try(_) => Kind::Try,
            Tree::Catch(_) => Kind::Catch,
            Tree::Variable(_) => Kind::Variable,
            Tree::ExpressionStatement(_) => Kind::ExpressionStatement,
            Tree::Return(_) => Kind::Return,
            Tree::Throw(_) => Kind::Throw,
            Tree::Break(_) => Kind::Break,
            Tree::Continue(_) => Kind::Continue,
            Tree::Empty(_) => Kind::Empty,
            Tree::Labeled(_) => Kind::Labeled,
            Tree::Synchronized(_) => Kind::Synchronized,
            Tree::Assignment(_) => Kind::Assignment,
            Tree::Binary(_) => Kind::Binary,
            Tree::Unary(_) => Kind::Unary,
            Tree::Conditional(_) => Kind::Conditional,
            Tree::Parenthesized(_) => Kind::Parenthesized,
            Tree::TypeCast(_) => Kind::TypeCast,
            Tree::InstanceOf(_) => Kind::InstanceOf,
            Tree::ArrayAccess(_) => Kind::ArrayAccess,
            Tree::MethodInvocation(_) => Kind::MethodInvocation,
            Tree::NewClass(_) => Kind::NewClass,
            Tree::NewArray(_) => Kind::NewArray,
            Tree::MemberSelect(_) => Kind::MemberSelect,
            Tree::Identifier(_) => Kind::Identifier,
            Tree::Literal(_) => Kind::Literal,
            Tree::Unsupported(_) => Kind::Unsupported,
        }
    }

    /// Source position of this node. Total, never fails.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Tree::CompilationUnit(n) => n.span,
            Tree::Class(n) => n.span,
            Tree::Method(n) => n.span,
            Tree::Block(n) => n.span,
            Tree::If(n) => n.span,
            Tree::While(n) => n.span,
            Tree::DoWhile(n) => n.span,
            Tree::For(n) => n.span,
            Tree::EnhancedFor(n) => n.span,
            Tree::Switch(n) => n.span,
            Tree::CaseGroup(n) => n.span,
            Tree::Try(n) => n.span,
            Tree::Catch(n) => n.span,
            Tree::Variable(n) => n.span,
            Tree::ExpressionStatement(n) => n.span,
            Tree::Return(n) => n.span,
            Tree::Throw(n) => n.span,
            Tree::Break(n) => n.span,
            Tree::Continue(n) => n.span,
            Tree::Empty(n) => n.span,
            Tree::Labeled(n) => n.span,
            Tree::Synchronized(n) => n.span,
            Tree::Assignment(n) => n.span,
            Tree::Binary(n) => n.span,
            Tree::Unary(n) => n.span,
            Tree::Conditional(n) => n.span,
            Tree::Parenthesized(n) => n.span,
            Tree::TypeCast(n) => n.span,
            Tree::InstanceOf(n) => n.span,
            Tree::ArrayAccess(n) => n.span,
            Tree::MethodInvocation(n) => n.span,
            Tree::NewClass(n) => n.span,
            Tree::NewArray(n) => n.span,
            Tree::MemberSelect(n) => n.span,
            Tree::Identifier(n) => n.span,
            Tree::Literal(n) => n.span,
            Tree::Unsupported(n) => n.span,
        }
    }

    /// Typed view on a `Block` node.
    #[must_use]
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Tree::Block(b) => Some(b),
            _ => None,
        }
    }

    /// Typed view on a `Variable` node.
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Tree::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Typed view on an `Identifier`, looking through parentheses.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Tree::Identifier(id) => Some(id),
            Tree::Parenthesized(p) => p.expression.as_identifier(),
            _ => None,
        }
    }

    /// Statically known type name of this expression, where the model carries
    /// one (`new T(...)`, `(T) e`, parenthesized forms thereof).
    ///
    /// Returns `Err(TreeError::Unsupported)` for an [`Unsupported`] node so a
    /// partial grammar port cannot silently answer "no type" for a construct
    /// it merely has not modeled.
    pub fn expression_type(&self) -> Result<Option<&str>> {
        match self {
            Tree::NewClass(n) => Ok(Some(&n.type_name)),
            Tree::TypeCast(c) => Ok(Some(&c.type_name)),
            Tree::Parenthesized(p) => p.expression.expression_type(),
            Tree::Unsupported(u) => Err(TreeError::Unsupported(u.construct.clone())),
            _ => Ok(None),
        }
    }

    /// Validate the per-slot category contract of this subtree.
    ///
    /// The parser calls this once on each compilation-unit root; a failure
    /// aborts building that unit. Analyses assume a validated tree and skip
    /// (rather than re-check) malformed shapes.
    pub fn validate(&self) -> Result<()> {
        match self {
            Tree::CompilationUnit(n) => {
                for t in &n.types {
                    expect(self.kind(), t, "a type declaration", |k| {
                        matches!(k, Kind::Class | Kind::Unsupported)
                    })?;
                }
                Ok(())
            }
            Tree::Class(n) => {
                for m in &n.members {
                    expect(self.kind(), m, "a member declaration", |k| {
                        matches!(k, Kind::Method | Kind::Variable | Kind::Class | Kind::Unsupported)
                    })?;
                }
                Ok(())
            }
            Tree::Method(n) => {
                for p in &n.parameters {
                    expect(self.kind(), p, "a parameter declaration", |k| {
                        k == Kind::Variable
                    })?;
                }
                if let Some(block) = &n.block {
                    expect(self.kind(), block, "a block", |k| k == Kind::Block)?;
                }
                Ok(())
            }
            Tree::Block(n) => validate_statements(self.kind(), &n.body),
            Tree::If(n) => {
                expect_expression(self.kind(), &n.condition)?;
                expect_statement(self.kind(), &n.then_branch)?;
                if let Some(e) = &n.else_branch {
                    expect_statement(self.kind(), e)?;
                }
                Ok(())
            }
            Tree::While(n) => {
                expect_expression(self.kind(), &n.condition)?;
                expect_statement(self.kind(), &n.body)
            }
            Tree::DoWhile(n) => {
                expect_statement(self.kind(), &n.body)?;
                expect_expression(self.kind(), &n.condition)
            }
            Tree::For(n) => {
                validate_statements(self.kind(), &n.init)?;
                if let Some(c) = &n.condition {
                    expect_expression(self.kind(), c)?;
                }
                for u in &n.update {
                    expect_expression(self.kind(), u)?;
                }
                expect_statement(self.kind(), &n.body)
            }
            Tree::EnhancedFor(n) => {
                expect(self.kind(), &n.variable, "a variable declaration", |k| {
                    k == Kind::Variable
                })?;
                expect_expression(self.kind(), &n.expression)?;
                expect_statement(self.kind(), &n.body)
            }
            Tree::Switch(n) => {
                expect_expression(self.kind(), &n.expression)?;
                for c in &n.cases {
                    expect(self.kind(), c, "a case group", |k| k == Kind::CaseGroup)?;
                }
                Ok(())
            }
            Tree::CaseGroup(n) => {
                for l in &n.labels {
                    expect_expression(self.kind(), l)?;
                }
                validate_statements(self.kind(), &n.body)
            }
            Tree::Try(n) => {
                for r in &n.resources {
                    expect(self.kind(), r, "a resource declaration", |k| {
                        k == Kind::Variable
                    })?;
                }
                expect(self.kind(), &n.block, "a block", |k| k == Kind::Block)?;
                for c in &n.catches {
                    expect(self.kind(), c, "a catch clause", |k| k == Kind::Catch)?;
                }
                if let Some(f) = &n.finally {
                    expect(self.kind(), f, "a block", |k| k == Kind::Block)?;
                }
                Ok(())
            }
            Tree::Catch(n) => {
                expect(self.kind(), &n.parameter, "a parameter declaration", |k| {
                    k == Kind::Variable
                })?;
                expect(self.kind(), &n.block, "a block", |k| k == Kind::Block)
            }
            Tree::Variable(n) => {
                if let Some(init) = &n.initializer {
                    expect_expression(self.kind(), init)?;
                }
                Ok(())
            }
            Tree::ExpressionStatement(n) => expect_expression(self.kind(), &n.expression),
            Tree::Return(n) => {
                if let Some(e) = &n.expression {
                    expect_expression(self.kind(), e)?;
                }
                Ok(())
            }
            Tree::Throw(n) => expect_expression(self.kind(), &n.expression),
            Tree::Labeled(n) => expect_statement(self.kind(), &n.statement),
            Tree::Synchronized(n) => {
                expect_expression(self.kind(), &n.lock)?;
                expect(self.kind(), &n.block, "a block", |k| k == Kind::Block)
            }
            Tree::Assignment(n) => {
                expect_expression(self.kind(), &n.target)?;
                expect_expression(self.kind(), &n.value)
            }
            Tree::Binary(n) => {
                expect_expression(self.kind(), &n.left)?;
                expect_expression(self.kind(), &n.right)
            }
            Tree::Unary(n) => expect_expression(self.kind(), &n.operand),
            Tree::Conditional(n) => {
                expect_expression(self.kind(), &n.condition)?;
                expect_expression(self.kind(), &n.true_expr)?;
                expect_expression(self.kind(), &n.false_expr)
            }
            Tree::Parenthesized(n) => expect_expression(self.kind(), &n.expression),
            Tree::TypeCast(n) => expect_expression(self.kind(), &n.expression),
            Tree::InstanceOf(n) => expect_expression(self.kind(), &n.expression),
            Tree::ArrayAccess(n) => {
                expect_expression(self.kind(), &n.array)?;
                expect_expression(self.kind(), &n.index)
            }
            Tree::MethodInvocation(n) => {
                expect(self.kind(), &n.callee, "a callee expression", |k| {
                    matches!(k, Kind::Identifier | Kind::MemberSelect | Kind::Unsupported)
                })?;
                for a in &n.arguments {
                    expect_expression(self.kind(), a)?;
                }
                Ok(())
            }
            Tree::NewClass(n) => {
                for a in &n.arguments {
                    expect_expression(self.kind(), a)?;
                }
                Ok(())
            }
            Tree::NewArray(n) => {
                for d in &n.dimensions {
                    expect_expression(self.kind(), d)?;
                }
                for i in &n.initializers {
                    expect_expression(self.kind(), i)?;
                }
                Ok(())
            }
            Tree::MemberSelect(n) => expect_expression(self.kind(), &n.expression),
            Tree::Break(_)
            | Tree::Continue(_)
            | Tree::Empty(_)
            | Tree::Identifier(_)
            | Tree::Literal(_)
            | Tree::Unsupported(_) => Ok(()),
        }
    }
}

fn expect(parent: Kind, child: &Tree, expected: &'static str, ok: impl Fn(Kind) -> bool) -> Result<()> {
    if ok(child.kind()) {
        child.validate()
    } else {
        Err(TreeError::InvalidChild {
            parent,
            child: child.kind(),
            expected,
        })
    }
}

fn expect_statement(parent: Kind, child: &Tree) -> Result<()> {
    expect(parent, child, "a statement", Kind::is_statement)
}

fn expect_expression(parent: Kind, child: &Tree) -> Result<()> {
    expect(parent, child, "an expression", Kind::is_expression)
}

fn validate_statements(parent: Kind, body: &[Tree]) -> Result<()> {
    for stmt in body {
        expect_statement(parent, stmt)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(line: u32) -> Span {
        Span::new(line, 1)
    }

    fn ident(name: &str, sym: u32) -> Tree {
        Tree::Identifier(Identifier {
            name: name.to_string(),
            symbol: Some(SymbolId(sym)),
            span: sp(1),
        })
    }

    #[test]
    fn span_displays_line_colon_column() {
        assert_eq!(Span::new(12, 4).to_string(), "12:4");
    }

    #[test]
    fn kind_is_total() {
        let node = Tree::Empty(Empty { span: sp(3) });
        assert_eq!(node.kind(), Kind::Empty);
        assert_eq!(node.span(), sp(3));
    }

    #[test]
    fn expression_type_sees_through_parentheses() {
        let new_class = Tree::NewClass(NewClass {
            type_name: "FileInputStream".to_string(),
            arguments: vec![],
            span: sp(2),
        });
        let wrapped = Tree::Parenthesized(Parenthesized {
            expression: Box::new(new_class),
            span: sp(2),
        });
        assert_eq!(wrapped.expression_type().unwrap(), Some("FileInputStream"));
    }

    #[test]
    fn expression_type_signals_unsupported_distinctly() {
        let node = Tree::Unsupported(Unsupported {
            construct: "lambda".to_string(),
            span: sp(9),
        });
        let err = node.expression_type().unwrap_err();
        assert!(matches!(err, TreeError::Unsupported(_)));
    }

    #[test]
    fn validate_accepts_well_formed_if() {
        let node = Tree::If(If {
            condition: Box::new(ident("flag", 1)),
            then_branch: Box::new(Tree::Empty(Empty { span: sp(2) })),
            else_branch: None,
            span: sp(1),
        });
        assert!(node.validate().is_ok());
    }

    #[test]
    fn validate_rejects_block_in_expression_slot() {
        let node = Tree::If(If {
            condition: Box::new(Tree::Block(Block {
                body: vec![],
                span: sp(1),
            })),
            then_branch: Box::new(Tree::Empty(Empty { span: sp(2) })),
            else_branch: None,
            span: sp(1),
        });
        let err = node.validate().unwrap_err();
        assert!(matches!(
            err,
            TreeError::InvalidChild {
                parent: Kind::If,
                child: Kind::Block,
                ..
            }
        ));
    }

    #[test]
    fn validate_recurses_into_nested_statements() {
        let bad_inner = Tree::ExpressionStatement(ExpressionStatement {
            // Statement where an expression is required.
            expression: Box::new(Tree::Empty(Empty { span: sp(5) })),
            span: sp(5),
        });
        let node = Tree::Block(Block {
            body: vec![bad_inner],
            span: sp(4),
        });
        assert!(node.validate().is_err());
    }

    #[test]
    fn unsupported_is_tolerated_in_either_slot() {
        let node = Tree::ExpressionStatement(ExpressionStatement {
            expression: Box::new(Tree::Unsupported(Unsupported {
                construct: "switch expression".to_string(),
                span: sp(7),
            })),
            span: sp(7),
        });
        assert!(node.validate().is_ok());
    }

    #[test]
    fn tree_serializes_and_round_trips() {
        let node = Tree::Return(Return {
            expression: Some(Box::new(ident("r", 3))),
            span: sp(8),
        });
        let json = serde_json::to_string(&node).unwrap();
        let back: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), Kind::Return);
        assert_eq!(back.span(), sp(8));
    }
}
