//! Depth-first traversal with kind-filtered fan-out.
//!
//! One walk serves many consumers: each registered [`TreeVisitor`] declares
//! the node kinds it cares about, the [`Dispatcher`] compiles that interest
//! into a bitset once, and during the walk every node is delivered to every
//! interested visitor exactly once pre-order (`enter`) and once post-order
//! (`leave`), children in source order. The walk is read-only; it never
//! mutates the tree.

use fixedbitset::FixedBitSet;

use crate::tree::kind::{Kind, KIND_COUNT};
use crate::tree::model::Tree;

/// A traversal consumer.
///
/// `interests` is queried once, before the first callback; the answer must
/// not change over the lifetime of the walk.
pub trait TreeVisitor {
    /// Node kinds this visitor wants `enter`/`leave` callbacks for.
    fn interests(&self) -> &[Kind];

    /// Pre-order callback. The node's kind is guaranteed to be in
    /// [`TreeVisitor::interests`].
    fn enter(&mut self, tree: &Tree) {
        let _ = tree;
    }

    /// Post-order callback, mirrored with `enter`.
    fn leave(&mut self, tree: &Tree) {
        let _ = tree;
    }
}

/// Composes independent visitors over a single walk.
#[derive(Default)]
pub struct Dispatcher<'a> {
    visitors: Vec<(&'a mut dyn TreeVisitor, FixedBitSet)>,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    /// Register a visitor. Its interest set is compiled to a bitset here so
    /// per-node dispatch is a single bit test per visitor.
    pub fn register(&mut self, visitor: &'a mut dyn TreeVisitor) {
        let mut interest = FixedBitSet::with_capacity(KIND_COUNT);
        for kind in visitor.interests() {
            interest.insert(kind.index());
        }
        self.visitors.push((visitor, interest));
    }

    fn enter(&mut self, tree: &Tree) {
        let idx = tree.kind().index();
        for (visitor, interest) in &mut self.visitors {
            if interest.contains(idx) {
                visitor.enter(tree);
            }
        }
    }

    fn leave(&mut self, tree: &Tree) {
        let idx = tree.kind().index();
        for (visitor, interest) in &mut self.visitors {
            if interest.contains(idx) {
                visitor.leave(tree);
            }
        }
    }
}

/// Walk `tree` depth-first, dispatching `enter` before and `leave` after the
/// node's children. Children are visited in the fixed order their kind
/// defines (left to right as written in source).
pub fn walk(tree: &Tree, dispatcher: &mut Dispatcher<'_>) {
    dispatcher.enter(tree);
    match tree {
        Tree::CompilationUnit(n) => walk_all(&n.types, dispatcher),
        Tree::Class(n) => walk_all(&n.members, dispatcher),
        Tree::Method(n) => {
            walk_all(&n.parameters, dispatcher);
            walk_opt(n.block.as_deref(), dispatcher);
        }
        Tree::Block(n) => walk_all(&n.body, dispatcher),
        Tree::If(n) => {
            walk(&n.condition, dispatcher);
            walk(&n.then_branch, dispatcher);
            walk_opt(n.else_branch.as_deref(), dispatcher);
        }
        Tree::While(n) => {
            walk(&n.condition, dispatcher);
            walk(&n.body, dispatcher);
        }
        Tree::DoWhile(n) => {
            walk(&n.body, dispatcher);
            walk(&n.condition, dispatcher);
        }
        Tree::For(n) => {
            walk_all(&n.init, dispatcher);
            walk_opt(n.condition.as_deref(), dispatcher);
            walk_all(&n.update, dispatcher);
            walk(&n.body, dispatcher);
        }
        Tree::EnhancedFor(n) => {
            walk(&n.variable, dispatcher);
            walk(&n.expression, dispatcher);
            walk(&n.body, dispatcher);
        }
        Tree::Switch(n) => {
            walk(&n.expression, dispatcher);
            walk_all(&n.cases, dispatcher);
        }
        Tree::CaseGroup(n) => {
            walk_all(&n.labels, dispatcher);
            walk_all(&n.body, dispatcher);
        }
        Tree::Try(n) => {
            walk_all(&n.resources, dispatcher);
            walk(&n.block, dispatcher);
            walk_all(&n.catches, dispatcher);
            walk_opt(n.finally.as_deref(), dispatcher);
        }
        Tree::Catch(n) => {
            walk(&n.parameter, dispatcher);
            walk(&n.block, dispatcher);
        }
        Tree::Variable(n) => walk_opt(n.initializer.as_deref(), dispatcher),
        Tree::ExpressionStatement(n) => walk(&n.expression, dispatcher),
        Tree::Return(n) => walk_opt(n.expression.as_deref(), dispatcher),
        Tree::Throw(n) => walk(&n.expression, dispatcher),
        Tree::Labeled(n) => walk(&n.statement, dispatcher),
        Tree::Synchronized(n) => {
            walk(&n.lock, dispatcher);
            walk(&n.block, dispatcher);
        }
        Tree::Assignment(n) => {
            walk(&n.target, dispatcher);
            walk(&n.value, dispatcher);
        }
        Tree::Binary(n) => {
            walk(&n.left, dispatcher);
            walk(&n.right, dispatcher);
        }
        Tree::Unary(n) => walk(&n.operand, dispatcher),
        Tree::Conditional(n) => {
            walk(&n.condition, dispatcher);
            walk(&n.true_expr, dispatcher);
            walk(&n.false_expr, dispatcher);
        }
        Tree::Parenthesized(n) => walk(&n.expression, dispatcher),
        Tree::TypeCast(n) => walk(&n.expression, dispatcher),
        Tree::InstanceOf(n) => walk(&n.expression, dispatcher),
        Tree::ArrayAccess(n) => {
            walk(&n.array, dispatcher);
            walk(&n.index, dispatcher);
        }
        Tree::MethodInvocation(n) => {
            walk(&n.callee, dispatcher);
            walk_all(&n.arguments, dispatcher);
        }
        Tree::NewClass(n) => walk_all(&n.arguments, dispatcher),
        Tree::NewArray(n) => {
            walk_all(&n.dimensions, dispatcher);
            walk_all(&n.initializers, dispatcher);
        }
        Tree::MemberSelect(n) => walk(&n.expression, dispatcher),
        // Leaf kinds: enter/leave only.
        Tree::Break(_)
        | Tree::Continue(_)
        | Tree::Empty(_)
        | Tree::Identifier(_)
        | Tree::Literal(_)
        | Tree::Unsupported(_) => {}
    }
    dispatcher.leave(tree);
}

fn walk_all(trees: &[Tree], dispatcher: &mut Dispatcher<'_>) {
    for tree in trees {
        walk(tree, dispatcher);
    }
}

fn walk_opt(tree: Option<&Tree>, dispatcher: &mut Dispatcher<'_>) {
    if let Some(tree) = tree {
        walk(tree, dispatcher);
    }
}
