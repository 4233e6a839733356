//! Resource-leak analysis: resources opened but not provably closed.
//!
//! Runs per method body, independently, with no interprocedural state. The
//! analyzer simulates execution order over the method's statements while
//! maintaining a table of resource bindings (opened, not yet provably
//! closed). A binding is resolved by a closing call on its owner or by
//! escaping the method (returned, thrown, or forwarded to another call);
//! anything still open when the method ends is reported as a leak.
//!
//! # Branch policy
//!
//! Joins are conservative in the false-negative direction: past a join point
//! a binding counts as closed only if it is closed on every incoming branch,
//! and as escaped if it escaped on any. A `finally` block's closing calls
//! apply to all paths through the enclosing `try`, since `finally` always
//! executes. try-with-resources declarations are auto-closed and never
//! tracked.
//!
//! Malformed or unsupported node shapes are skipped ("unknown, not a
//! resource"); one method's oddities never abort another's analysis.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::analysis::policy::ClosePolicy;
use crate::error::TreeError;
use crate::tree::kind::Kind;
use crate::tree::model::{Method, Span, SymbolId, Tree, Variable};
use crate::tree::walk::TreeVisitor;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// An unresolved resource binding, keyed to the tree position where the
/// resource was created (or overwritten) and carrying its declared type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub span: Span,
    pub resource_type: String,
}

impl Finding {
    /// User-facing message for the reporting sink.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Close this \"{}\".", self.resource_type)
    }
}

// ---------------------------------------------------------------------------
// Binding table
// ---------------------------------------------------------------------------

/// Transient record for one opened resource.
#[derive(Debug, Clone)]
struct Binding {
    origin: Span,
    type_name: String,
    closed: bool,
    escaped: bool,
}

impl Binding {
    fn open(origin: Span, type_name: String) -> Self {
        Self {
            origin,
            type_name,
            closed: false,
            escaped: false,
        }
    }

    fn is_open(&self) -> bool {
        !self.closed && !self.escaped
    }
}

/// Per-method state: at most one live binding per owning symbol.
#[derive(Debug, Clone, Default)]
struct BindingTable {
    bindings: FxHashMap<SymbolId, Binding>,
}

impl BindingTable {
    /// Conservative join over divergent branches: a binding is closed past
    /// the join only if closed on every branch that knows it, escaped if
    /// escaped on any.
    fn merge(branches: Vec<BindingTable>) -> BindingTable {
        let mut merged: FxHashMap<SymbolId, Binding> = FxHashMap::default();
        for branch in &branches {
            for (sym, binding) in &branch.bindings {
                match merged.get_mut(sym) {
                    Some(existing) => {
                        existing.closed &= binding.closed;
                        existing.escaped |= binding.escaped;
                    }
                    None => {
                        merged.insert(*sym, binding.clone());
                    }
                }
            }
        }
        BindingTable { bindings: merged }
    }
}

// ---------------------------------------------------------------------------
// Per-method analyzer
// ---------------------------------------------------------------------------

/// Analyze one method body. Parameters are never seeded as bindings: the
/// method does not own their lifecycle.
#[must_use]
pub fn analyze_method(method: &Method, policy: &ClosePolicy) -> Vec<Finding> {
    let Some(block) = method.block.as_deref().and_then(Tree::as_block) else {
        return Vec::new();
    };
    trace!(method = %method.name, "analyzing method body");

    let mut analyzer = MethodAnalyzer {
        policy,
        findings: Vec::new(),
    };
    let mut state = BindingTable::default();
    for stmt in &block.body {
        analyzer.exec_statement(stmt, &mut state);
    }

    // End-of-method resolution: anything still open leaks at its origin.
    for binding in state.bindings.values() {
        if binding.is_open() {
            debug!(
                resource_type = %binding.type_name,
                span = %binding.origin,
                "resource reaches end of method unclosed"
            );
            analyzer.findings.push(Finding {
                span: binding.origin,
                resource_type: binding.type_name.clone(),
            });
        }
    }

    let mut findings = analyzer.findings;
    findings.sort_by(|a, b| {
        (a.span.line, a.span.column, &a.resource_type)
            .cmp(&(b.span.line, b.span.column, &b.resource_type))
    });
    findings
}

struct MethodAnalyzer<'p> {
    policy: &'p ClosePolicy,
    findings: Vec<Finding>,
}

impl MethodAnalyzer<'_> {
    fn exec_statement(&mut self, tree: &Tree, state: &mut BindingTable) {
        match tree {
            Tree::Block(block) => {
                for stmt in &block.body {
                    self.exec_statement(stmt, state);
                }
            }
            Tree::Variable(var) => self.exec_declaration(var, state),
            Tree::ExpressionStatement(stmt) => {
                // A closeable constructed and discarded in the same statement
                // can never be closed: leak at the construction site.
                if let Tree::NewClass(new_class) = strip(&stmt.expression) {
                    if self.policy.is_closeable(&new_class.type_name) {
                        self.escape_arguments(&new_class.arguments, state);
                        debug!(
                            resource_type = %new_class.type_name,
                            span = %new_class.span,
                            "unassigned closeable construction"
                        );
                        self.findings.push(Finding {
                            span: new_class.span,
                            resource_type: new_class.type_name.clone(),
                        });
                        return;
                    }
                }
                self.exec_expression(&stmt.expression, state);
            }
            Tree::If(stmt) => {
                self.exec_expression(&stmt.condition, state);
                let mut then_state = state.clone();
                self.exec_statement(&stmt.then_branch, &mut then_state);
                let mut else_state = state.clone();
                if let Some(else_branch) = &stmt.else_branch {
                    self.exec_statement(else_branch, &mut else_state);
                }
                *state = BindingTable::merge(vec![then_state, else_state]);
            }
            Tree::While(stmt) => {
                self.exec_expression(&stmt.condition, state);
                // Body may run zero times: join with the pre-loop state.
                let mut body_state = state.clone();
                self.exec_statement(&stmt.body, &mut body_state);
                *state = BindingTable::merge(vec![state.clone(), body_state]);
            }
            Tree::DoWhile(stmt) => {
                // Body runs at least once.
                self.exec_statement(&stmt.body, state);
                self.exec_expression(&stmt.condition, state);
            }
            Tree::For(stmt) => {
                for init in &stmt.init {
                    self.exec_statement(init, state);
                }
                if let Some(condition) = &stmt.condition {
                    self.exec_expression(condition, state);
                }
                let mut body_state = state.clone();
                self.exec_statement(&stmt.body, &mut body_state);
                for update in &stmt.update {
                    self.exec_expression(update, &mut body_state);
                }
                *state = BindingTable::merge(vec![state.clone(), body_state]);
            }
            Tree::EnhancedFor(stmt) => {
                // The loop variable is produced by the iterated collection,
                // not constructed here; it is not tracked.
                self.exec_expression(&stmt.expression, state);
                let mut body_state = state.clone();
                self.exec_statement(&stmt.body, &mut body_state);
                *state = BindingTable::merge(vec![state.clone(), body_state]);
            }
            Tree::Switch(stmt) => {
                self.exec_expression(&stmt.expression, state);
                let mut branches = Vec::new();
                let mut has_default = false;
                for case in &stmt.cases {
                    let Tree::CaseGroup(group) = case else {
                        debug!(kind = ?case.kind(), "skipping malformed switch case");
                        continue;
                    };
                    has_default |= group.is_default;
                    let mut case_state = state.clone();
                    for body_stmt in &group.body {
                        self.exec_statement(body_stmt, &mut case_state);
                    }
                    branches.push(case_state);
                }
                // Without a default, the no-match path falls through.
                if !has_default || branches.is_empty() {
                    branches.push(state.clone());
                }
                *state = BindingTable::merge(branches);
            }
            Tree::Try(stmt) => self.exec_try(stmt, state),
            Tree::Return(stmt) => {
                if let Some(expression) = &stmt.expression {
                    self.escape_value(expression, state);
                }
            }
            Tree::Throw(stmt) => self.escape_value(&stmt.expression, state),
            Tree::Synchronized(stmt) => {
                self.exec_expression(&stmt.lock, state);
                self.exec_statement(&stmt.block, state);
            }
            Tree::Labeled(stmt) => self.exec_statement(&stmt.statement, state),
            Tree::Break(_) | Tree::Continue(_) | Tree::Empty(_) => {}
            Tree::Unsupported(node) => {
                debug!(construct = %node.construct, "skipping unsupported statement");
            }
            // Tolerate an expression in statement position rather than
            // aborting the method.
            other => self.exec_expression(other, state),
        }
    }

    fn exec_try(&mut self, stmt: &crate::tree::model::Try, state: &mut BindingTable) {
        // try-with-resources declarations are closed automatically; their
        // initializers still run (and may absorb tracked resources).
        for resource in &stmt.resources {
            if let Tree::Variable(var) = resource {
                if let Some(init) = &var.initializer {
                    self.exec_expression(init, state);
                }
                trace!(name = %var.name, "try-with-resources declaration auto-closes");
            }
        }

        let entry_state = state.clone();
        self.exec_statement(&stmt.block, state);

        // Each catch may start from anywhere inside the try; its entry state
        // is conservatively the state at try entry.
        let mut branches = vec![state.clone()];
        for catch in &stmt.catches {
            let Tree::Catch(clause) = catch else {
                debug!(kind = ?catch.kind(), "skipping malformed catch clause");
                continue;
            };
            let mut catch_state = entry_state.clone();
            self.exec_statement(&clause.block, &mut catch_state);
            branches.push(catch_state);
        }
        *state = BindingTable::merge(branches);

        // finally always executes: its closing calls hold on all paths.
        if let Some(finally) = &stmt.finally {
            self.exec_statement(finally, state);
        }
    }

    fn exec_declaration(&mut self, var: &Variable, state: &mut BindingTable) {
        let Some(init) = &var.initializer else { return };
        self.exec_expression(init, state);

        match init.expression_type() {
            Ok(Some(type_name)) if self.policy.is_closeable(type_name) => {
                debug!(
                    name = %var.name,
                    resource_type = %type_name,
                    span = %var.span,
                    "opening resource binding"
                );
                state
                    .bindings
                    .insert(var.symbol, Binding::open(var.span, type_name.to_string()));
            }
            Ok(_) => {}
            Err(TreeError::Unsupported(construct)) => {
                debug!(construct = %construct, "initializer type unknown, not tracked");
            }
            Err(_) => {}
        }
    }

    fn exec_expression(&mut self, tree: &Tree, state: &mut BindingTable) {
        match tree {
            Tree::Assignment(assign) => self.exec_assignment(assign, state),
            Tree::MethodInvocation(call) => {
                match call.callee.as_ref() {
                    Tree::MemberSelect(select) => {
                        match tracked_symbol(&select.expression, state) {
                            Some(sym) => {
                                if let Some(binding) = state.bindings.get_mut(&sym) {
                                    if self.policy.closes(&binding.type_name, &select.member) {
                                        debug!(
                                            resource_type = %binding.type_name,
                                            method = %select.member,
                                            "resource closed"
                                        );
                                        binding.closed = true;
                                    }
                                    // A non-closing call on the receiver is
                                    // an ordinary use; it changes nothing.
                                }
                            }
                            None => self.exec_expression(&select.expression, state),
                        }
                    }
                    other => self.exec_expression(other, state),
                }
                self.escape_arguments(&call.arguments, state);
            }
            Tree::NewClass(new_class) => {
                // Passing a resource to a constructor transfers ownership to
                // the wrapper (closing through a wrapper closes the wrapped).
                self.escape_arguments(&new_class.arguments, state);
            }
            Tree::NewArray(new_array) => {
                for dim in &new_array.dimensions {
                    self.exec_expression(dim, state);
                }
                // Storing a resource in an array hands it off.
                self.escape_arguments(&new_array.initializers, state);
            }
            Tree::Binary(expr) => {
                self.exec_expression(&expr.left, state);
                self.exec_expression(&expr.right, state);
            }
            Tree::Unary(expr) => self.exec_expression(&expr.operand, state),
            Tree::Conditional(expr) => {
                self.exec_expression(&expr.condition, state);
                self.exec_expression(&expr.true_expr, state);
                self.exec_expression(&expr.false_expr, state);
            }
            Tree::Parenthesized(expr) => self.exec_expression(&expr.expression, state),
            Tree::TypeCast(expr) => self.exec_expression(&expr.expression, state),
            Tree::InstanceOf(expr) => self.exec_expression(&expr.expression, state),
            Tree::ArrayAccess(expr) => {
                self.exec_expression(&expr.array, state);
                self.exec_expression(&expr.index, state);
            }
            Tree::MemberSelect(expr) => self.exec_expression(&expr.expression, state),
            Tree::Identifier(_) | Tree::Literal(_) => {}
            Tree::Unsupported(node) => {
                debug!(construct = %node.construct, "skipping unsupported expression");
            }
            other => {
                debug!(kind = ?other.kind(), "statement kind in expression slot, skipping");
            }
        }
    }

    fn exec_assignment(&mut self, assign: &crate::tree::model::Assignment, state: &mut BindingTable) {
        self.exec_expression(&assign.value, state);

        // `other = r` moves the resource out of `r`'s responsibility.
        if let Some(sym) = tracked_symbol(&assign.value, state) {
            if let Some(binding) = state.bindings.get_mut(&sym) {
                debug!(resource_type = %binding.type_name, "resource escapes via assignment");
                binding.escaped = true;
            }
        }

        let Some(target) = assign.target.as_identifier() else {
            self.exec_expression(&assign.target, state);
            return;
        };
        let Some(sym) = target.symbol else { return };

        // Resolve-on-reassignment: overwriting an open binding leaks it at
        // the overwrite site, whatever the new value is.
        if let Some(old) = state.bindings.get(&sym) {
            if old.is_open() {
                debug!(
                    resource_type = %old.type_name,
                    span = %assign.span,
                    "reassignment leaks previous resource"
                );
                self.findings.push(Finding {
                    span: assign.span,
                    resource_type: old.type_name.clone(),
                });
            }
            state.bindings.remove(&sym);
        }

        match assign.value.expression_type() {
            Ok(Some(type_name)) if self.policy.is_closeable(type_name) => {
                debug!(
                    name = %target.name,
                    resource_type = %type_name,
                    span = %assign.span,
                    "opening resource binding via assignment"
                );
                state
                    .bindings
                    .insert(sym, Binding::open(assign.span, type_name.to_string()));
            }
            Ok(_) => {}
            Err(TreeError::Unsupported(construct)) => {
                debug!(construct = %construct, "assigned value type unknown, not tracked");
            }
            Err(_) => {}
        }
    }

    /// Mark tracked resources appearing as call/constructor arguments as
    /// escaped (ownership transferred out of this method's view).
    fn escape_arguments(&mut self, arguments: &[Tree], state: &mut BindingTable) {
        for argument in arguments {
            match tracked_symbol(argument, state) {
                Some(sym) => {
                    if let Some(binding) = state.bindings.get_mut(&sym) {
                        debug!(resource_type = %binding.type_name, "resource escapes as argument");
                        binding.escaped = true;
                    }
                }
                None => self.exec_expression(argument, state),
            }
        }
    }

    /// Escape for `return`/`throw` values.
    fn escape_value(&mut self, expression: &Tree, state: &mut BindingTable) {
        match tracked_symbol(expression, state) {
            Some(sym) => {
                if let Some(binding) = state.bindings.get_mut(&sym) {
                    debug!(resource_type = %binding.type_name, "resource escapes via return/throw");
                    binding.escaped = true;
                }
            }
            None => self.exec_expression(expression, state),
        }
    }
}

/// Strip parentheses and casts, which do not change the value's identity.
fn strip(tree: &Tree) -> &Tree {
    match tree {
        Tree::Parenthesized(inner) => strip(&inner.expression),
        Tree::TypeCast(inner) => strip(&inner.expression),
        _ => tree,
    }
}

/// The symbol of a tracked binding this expression refers to, if any.
fn tracked_symbol(tree: &Tree, state: &BindingTable) -> Option<SymbolId> {
    match strip(tree) {
        Tree::Identifier(id) => id
            .symbol
            .filter(|sym| state.bindings.contains_key(sym)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Traversal consumer
// ---------------------------------------------------------------------------

/// Traversal consumer that runs the per-method analysis on every `Method`
/// node of a walk and accumulates findings. Retrieve them by value with
/// [`CloseResourceRule::into_findings`]; nothing is shared or mutated across
/// runs, so re-walking the same tree reproduces identical results.
pub struct CloseResourceRule<'p> {
    policy: &'p ClosePolicy,
    findings: Vec<Finding>,
}

const RULE_INTERESTS: &[Kind] = &[Kind::Method];

impl<'p> CloseResourceRule<'p> {
    #[must_use]
    pub fn new(policy: &'p ClosePolicy) -> Self {
        Self {
            policy,
            findings: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl TreeVisitor for CloseResourceRule<'_> {
    fn interests(&self) -> &[Kind] {
        RULE_INTERESTS
    }

    fn enter(&mut self, tree: &Tree) {
        if let Tree::Method(method) = tree {
            self.findings.extend(analyze_method(method, self.policy));
        }
    }
}

/// Walk one compilation unit and collect the findings of every method.
#[must_use]
pub fn analyze_unit(root: &Tree, policy: &ClosePolicy) -> Vec<Finding> {
    let mut rule = CloseResourceRule::new(policy);
    {
        let mut dispatcher = crate::tree::walk::Dispatcher::new();
        dispatcher.register(&mut rule);
        crate::tree::walk::walk(root, &mut dispatcher);
    }
    rule.into_findings()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::model::Span;

    #[test]
    fn finding_message_quotes_the_type() {
        let finding = Finding {
            span: Span::new(3, 5),
            resource_type: "FileInputStream".to_string(),
        };
        assert_eq!(finding.message(), "Close this \"FileInputStream\".");
    }

    #[test]
    fn merge_requires_closed_on_every_branch() {
        let sym = SymbolId(1);
        let mut closed_branch = BindingTable::default();
        let mut binding = Binding::open(Span::new(1, 1), "Socket".to_string());
        binding.closed = true;
        closed_branch.bindings.insert(sym, binding);

        let mut open_branch = BindingTable::default();
        open_branch
            .bindings
            .insert(sym, Binding::open(Span::new(1, 1), "Socket".to_string()));

        let merged = BindingTable::merge(vec![closed_branch, open_branch]);
        assert!(merged.bindings[&sym].is_open());
    }

    #[test]
    fn merge_propagates_escape_from_any_branch() {
        let sym = SymbolId(1);
        let mut escaped_branch = BindingTable::default();
        let mut binding = Binding::open(Span::new(1, 1), "Socket".to_string());
        binding.escaped = true;
        escaped_branch.bindings.insert(sym, binding);

        let mut open_branch = BindingTable::default();
        open_branch
            .bindings
            .insert(sym, Binding::open(Span::new(1, 1), "Socket".to_string()));

        let merged = BindingTable::merge(vec![escaped_branch, open_branch]);
        assert!(!merged.bindings[&sym].is_open());
    }

    #[test]
    fn merge_keeps_binding_opened_in_a_single_branch() {
        let sym = SymbolId(2);
        let mut with_binding = BindingTable::default();
        with_binding
            .bindings
            .insert(sym, Binding::open(Span::new(4, 1), "FileReader".to_string()));

        let merged = BindingTable::merge(vec![with_binding, BindingTable::default()]);
        assert!(merged.bindings[&sym].is_open());
    }
}
