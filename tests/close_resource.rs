//! End-to-end leak detection over hand-built trees.
//!
//! Each test constructs the tree a parser would produce for a small Java-like
//! method, runs the analysis on the whole compilation unit, and checks the
//! findings (position and resource type).

use leaklint::analysis::{analyze_unit, ClosePolicy, Finding};
use leaklint::tree::model::{
    Assignment, Block, Catch, Class, CompilationUnit, ExpressionStatement, Identifier, If, Literal,
    MemberSelect, Method, MethodInvocation, NewClass, Return, Span, SymbolId, Throw, Tree, Try,
    Variable, While,
};

fn sp(line: u32, column: u32) -> Span {
    Span::new(line, column)
}

fn ident(name: &str, sym: u32) -> Tree {
    Tree::Identifier(Identifier {
        name: name.to_string(),
        symbol: Some(SymbolId(sym)),
        span: sp(1, 1),
    })
}

fn lit(value: &str) -> Tree {
    Tree::Literal(Literal {
        value: value.to_string(),
        span: sp(1, 1),
    })
}

fn new_class(type_name: &str, arguments: Vec<Tree>, span: Span) -> Tree {
    Tree::NewClass(NewClass {
        type_name: type_name.to_string(),
        arguments,
        span,
    })
}

/// `Type name = new Type(...)` at `span`.
fn resource_decl(type_name: &str, name: &str, sym: u32, span: Span) -> Tree {
    Tree::Variable(Variable {
        type_name: type_name.to_string(),
        name: name.to_string(),
        symbol: SymbolId(sym),
        initializer: Some(Box::new(new_class(type_name, vec![], span))),
        span,
    })
}

/// Parameter declaration (no initializer).
fn parameter(type_name: &str, name: &str, sym: u32) -> Tree {
    Tree::Variable(Variable {
        type_name: type_name.to_string(),
        name: name.to_string(),
        symbol: SymbolId(sym),
        initializer: None,
        span: sp(1, 1),
    })
}

/// `name.method();` as a statement.
fn member_call_stmt(name: &str, sym: u32, method: &str) -> Tree {
    Tree::ExpressionStatement(ExpressionStatement {
        expression: Box::new(Tree::MethodInvocation(MethodInvocation {
            callee: Box::new(Tree::MemberSelect(MemberSelect {
                expression: Box::new(ident(name, sym)),
                member: method.to_string(),
                span: sp(1, 1),
            })),
            arguments: vec![],
            span: sp(1, 1),
        })),
        span: sp(1, 1),
    })
}

fn close_stmt(name: &str, sym: u32) -> Tree {
    member_call_stmt(name, sym, "close")
}

fn block(body: Vec<Tree>) -> Tree {
    Tree::Block(Block {
        body,
        span: sp(1, 1),
    })
}

fn unit_with_method(parameters: Vec<Tree>, body: Vec<Tree>) -> Tree {
    Tree::CompilationUnit(CompilationUnit {
        package: None,
        types: vec![Tree::Class(Class {
            name: "A".to_string(),
            members: vec![Tree::Method(Method {
                name: "run".to_string(),
                parameters,
                block: Some(Box::new(block(body))),
                span: sp(1, 1),
            })],
            span: sp(1, 1),
        })],
        span: sp(1, 1),
    })
}

fn analyze(body: Vec<Tree>) -> Vec<Finding> {
    let unit = unit_with_method(vec![], body);
    unit.validate().expect("test tree must be well formed");
    analyze_unit(&unit, &ClosePolicy::default())
}

#[test]
fn straight_line_open_then_close_is_silent() {
    let findings = analyze(vec![
        resource_decl("FileInputStream", "in", 1, sp(2, 9)),
        close_stmt("in", 1),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn open_without_close_reports_at_declaration() {
    let findings = analyze(vec![resource_decl("FileInputStream", "in", 1, sp(2, 9))]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].span, sp(2, 9));
    assert_eq!(findings[0].resource_type, "FileInputStream");
    assert_eq!(findings[0].message(), "Close this \"FileInputStream\".");
}

#[test]
fn close_on_one_branch_only_still_leaks() {
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::If(If {
            condition: Box::new(lit("true")),
            then_branch: Box::new(block(vec![close_stmt("s", 1)])),
            else_branch: None,
            span: sp(3, 5),
        }),
    ]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].resource_type, "Socket");
}

#[test]
fn close_on_every_branch_is_silent() {
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::If(If {
            condition: Box::new(lit("true")),
            then_branch: Box::new(block(vec![close_stmt("s", 1)])),
            else_branch: Some(Box::new(block(vec![close_stmt("s", 1)]))),
            span: sp(3, 5),
        }),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn close_inside_while_body_is_not_guaranteed() {
    // The body may run zero times.
    let findings = analyze(vec![
        resource_decl("FileReader", "r", 1, sp(2, 9)),
        Tree::While(While {
            condition: Box::new(lit("more")),
            body: Box::new(block(vec![close_stmt("r", 1)])),
            span: sp(3, 5),
        }),
    ]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].resource_type, "FileReader");
}

#[test]
fn reassignment_leaks_old_resource_at_overwrite_site() {
    // r = new FileReader(); r = new FileWriter();  (neither closed)
    let findings = analyze(vec![
        resource_decl("FileReader", "r", 1, sp(2, 9)),
        Tree::ExpressionStatement(ExpressionStatement {
            expression: Box::new(Tree::Assignment(Assignment {
                target: Box::new(ident("r", 1)),
                value: Box::new(new_class("FileWriter", vec![], sp(3, 9))),
                span: sp(3, 5),
            })),
            span: sp(3, 5),
        }),
    ]);
    assert_eq!(findings.len(), 2);
    // Old binding leaks where it was overwritten.
    assert_eq!(findings[0].span, sp(3, 5));
    assert_eq!(findings[0].resource_type, "FileReader");
    // New binding leaks at end of method, keyed to the assignment.
    assert_eq!(findings[1].span, sp(3, 5));
    assert_eq!(findings[1].resource_type, "FileWriter");
}

#[test]
fn reassignment_after_close_reports_only_the_new_binding() {
    let findings = analyze(vec![
        resource_decl("FileReader", "r", 1, sp(2, 9)),
        close_stmt("r", 1),
        Tree::ExpressionStatement(ExpressionStatement {
            expression: Box::new(Tree::Assignment(Assignment {
                target: Box::new(ident("r", 1)),
                value: Box::new(new_class("FileWriter", vec![], sp(4, 9))),
                span: sp(4, 5),
            })),
            span: sp(4, 5),
        }),
    ]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].resource_type, "FileWriter");
}

#[test]
fn returned_resource_escapes() {
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::Return(Return {
            expression: Some(Box::new(ident("s", 1))),
            span: sp(3, 5),
        }),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn resource_forwarded_as_argument_escapes() {
    // register(s);
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::ExpressionStatement(ExpressionStatement {
            expression: Box::new(Tree::MethodInvocation(MethodInvocation {
                callee: Box::new(ident("register", 99)),
                arguments: vec![ident("s", 1)],
                span: sp(3, 5),
            })),
            span: sp(3, 5),
        }),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn wrapper_constructor_takes_ownership() {
    // FileReader r = new FileReader();
    // BufferedReader br = new BufferedReader(r);
    // br.close();
    let findings = analyze(vec![
        resource_decl("FileReader", "r", 1, sp(2, 9)),
        Tree::Variable(Variable {
            type_name: "BufferedReader".to_string(),
            name: "br".to_string(),
            symbol: SymbolId(2),
            initializer: Some(Box::new(new_class(
                "BufferedReader",
                vec![ident("r", 1)],
                sp(3, 14),
            ))),
            span: sp(3, 9),
        }),
        close_stmt("br", 2),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn unclosed_wrapper_reports_the_wrapper_only() {
    let findings = analyze(vec![
        resource_decl("FileReader", "r", 1, sp(2, 9)),
        Tree::Variable(Variable {
            type_name: "BufferedReader".to_string(),
            name: "br".to_string(),
            symbol: SymbolId(2),
            initializer: Some(Box::new(new_class(
                "BufferedReader",
                vec![ident("r", 1)],
                sp(3, 14),
            ))),
            span: sp(3, 9),
        }),
    ]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].resource_type, "BufferedReader");
    assert_eq!(findings[0].span, sp(3, 9));
}

#[test]
fn parameters_are_never_tracked() {
    let unit = unit_with_method(vec![parameter("Socket", "s", 1)], vec![]);
    unit.validate().expect("test tree must be well formed");
    assert!(analyze_unit(&unit, &ClosePolicy::default()).is_empty());
}

#[test]
fn unassigned_construction_reports_at_the_new_expression() {
    // new FileOutputStream();
    let findings = analyze(vec![Tree::ExpressionStatement(ExpressionStatement {
        expression: Box::new(new_class("FileOutputStream", vec![], sp(2, 5))),
        span: sp(2, 5),
    })]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].span, sp(2, 5));
    assert_eq!(findings[0].resource_type, "FileOutputStream");
}

#[test]
fn try_with_resources_is_auto_closed() {
    let findings = analyze(vec![Tree::Try(Try {
        resources: vec![resource_decl("FileInputStream", "in", 1, sp(2, 10))],
        block: Box::new(block(vec![])),
        catches: vec![],
        finally: None,
        span: sp(2, 5),
    })]);
    assert!(findings.is_empty());
}

#[test]
fn close_in_finally_covers_all_paths() {
    // try { s.write(); } catch (E e) {} finally { s.close(); }
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::Try(Try {
            resources: vec![],
            block: Box::new(block(vec![member_call_stmt("s", 1, "write")])),
            catches: vec![Tree::Catch(Catch {
                parameter: Box::new(parameter("Exception", "e", 9)),
                block: Box::new(block(vec![])),
                span: sp(5, 5),
            })],
            finally: Some(Box::new(block(vec![close_stmt("s", 1)]))),
            span: sp(3, 5),
        }),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn close_only_inside_try_block_misses_the_exception_path() {
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::Try(Try {
            resources: vec![],
            block: Box::new(block(vec![close_stmt("s", 1)])),
            catches: vec![Tree::Catch(Catch {
                parameter: Box::new(parameter("Exception", "e", 9)),
                block: Box::new(block(vec![])),
                span: sp(5, 5),
            })],
            finally: None,
            span: sp(3, 5),
        }),
    ]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].resource_type, "Socket");
}

#[test]
fn thrown_resource_escapes() {
    let findings = analyze(vec![
        resource_decl("Socket", "s", 1, sp(2, 9)),
        Tree::Throw(Throw {
            expression: Box::new(ident("s", 1)),
            span: sp(3, 5),
        }),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn analysis_is_idempotent_over_the_same_tree() {
    let unit = unit_with_method(
        vec![],
        vec![
            resource_decl("FileReader", "r", 1, sp(2, 9)),
            Tree::If(If {
                condition: Box::new(lit("flag")),
                then_branch: Box::new(block(vec![close_stmt("r", 1)])),
                else_branch: None,
                span: sp(3, 5),
            }),
        ],
    );
    let policy = ClosePolicy::default();
    let first = analyze_unit(&unit, &policy);
    let second = analyze_unit(&unit, &policy);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[test]
fn custom_policy_drives_tracking_and_closing() {
    let policy = ClosePolicy::new(["LeaseHandle".to_string()], ["surrender".to_string()]);
    let leaked = unit_with_method(vec![], vec![resource_decl("LeaseHandle", "h", 1, sp(2, 9))]);
    assert_eq!(analyze_unit(&leaked, &policy).len(), 1);

    let released = unit_with_method(
        vec![],
        vec![
            resource_decl("LeaseHandle", "h", 1, sp(2, 9)),
            member_call_stmt("h", 1, "surrender"),
        ],
    );
    assert!(analyze_unit(&released, &policy).is_empty());

    // The default closeables mean nothing to this policy.
    let ignored = unit_with_method(
        vec![],
        vec![resource_decl("FileInputStream", "in", 1, sp(2, 9))],
    );
    assert!(analyze_unit(&ignored, &policy).is_empty());
}

#[test]
fn methods_are_analyzed_independently() {
    // One leaky method and one clean method in the same class.
    let leaky = Tree::Method(Method {
        name: "leaky".to_string(),
        parameters: vec![],
        block: Some(Box::new(block(vec![resource_decl(
            "Socket", "s", 1,
            sp(2, 9),
        )]))),
        span: sp(1, 1),
    });
    let clean = Tree::Method(Method {
        name: "clean".to_string(),
        parameters: vec![],
        block: Some(Box::new(block(vec![
            resource_decl("Socket", "s", 2, sp(6, 9)),
            close_stmt("s", 2),
        ]))),
        span: sp(5, 1),
    });
    let unit = Tree::CompilationUnit(CompilationUnit {
        package: None,
        types: vec![Tree::Class(Class {
            name: "A".to_string(),
            members: vec![leaky, clean],
            span: sp(1, 1),
        })],
        span: sp(1, 1),
    });
    let findings = analyze_unit(&unit, &ClosePolicy::default());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].span, sp(2, 9));
}
