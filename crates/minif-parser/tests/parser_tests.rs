//! Parser tests for minif.
//!
//! Covers: program structure, statements, expression precedence, scoping
//! and name resolution, enum and array syntax, and fail-fast errors.

use minif_lexer::Lexer;
use minif_parser::{Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH};
use minif_types::ast::*;
use minif_types::{ErrorCategory, ErrorCode, MinifError, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> Result<Program, MinifError> {
    let sf = SourceFile::new("test.mf", source);
    let tokens = Lexer::new(&sf).lex()?;
    Parser::new(tokens).parse()
}

fn parse_ok(source: &str) -> Program {
    match parse(source) {
        Ok(program) => program,
        Err(e) => panic!("unexpected parse error: {e}"),
    }
}

fn parse_err(source: &str) -> MinifError {
    match parse(source) {
        Ok(_) => panic!("expected a parse error for: {source}"),
        Err(e) => e,
    }
}

/// Wrap statements in a program.
fn wrap(body: &str) -> String {
    format!("program P {body} end program")
}

/// Initializer of the first `var` declaration.
fn first_init(prog: &Program) -> &Expr {
    match &prog.stmts[0] {
        Stmt::VarDecl(decl) => &decl.init,
        other => panic!("expected var declaration, got {other:?}"),
    }
}

fn binary_op(expr: &Expr) -> BinOp {
    match &expr.kind {
        ExprKind::Binary { op, .. } => *op,
        other => panic!("expected binary expression, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Program structure
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_program() {
    let prog = parse_ok("program P var x = 1 + 2 * 3 list x end program");
    assert_eq!(prog.name.name, "P");
    assert_eq!(prog.stmts.len(), 2);
    assert!(matches!(prog.stmts[1], Stmt::List(ref l) if l.name.name == "x"));
}

#[test]
fn test_missing_program_keyword() {
    let err = parse_err("var x = 1 end program");
    assert_eq!(err.code, ErrorCode::MISSING_PROGRAM);
    assert_eq!(err.category, ErrorCategory::Syntax);
}

#[test]
fn test_second_program_is_rejected() {
    let err = parse_err("program P var x = 1 program Q end program");
    assert_eq!(err.code, ErrorCode::DUPLICATE_PROGRAM);
    assert_eq!(err.message, "only one program is allowed per file");
}

#[test]
fn test_empty_program_is_rejected() {
    let err = parse_err("program P end program");
    assert_eq!(err.code, ErrorCode::EMPTY_PROGRAM);
}

#[test]
fn test_missing_end_program() {
    let err = parse_err("program P var x = 1");
    assert_eq!(err.code, ErrorCode::MISSING_END_PROGRAM);
}

#[test]
fn test_trailing_tokens_after_end_program() {
    let err = parse_err("program P var x = 1 end program list x");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.contains("after 'end program'"));
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else_shares_one_end() {
    let prog = parse_ok(&wrap("var x = 1 if x == 1 do x = 2 else x = 3 end"));
    match &prog.stmts[1] {
        Stmt::If(stmt) => {
            assert_eq!(stmt.then_body.len(), 1);
            assert_eq!(stmt.else_body.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_if_without_else() {
    let prog = parse_ok(&wrap("var x = 1 if x do end"));
    assert!(matches!(&prog.stmts[1], Stmt::If(s) if s.else_body.is_none() && s.then_body.is_empty()));
}

#[test]
fn test_while_and_block() {
    let prog = parse_ok(&wrap(
        "var i = 0 while i < 3 do i = i + 1 end do var t = i end",
    ));
    assert!(matches!(&prog.stmts[1], Stmt::While(w) if w.body.len() == 1));
    assert!(matches!(&prog.stmts[2], Stmt::Block(b) if b.body.len() == 1));
}

#[test]
fn test_missing_do_after_condition() {
    let err = parse_err(&wrap("var x = 1 while x < 3 x = x + 1 end"));
    assert_eq!(err.code, ErrorCode::MISSING_DO);
}

#[test]
fn test_missing_end_inside_block() {
    let err = parse_err(&wrap("var x = 1 if x do x = 2"));
    assert_eq!(err.code, ErrorCode::MISSING_END);
    assert_eq!(err.message, "missing 'end' to close 'if'");
}

#[test]
fn test_bare_identifier_requires_assignment() {
    let err = parse_err(&wrap("var x = 1 x"));
    assert_eq!(err.code, ErrorCode::EXPECTED_ASSIGNMENT);
}

#[test]
fn test_array_element_assignment() {
    let prog = parse_ok(&wrap("var a = [1, 2, 3] a[1] = 9"));
    match &prog.stmts[1] {
        Stmt::ArrayAssign(s) => {
            assert_eq!(s.name.name, "a");
            assert_eq!(s.index.kind, ExprKind::NumberLit(1.0));
            assert_eq!(s.value.kind, ExprKind::NumberLit(9.0));
        }
        other => panic!("expected array assignment, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Name resolution and scopes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variable_is_not_visible_after_its_block() {
    let err = parse_err("program P var x = 1 if x == 1 do var y = 10 end list y end program");
    assert_eq!(err.code, ErrorCode::UNDECLARED_VARIABLE);
    assert_eq!(err.category, ErrorCategory::Semantic);
    assert_eq!(err.message, "undeclared variable: y");
}

#[test]
fn test_list_of_undeclared_variable() {
    let err = parse_err("program P var a = 0 list b end program");
    assert_eq!(err.message, "undeclared variable: b");
}

#[test]
fn test_self_referential_initializer_is_undeclared() {
    let err = parse_err(&wrap("var x = x + 1"));
    assert_eq!(err.code, ErrorCode::UNDECLARED_VARIABLE);
}

#[test]
fn test_redeclaration_in_live_scope() {
    let err = parse_err(&wrap("var x = 1 do var x = 2 end"));
    assert_eq!(err.code, ErrorCode::VARIABLE_ALREADY_DECLARED);
    assert!(err.suggestion.is_some());
}

#[test]
fn test_name_can_be_redeclared_after_its_scope_closes() {
    let prog = parse_ok(&wrap("do var t = 1 end do var t = 2 end var t = 3"));
    assert_eq!(prog.stmts.len(), 3);
}

#[test]
fn test_else_branch_is_a_separate_scope() {
    let err = parse_err(&wrap("var c = 1 if c do var y = 1 else y = 2 end"));
    assert_eq!(err.message, "undeclared variable: y");
}

#[test]
fn test_assignment_to_undeclared_variable() {
    let err = parse_err(&wrap("z = 4"));
    assert_eq!(err.message, "undeclared variable: z");
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_mul_binds_tighter_than_add() {
    let prog = parse_ok(&wrap("var x = 1 + 2 * 3"));
    let expr = first_init(&prog);
    assert_eq!(binary_op(expr), BinOp::Add);
    let ExprKind::Binary { right, .. } = &expr.kind else {
        unreachable!()
    };
    assert_eq!(binary_op(right), BinOp::Mul);
}

#[test]
fn test_left_associative_subtraction() {
    let prog = parse_ok(&wrap("var x = 10 - 4 - 3"));
    let ExprKind::Binary { left, op, .. } = &first_init(&prog).kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Sub);
    assert_eq!(binary_op(left), BinOp::Sub);
}

#[test]
fn test_comparison_tighter_than_and_tighter_than_or() {
    let prog = parse_ok(&wrap("var a = 1 var x = a < 2 and a > 0 or a == 5"));
    let Stmt::VarDecl(decl) = &prog.stmts[1] else {
        panic!("expected var")
    };
    let ExprKind::Binary { left, op, right } = &decl.init.kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Or);
    assert_eq!(binary_op(left), BinOp::And);
    assert_eq!(binary_op(right), BinOp::Eq);
}

#[test]
fn test_two_character_comparisons() {
    let prog = parse_ok(&wrap("var a = 1 <= 2 var b = 1 != 2 var c = 2 >= 1"));
    let ops: Vec<BinOp> = prog
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::VarDecl(d) => binary_op(&d.init),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(ops, [BinOp::LessEq, BinOp::NotEq, BinOp::GreaterEq]);
}

#[test]
fn test_unary_operators_nest() {
    let prog = parse_ok(&wrap("var x = -!+1"));
    let ExprKind::Unary { op, operand } = &first_init(&prog).kind else {
        panic!("expected unary")
    };
    assert_eq!(*op, UnaryOp::Neg);
    assert!(matches!(operand.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn test_parentheses_override_precedence() {
    let prog = parse_ok(&wrap("var x = (1 + 2) * 3"));
    let ExprKind::Binary { left, op, .. } = &first_init(&prog).kind else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinOp::Mul);
    assert_eq!(binary_op(left), BinOp::Add);
}

#[test]
fn test_concat_of_two_literals() {
    let prog = parse_ok(&wrap(r#"var s = "ab" concat "cd""#));
    assert_eq!(binary_op(first_init(&prog)), BinOp::Concat);
}

#[test]
fn test_concat_rejects_variables() {
    let err = parse_err(&wrap(r#"var s = "ab" var t = s concat "cd""#));
    assert_eq!(err.code, ErrorCode::CONCAT_REQUIRES_LITERALS);
    assert_eq!(err.category, ErrorCategory::Semantic);
}

#[test]
fn test_concat_does_not_chain() {
    let err = parse_err(&wrap(r#"var s = "a" concat "b" concat "c""#));
    assert_eq!(err.code, ErrorCode::CONCAT_REQUIRES_LITERALS);
}

#[test]
fn test_missing_operand() {
    let err = parse_err(&wrap("var x = 1 +"));
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.starts_with("expected expression"));
}

// ─────────────────────────────────────────────────────────────────────
// Arrays and enums
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_array_literal_and_access() {
    let prog = parse_ok(&wrap("var a = [1, 2 + 3, 4] var b = a[1]"));
    assert!(matches!(&first_init(&prog).kind, ExprKind::ArrayLit(items) if items.len() == 3));
    let Stmt::VarDecl(decl) = &prog.stmts[1] else {
        panic!("expected var")
    };
    assert!(matches!(&decl.init.kind, ExprKind::ArrayAccess { name, .. } if name.name == "a"));
}

#[test]
fn test_empty_array_literal() {
    let prog = parse_ok(&wrap("var a = []"));
    assert_eq!(first_init(&prog).kind, ExprKind::ArrayLit(vec![]));
}

#[test]
fn test_enum_declaration_and_access() {
    let prog = parse_ok(&wrap("enum Color { Red, Green, Blue } var c = Color.Green"));
    match &prog.stmts[0] {
        Stmt::EnumDecl(decl) => {
            let names: Vec<&str> = decl.members.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, ["Red", "Green", "Blue"]);
        }
        other => panic!("expected enum, got {other:?}"),
    }
    let Stmt::VarDecl(decl) = &prog.stmts[1] else {
        panic!("expected var")
    };
    assert!(matches!(
        &decl.init.kind,
        ExprKind::EnumAccess { enum_name, member } if enum_name.name == "Color" && member.name == "Green"
    ));
}

#[test]
fn test_enum_trailing_comma() {
    parse_ok(&wrap("enum E { A, B, } var e = E.B"));
}

#[test]
fn test_enums_are_global() {
    parse_ok(&wrap("do enum Dir { Up, Down } end var d = Dir.Up"));
}

#[test]
fn test_enum_errors() {
    assert_eq!(parse_err(&wrap("enum E { }")).code, ErrorCode::EMPTY_ENUM);
    assert_eq!(
        parse_err(&wrap("enum E { A } enum E { B }")).code,
        ErrorCode::ENUM_ALREADY_DECLARED
    );
    assert_eq!(
        parse_err(&wrap("enum E { A, A }")).code,
        ErrorCode::DUPLICATE_ENUM_MEMBER
    );
    assert_eq!(
        parse_err(&wrap("var x = Shape.Circle")).code,
        ErrorCode::UNKNOWN_ENUM
    );
    assert_eq!(
        parse_err(&wrap("enum E { A } var x = E.B")).code,
        ErrorCode::UNKNOWN_ENUM_MEMBER
    );
}

// ─────────────────────────────────────────────────────────────────────
// Nesting limits
// ─────────────────────────────────────────────────────────────────────

fn nested_parens(depth: usize) -> String {
    format!("var x = {}1{}", "(".repeat(depth), ")".repeat(depth))
}

fn nested_blocks(depth: usize) -> String {
    format!("{} var x = 1 {}", "do ".repeat(depth), "end ".repeat(depth))
}

#[test]
fn test_deep_parentheses_are_rejected() {
    let err = parse_err(&wrap(&nested_parens(50_000)));
    assert_eq!(err.code, ErrorCode::NESTING_TOO_DEEP);
    assert_eq!(err.category, ErrorCategory::Syntax);
    assert_eq!(
        err.message,
        format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}")
    );
    assert_eq!(err.span.start_line, 1);
}

#[test]
fn test_parentheses_within_the_limit() {
    let depth = MAX_EXPR_DEPTH as usize - 1;
    let prog = parse_ok(&wrap(&nested_parens(depth)));
    assert!(matches!(first_init(&prog).kind, ExprKind::NumberLit(n) if n == 1.0));

    let err = parse_err(&wrap(&nested_parens(depth + 1)));
    assert_eq!(err.code, ErrorCode::NESTING_TOO_DEEP);
}

#[test]
fn test_deep_unary_chain_is_rejected() {
    let source = wrap(&format!("var x = {}1", "-".repeat(50_000)));
    assert_eq!(parse_err(&source).code, ErrorCode::NESTING_TOO_DEEP);

    let source = wrap(&format!("var x = {}1", "- ".repeat(MAX_EXPR_DEPTH as usize - 1)));
    parse_ok(&source);
}

#[test]
fn test_deep_blocks_are_rejected() {
    let err = parse_err(&wrap(&nested_blocks(10_000)));
    assert_eq!(err.code, ErrorCode::NESTING_TOO_DEEP);
    assert_eq!(
        err.message,
        format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}")
    );

    parse_ok(&wrap(&nested_blocks(MAX_BLOCK_DEPTH as usize)));
}

#[test]
fn test_nesting_budget_is_restored_after_each_expression() {
    let one = nested_parens(MAX_EXPR_DEPTH as usize - 1);
    let many: Vec<String> = (0..10)
        .map(|i| one.replacen("var x", &format!("var x{i}"), 1))
        .collect();
    parse_ok(&wrap(&many.join(" ")));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_is_deterministic() {
    let source = wrap("var i = 0 while i < 3 do var t = [i, 2] i = i + t[1] end list i");
    let first = parse_ok(&source);
    for _ in 0..20 {
        assert_eq!(parse_ok(&source), first);
    }
}
