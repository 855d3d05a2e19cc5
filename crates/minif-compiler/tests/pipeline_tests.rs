//! End-to-end pipeline tests: source → lex → parse → codegen → link → run.

use minif_compiler::{
    compile, compile_to_result, compile_with_limits, parse_source, render_diagnostic, run,
    run_with_limits, CompileResult, PipelineError, RunOutcome,
};
use minif_codegen::CodegenError;
use minif_types::{ErrorCategory, ErrorCode, Limits, SourceFile};
use minif_vm::{Fault, Value};

fn front_error(source: &str) -> minif_types::MinifError {
    match compile(source, "test.mf") {
        Err(PipelineError::Front(e)) => e,
        other => panic!("expected a front-end error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════
// Canonical scenarios
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_arithmetic_program_lists_seven() {
    let outcome = run("program P var x = 1 + 2 * 3 list x end program", "p.mf").unwrap();
    assert_eq!(outcome.memory.slots[0], Value::Number(7.0));
    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].rendered, "7");
}

#[test]
fn test_block_variable_is_gone_after_the_block() {
    let err = front_error("program P var x = 1 if x == 1 do var y = 10 end list y end program");
    assert_eq!(err.code, ErrorCode::UNDECLARED_VARIABLE);
    assert_eq!(err.category, ErrorCategory::Semantic);
    assert_eq!(err.message, "undeclared variable: y");
}

#[test]
fn test_concat_of_literals() {
    let outcome = run(
        r#"program P var s = "ab" concat "cd" list s end program"#,
        "p.mf",
    )
    .unwrap();
    assert_eq!(outcome.program.strings, ["abcd"]);
    assert_eq!(outcome.listings[0].rendered, "\"abcd\"");
}

#[test]
fn test_while_counts_to_three() {
    let outcome = run(
        "program P var i = 0 while i < 3 do i = i + 1 end list i end program",
        "p.mf",
    )
    .unwrap();
    assert_eq!(outcome.memory.slots[0], Value::Number(3.0));
    assert_eq!(outcome.listings[0].rendered, "3");
}

#[test]
fn test_list_of_undeclared_name() {
    let err = front_error("program P var a = 1 list b end program");
    assert_eq!(err.code, ErrorCode::UNDECLARED_VARIABLE);
    assert_eq!(err.message, "undeclared variable: b");
}

#[test]
fn test_cross_enum_comparison_faults_at_the_statement() {
    let source = "program P\nenum A { X }\nenum B { X }\nvar c = A.X == B.X\nend program";
    match run(source, "p.mf") {
        Err(PipelineError::Runtime { fault, span, .. }) => {
            assert_eq!(fault, Fault::EnumTypeMismatch);
            assert_eq!(span.map(|s| s.start_line), Some(4));
        }
        other => panic!("expected a runtime fault, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════
// Errors per stage
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_syntax_errors() {
    let err = front_error("program P var x = 1 program Q end program");
    assert_eq!(err.code, ErrorCode::DUPLICATE_PROGRAM);
    assert_eq!(err.message, "only one program is allowed per file");

    let err = front_error("program P var x = 1 while x do x = 0 end program");
    assert_eq!(err.code, ErrorCode::MISSING_END);
    assert_eq!(err.category, ErrorCategory::Syntax);
    assert_eq!(err.message, "missing 'end' to close 'while'");

    let err = front_error("program P var x = 1 if x x = 2 end end program");
    assert_eq!(err.code, ErrorCode::MISSING_DO);

    let err = front_error("program P var s = \"open end program");
    assert_eq!(err.code, ErrorCode::UNTERMINATED_STRING);
}

#[test]
fn test_redeclaration_carries_a_suggestion() {
    let err = front_error("program P var x = 1 var x = 2 end program");
    assert_eq!(err.code, ErrorCode::VARIABLE_ALREADY_DECLARED);
    assert!(err.suggestion.is_some());
}

#[test]
fn test_array_kind_errors_come_from_codegen() {
    match compile("program P var a = [1] var n = 0 n = a end program", "p.mf") {
        Err(PipelineError::Codegen(CodegenError::Semantic(e))) => {
            assert_eq!(e.code, ErrorCode::ARRAY_KIND_MISMATCH);
        }
        other => panic!("expected an array kind error, got {other:?}"),
    }
    let err = compile("program P var n = 0 var m = n[0] end program", "p.mf").unwrap_err();
    assert_eq!(err.code(), ErrorCode::NOT_AN_ARRAY);
    assert_eq!(err.category(), ErrorCategory::Semantic);
}

#[test]
fn test_capacity_is_a_link_error() {
    let limits = Limits {
        slots: 2,
        ..Limits::default()
    };
    let err = compile_with_limits(
        "program P var a = 1 var b = 2 var c = 3 end program",
        "p.mf",
        limits,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Codegen(CodegenError::LimitExceeded(_))
    ));
    assert_eq!(err.category(), ErrorCategory::Link);
    assert_eq!(err.span(), None);
}

#[test]
fn test_stack_overflow_is_caught_before_running() {
    let limits = Limits {
        stack: 8,
        ..Limits::default()
    };
    let deep = format!("program P var x = {}1{} end program", "1 + (".repeat(8), ")".repeat(8));
    match run_with_limits(&deep, "p.mf", limits) {
        Err(PipelineError::Codegen(CodegenError::LimitExceeded(message))) => {
            assert!(message.contains("stack holds 8"));
        }
        other => panic!("expected a compile-time limit error, got {other:?}"),
    }

    let fits = format!("program P var x = {}1{} end program", "1 + (".repeat(7), ")".repeat(7));
    let outcome = run_with_limits(&fits, "p.mf", limits).unwrap();
    assert_eq!(outcome.memory.slots[0], Value::Number(8.0));
}

#[test]
fn test_runtime_fault_reports_the_faulting_statement() {
    let source = "program P\nvar s = \"a\"\nvar x = 1\nvar t = s and x\nend program";
    let err = run(source, "p.mf").unwrap_err();
    assert_eq!(err.code(), ErrorCode::STRING_LOGIC_OPERAND);
    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert_eq!(err.span().map(|s| s.start_line), Some(4));
}

#[test]
fn test_invalid_index_is_a_semantic_fault() {
    let err = run("program P var a = [1, 2] var b = a[2 - 3] end program", "p.mf").unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Runtime {
            fault: Fault::InvalidIndex(_),
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Semantic);
}

// ══════════════════════════════════════════════════════════════════════
// Result artifact
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_compile_to_result_success() {
    let result = compile_to_result("program P var x = 1 list x end program", "p.mf");
    assert!(result.success);
    assert!(result.error.is_none());
    let program = result.program.as_ref().unwrap();
    assert_eq!(program.name, "P");
    let hash = result.fingerprint.as_ref().unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_compile_to_result_failure() {
    let result = compile_to_result("program P list z end program", "p.mf");
    assert!(!result.success);
    assert!(result.program.is_none());
    assert!(result.fingerprint.is_none());
    let error = result.error.unwrap();
    assert_eq!(error.code, ErrorCode::UNDECLARED_VARIABLE);
    assert_eq!(error.span.start_line, 1);
}

#[test]
fn test_compile_result_json_roundtrip() {
    let result = compile_to_result(
        r#"program P enum C { R, G } var c = C.G var a = [1, "x"] if 1 do list c end end program"#,
        "p.mf",
    );
    let json = serde_json::to_string(&result).unwrap();
    let back: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["program"]["enums"][0]["members"][1], "G");
    assert!(value["program"]["instructions"].is_array());
}

#[test]
fn test_non_finite_numbers_survive_json() {
    let outcome = run(
        "program P var n = 0 / 0 var p = 1 / 0 var m = 0 - 1 / 0 list n end program",
        "p.mf",
    )
    .unwrap();
    let json = serde_json::to_string(&outcome).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["memory"]["slots"][0]["number"], "NaN");
    assert_eq!(value["memory"]["slots"][1]["number"], "inf");
    assert_eq!(value["memory"]["slots"][2]["number"], "-inf");
    assert_eq!(value["listings"][0]["value"]["number"], "NaN");

    let back: RunOutcome = serde_json::from_str(&json).unwrap();
    assert!(back.memory.slots[0].as_number().is_some_and(f64::is_nan));
    assert_eq!(back.memory.slots[1], Value::Number(f64::INFINITY));
    assert_eq!(back.memory.slots[2], Value::Number(f64::NEG_INFINITY));
    assert_eq!(back.program, outcome.program);
    assert_eq!(back.steps, outcome.steps);
}

#[test]
fn test_overflowing_literal_survives_json() {
    let huge = "9".repeat(400);
    let result = compile_to_result(&format!("program P var x = {huge} end program"), "p.mf");
    assert!(result.success);
    let json = serde_json::to_string(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["program"]["instructions"][0]["PUSH"], "inf");
    let back: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_failure_json_has_flat_location() {
    let result = compile_to_result("program P\n  list q\nend program", "p.mf");
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["program"], serde_json::Value::Null);
    assert_eq!(value["error"]["line"], 2);
    assert_eq!(value["error"]["column"], 8);
    assert_eq!(value["error"]["category"], "semantic");
}

// ══════════════════════════════════════════════════════════════════════
// Diagnostics
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_render_diagnostic_quotes_the_source_line() {
    let source = "program P\n  var x = 1\n  list y\nend program";
    let err = parse_source(source, "demo.mf").unwrap_err();
    let file = SourceFile::new("demo.mf", source);
    let report = render_diagnostic(&file, &err);
    assert!(report.starts_with("error[E200]: undeclared variable: y\n"));
    assert!(report.contains("  --> demo.mf:3:8\n"));
    assert!(report.contains("  3 |   list y\n"));
    assert!(report.contains("   |        ^\n"));
}
