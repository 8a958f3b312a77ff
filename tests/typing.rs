//! Tests for the runtime type discipline and its preserved limitations

use skillet::{run_with_output, RunResult, RunStatus, Severity};

fn run_capture(source: &str) -> (RunResult, String) {
    let mut out = Vec::new();
    let result = run_with_output(source, &mut out);
    let output = String::from_utf8(out).expect("program output was not UTF-8");
    (result, output)
}

fn run_ok(source: &str) -> String {
    let (result, output) = run_capture(source);
    assert_eq!(result.status, RunStatus::Success, "diagnostics: {:?}", result.diagnostics);
    output
}

fn first_message(result: &RunResult) -> &str {
    &result.diagnostics[0].message
}

#[test]
fn test_assignment_type_mismatch_halts_execution() {
    let (result, output) = run_capture(r#"int x = 5; x = "hi"; print x;"#);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(
        first_message(&result),
        "Type mismatch: expected type int, received type string"
    );
    // Execution stopped at the bad assignment; the print never ran.
    assert_eq!(output, "");
}

#[test]
fn test_declared_type_checked_against_initializer() {
    let (result, _) = run_capture(r#"int x = "hi";"#);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(
        first_message(&result),
        "Type mismatch: expected type int, received type string"
    );
}

#[test]
fn test_assignment_of_same_category_succeeds() {
    assert_eq!(run_ok("int x = 5; x = 7; print x;"), "7\n");
}

#[test]
fn test_default_values() {
    let source = r#"
        int i;
        decimal d;
        string s;
        boolean b;
        array<int> a;
        print i;
        print d;
        print s;
        print b;
        print len(a);
    "#;
    assert_eq!(run_ok(source), "0\n0\n\nfalse\n0\n");
}

#[test]
fn test_char_variables() {
    assert_eq!(run_ok("char c = 'a'; print c;"), "a\n");
}

#[test]
fn test_char_and_string_are_distinct_categories() {
    let (result, _) = run_capture(r#"char c = "a";"#);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(
        first_message(&result),
        "Type mismatch: expected type char, received type string"
    );
}

#[test]
fn test_void_variable_declaration_fails() {
    let (result, _) = run_capture("void x;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert!(first_message(&result).contains("expected type void"));
}

#[test]
fn test_element_category_checked_at_declaration() {
    let (result, _) = run_capture(r#"array<int> a = {1, "x"};"#);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(
        first_message(&result),
        "Type mismatch: expected element type int, received type string"
    );
}

#[test]
fn test_indexed_writes_do_not_check_element_category() {
    // Element categories are enforced at declaration only; an indexed
    // write can still smuggle in another category.
    let source = r#"
        array<int> a = {1, 2};
        a[0] = "s";
        print a[0];
    "#;
    assert_eq!(run_ok(source), "s\n");
}

#[test]
fn test_indexed_write_out_of_bounds() {
    let (result, _) = run_capture("array<int> a = {1, 2}; a[5] = 9;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert!(first_message(&result).contains("outside array bounds"));
}

#[test]
fn test_negative_index_is_out_of_bounds() {
    let (result, _) = run_capture("array<int> a = {1, 2}; print a[0 - 1];");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert!(first_message(&result).contains("outside array bounds"));
}

#[test]
fn test_index_must_be_an_integer() {
    let (result, _) = run_capture("array<int> a = {1, 2}; print a[1.0];");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert!(first_message(&result).contains("Expected integer as index"));
}

#[test]
fn test_len_requires_an_array() {
    let (result, _) = run_capture("print len(5);");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Expected array for len expression.");
}

#[test]
fn test_calling_an_undeclared_name_is_not_callable() {
    let (result, _) = run_capture("missing();");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Can only call functions.");
}

#[test]
fn test_calling_a_plain_value_is_not_callable() {
    let (result, _) = run_capture("int x = 5; x();");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Can only call functions.");
}

#[test]
fn test_arity_mismatch() {
    let (result, _) = run_capture("int id(int a) { return a; } id();");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Expected 1 arguments but got 0.");
}

#[test]
fn test_function_bodies_do_not_close_over_caller_locals() {
    // Call environments enclose the global scope, not the call site, so
    // a body referencing a caller-local name fails.
    let source = r#"
        int caller() {
            int local = 5;
            return probe();
        }
        int probe() {
            return local;
        }
        print caller();
    "#;
    let (result, output) = run_capture(source);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Undefined variable 'local'.");
    assert_eq!(output, "");
}

#[test]
fn test_globals_are_visible_inside_functions() {
    let source = r#"
        int g = 10;
        int read() { return g; }
        print read();
    "#;
    assert_eq!(run_ok(source), "10\n");
}

#[test]
fn test_return_category_checked_against_declaration() {
    let (result, _) = run_capture(r#"int bad() { return "s"; } bad();"#);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Expected return type int.");
}

#[test]
fn test_bare_return_matches_only_void() {
    assert_eq!(run_ok(r#"void f() { return; } f(); print "done";"#), "done\n");

    let (result, _) = run_capture("int f() { return; } f();");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Expected return type int.");
}

#[test]
fn test_falling_off_the_end_yields_null_unchecked() {
    // Only explicit returns are checked against the declared category.
    assert_eq!(run_ok("int f() { } print f();"), "null\n");
}

#[test]
fn test_relational_operators_reject_floats() {
    // Known limitation: relational comparison assumes integer operands.
    let (result, _) = run_capture("print 1.5 < 2.0;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Operands must be integers.");
}

#[test]
fn test_bitwise_operators_reject_floats() {
    let (result, _) = run_capture("print 1.0 & 2;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Operands must be integers.");
}

#[test]
fn test_integer_division_by_zero() {
    let (result, _) = run_capture("print 1 / 0;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Division by zero.");
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    assert_eq!(run_ok("print 1.0 / 0.0;"), "inf\n");
}

#[test]
fn test_negative_integer_exponent_is_an_error() {
    let (result, _) = run_capture("print 2 ** (0 - 1);");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert!(first_message(&result).contains("non-negative"));
}

#[test]
fn test_arithmetic_rejects_non_numbers() {
    let (result, _) = run_capture("print true - 1;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Operands must be numbers.");
}

#[test]
fn test_size_requires_an_array() {
    let (result, _) = run_capture("size(5);");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Expected array for size.");
}

#[test]
fn test_lexical_error_suppresses_execution() {
    let (result, output) = run_capture("print 1; @");
    assert_eq!(result.status, RunStatus::StaticError);
    assert_eq!(result.diagnostics[0].severity, Severity::Lexical);
    assert_eq!(output, "");
}

#[test]
fn test_leading_zero_number_reads_as_an_identifier() {
    // "007" never classifies as an integer literal; it lexes as an
    // identifier and fails at runtime as an undefined name.
    let (result, _) = run_capture("print 007;");
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(first_message(&result), "Undefined variable '007'.");
}

#[test]
fn test_for_each_reassignment_is_type_checked() {
    // The loop variable is re-assigned per element through the checked
    // assignment path.
    let source = r#"
        array<int> xs = {1, 2};
        int total = 0;
        for (string s : xs) { total = total + 1; }
    "#;
    let (result, _) = run_capture(source);
    assert_eq!(result.status, RunStatus::RuntimeError);
    assert_eq!(
        first_message(&result),
        "Type mismatch: expected type string, received type int"
    );
}
