//! End-to-end tests for core language semantics

use skillet::{run_with_output, RunResult, RunStatus};

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

fn run_runtime_error(source: &str) -> (RunResult, String) {
    let (result, output) = run_capture(source);
    assert_eq!(result.status, RunStatus::RuntimeError, "diagnostics: {:?}", result.diagnostics);
    (result, output)
}

#[test]
fn test_integer_literal_round_trip() {
    assert_eq!(run_ok("print 12345;"), "12345\n");
}

#[test]
fn test_decimal_formatting_drops_trailing_zero() {
    let output = run_ok("print 6.0; print 2.5; print 243.;");
    assert_eq!(output, "6\n2.5\n243\n");
}

#[test]
fn test_for_loop_prints_in_order() {
    let output = run_ok("for (int i = 0; i < 3; i = i + 1) { print i; }");
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_while_loop() {
    let output = run_ok("int i = 0; while (i < 3) { print i; i = i + 1; }");
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_for_each_loop() {
    let source = r#"
        array<int> xs = {5, 6, 7};
        int total = 0;
        for (int x : xs) { total = total + x; }
        print total;
    "#;
    assert_eq!(run_ok(source), "18\n");
}

#[test]
fn test_len_and_size() {
    let output = run_ok("array<int> a = {1, 2, 3}; print len(a); print size(a);");
    assert_eq!(output, "3\n3\n");
}

#[test]
fn test_index_out_of_bounds() {
    let (result, output) = run_runtime_error("array<int> a = {1, 2, 3}; print a[5];");
    assert!(result.diagnostics[0].message.contains("outside array bounds"));
    assert_eq!(output, "");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(run_ok(r#"print "ab" + "cd";"#), "abcd\n");
}

#[test]
fn test_string_plus_stringifies_right_operand() {
    assert_eq!(run_ok(r#"print "x: " + 5;"#), "x: 5\n");
}

#[test]
fn test_array_concatenation_mutates_left_operand() {
    let source = r#"
        array<int> a = {1, 2};
        array<int> b = {3};
        array<int> c = a + b;
        print len(a);
        print c[2];
        print a;
    "#;
    // `+` extends a's backing storage in place and yields it.
    assert_eq!(run_ok(source), "3\n3\n[1, 2, 3]\n");
}

#[test]
fn test_numeric_promotion() {
    let output = run_ok("print 1 + 2.5; print 7 / 2; print 7.0 / 2;");
    assert_eq!(output, "3.5\n3\n3.5\n");
}

#[test]
fn test_power_is_integer_for_integer_operands() {
    let output = run_ok("print 2 ** 3; print 2.0 ** 3;");
    assert_eq!(output, "8\n8\n");
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(run_ok("print 2 ** 3 ** 2;"), "512\n");
}

#[test]
fn test_bitwise_and_shift_operators() {
    let output = run_ok("print 6 & 3; print 6 | 3; print 6 ^ 3; print 1 << 4; print 16 >> 2; print ~0;");
    assert_eq!(output, "2\n7\n5\n16\n4\n-1\n");
}

#[test]
fn test_unary_operators() {
    let output = run_ok("print -5; print -2.5; print !false; print !null;");
    assert_eq!(output, "-5\n-2.5\ntrue\ntrue\n");
}

#[test]
fn test_equality() {
    let output = run_ok("print 1 == 1; print null == null; print 1 == 1.0; print \"a\" != \"b\";");
    assert_eq!(output, "true\ntrue\nfalse\ntrue\n");
}

#[test]
fn test_zero_is_truthy() {
    // Truthiness only knows null and booleans; every other value is true.
    let output = run_ok(r#"if (0) print "t"; else print "f";"#);
    assert_eq!(output, "t\n");
}

#[test]
fn test_logical_operators_short_circuit() {
    // The right operand is not evaluated, so the undeclared name never trips.
    let output = run_ok("print false && missing(); print true || missing();");
    assert_eq!(output, "false\ntrue\n");
}

#[test]
fn test_ternary() {
    let output = run_ok(r#"print true ? "yes" : "no"; print false ? 1 : 2;"#);
    assert_eq!(output, "yes\n2\n");
}

#[test]
fn test_ternary_condition_must_be_boolean() {
    let (result, _) = run_runtime_error("print 1 ? 2 : 3;");
    assert!(result.diagnostics[0].message.contains("must be a boolean"));
}

#[test]
fn test_function_call_and_recursion() {
    let source = r#"
        int fib(int n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
    "#;
    assert_eq!(run_ok(source), "55\n");
}

#[test]
fn test_return_unwinds_enclosing_loops() {
    let source = r#"
        int first-match() {
            for (int i = 0; i < 10; i = i + 1) {
                if (i == 3) return i;
            }
            return 0 - 1;
        }
        print first-match();
    "#;
    assert_eq!(run_ok(source), "3\n");
}

#[test]
fn test_break_has_no_loop_exit_effect() {
    // `break` parses but is inert; the loop runs to completion.
    let source = r#"
        int i = 0;
        while (i < 3) { break; i = i + 1; }
        print i;
    "#;
    assert_eq!(run_ok(source), "3\n");
}

#[test]
fn test_block_scoping_shadows_and_restores() {
    let source = r#"
        int x = 1;
        {
            int x = 2;
            print x;
        }
        print x;
    "#;
    assert_eq!(run_ok(source), "2\n1\n");
}

#[test]
fn test_assignment_writes_through_to_enclosing_scope() {
    let source = r#"
        int x = 1;
        { x = 5; }
        print x;
    "#;
    assert_eq!(run_ok(source), "5\n");
}

#[test]
fn test_display_builtins() {
    let output = run_ok(r#"display("a"); display("b"); displayln("c");"#);
    assert_eq!(output, "abc\n");
}

#[test]
fn test_clock_yields_a_decimal() {
    assert_eq!(run_ok("decimal t = clock();"), "");
}

#[test]
fn test_hyphenated_identifiers() {
    assert_eq!(run_ok("int a-b = 3; print a-b;"), "3\n");
}

#[test]
fn test_two_syntax_errors_report_both_and_execute_nothing() {
    let (result, output) = run_capture("int = 5; print 1; decimal = 2.0;");
    assert_eq!(result.status, RunStatus::StaticError);
    assert!(result.diagnostics.len() >= 2);
    assert_eq!(output, "");
}

#[test]
fn test_syntax_diagnostic_format() {
    let (result, _) = run_capture("print 1");
    assert_eq!(result.status, RunStatus::StaticError);
    let rendered = result.diagnostics[0].to_string();
    assert_eq!(rendered, "[line 1] Error at end: Expect ';' after value.");
}

#[test]
fn test_runtime_diagnostic_format() {
    let (result, _) = run_runtime_error("print missing;");
    let rendered = result.diagnostics[0].to_string();
    assert_eq!(rendered, "Undefined variable 'missing'.\n[line 1]");
}

#[test]
fn test_exit_codes_are_distinct() {
    let (success, _) = run_capture("print 1;");
    let (static_error, _) = run_capture("print 1");
    let (runtime_error, _) = run_capture("print missing;");

    assert_eq!(success.status.exit_code(), 0);
    assert_ne!(static_error.status.exit_code(), 0);
    assert_ne!(runtime_error.status.exit_code(), 0);
    assert_ne!(static_error.status.exit_code(), runtime_error.status.exit_code());
}
