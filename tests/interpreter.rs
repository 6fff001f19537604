#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use lox_interpreter as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    /// Runs `source` through the full pipeline, capturing everything the
    /// program printed.
    fn run_source_with(source: &str, repl: bool) -> (String, Result<(), LoxError>) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(
            parse_errors.is_empty(),
            "unexpected parse errors: {:?}",
            parse_errors
        );

        let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(sink.clone());
        interpreter.set_repl(repl);

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        assert!(
            resolve_errors.is_empty(),
            "unexpected resolve errors: {:?}",
            resolve_errors
        );

        let result = interpreter.interpret(&statements);

        let output = String::from_utf8(sink.borrow().clone()).expect("utf-8 output");
        (output, result)
    }

    fn run_source(source: &str) -> (String, Result<(), LoxError>) {
        run_source_with(source, false)
    }

    fn assert_prints(source: &str, expected: &[&str]) {
        let (output, result) = run_source(source);
        assert!(result.is_ok(), "runtime error: {:?}", result.err());

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, expected);
    }

    fn assert_runtime_error(source: &str, expected_message: &str) {
        let (_, result) = run_source(source);

        match result {
            Err(e) => assert!(
                e.to_string().contains(expected_message),
                "expected '{}', got '{}'",
                expected_message,
                e
            ),

            Ok(()) => panic!("expected runtime error containing '{}'", expected_message),
        }
    }

    // ─── Expressions and printing ────────────────────────────────────────────

    #[test]
    fn test_interp_01_arithmetic_precedence() {
        assert_prints("print 1 + 2 * 3;", &["7"]);
    }

    #[test]
    fn test_interp_02_string_concatenation() {
        assert_prints(
            "var a = \"hi\"; var b = \" there\"; print a + b;",
            &["hi there"],
        );
    }

    #[test]
    fn test_interp_03_number_formatting() {
        assert_prints("print 2.5; print 5 / 2; print 4 / 2;", &["2.5", "2.5", "2"]);
    }

    #[test]
    fn test_interp_04_string_plus_literals() {
        assert_prints(
            "print \"a\" + 1; print \"v=\" + true; print \"x\" + \"y\";",
            &["a1", "v=true", "xy"],
        );
    }

    #[test]
    fn test_interp_05_equality_table() {
        assert_prints(
            "print nil == nil; print nil == 0; print 0 == \"0\"; print 1 == 1;",
            &["true", "false", "false", "true"],
        );
    }

    #[test]
    fn test_interp_06_truthiness() {
        assert_prints(
            "if (0) print \"zero\"; else print \"no\"; \
             if (\"\") print \"empty\"; else print \"no\"; \
             if (nil) print \"nil\"; else print \"no\";",
            &["zero", "empty", "no"],
        );
    }

    #[test]
    fn test_interp_07_logical_returns_operand() {
        assert_prints(
            "print nil or \"yes\"; print 1 and 2; print false or false;",
            &["yes", "2", "false"],
        );
    }

    #[test]
    fn test_interp_08_short_circuit_side_effects() {
        assert_prints(
            "fun boom() { print \"boom\"; return true; } \
             print true or boom(); \
             print false and boom();",
            &["true", "false"],
        );
    }

    // ─── Variables, scopes, and closures ─────────────────────────────────────

    #[test]
    fn test_interp_09_block_shadowing() {
        assert_prints("var a = 1; { var a = 2; print a; } print a;", &["2", "1"]);
    }

    #[test]
    fn test_interp_10_closure_counter() {
        assert_prints(
            "fun make() { var i = 0; fun tick() { i = i + 1; print i; } return tick; } \
             var t = make(); t(); t(); t();",
            &["1", "2", "3"],
        );
    }

    #[test]
    fn test_interp_11_closures_share_environment() {
        assert_prints(
            "var get; var set; \
             { var x = 0; \
               fun setter(v) { x = v; } \
               fun getter() { return x; } \
               set = setter; get = getter; } \
             set(5); print get();",
            &["5"],
        );
    }

    #[test]
    fn test_interp_12_static_resolution_snapshot() {
        // The closure keeps seeing the binding it resolved against, not the
        // one declared later in the same block.
        assert_prints(
            "var a = \"global\"; \
             { fun show() { print a; } \
               show(); \
               var a = \"block\"; \
               show(); }",
            &["global", "global"],
        );
    }

    #[test]
    fn test_interp_13_while_loop() {
        assert_prints(
            "var i = 0; while (i < 3) { print i; i = i + 1; }",
            &["0", "1", "2"],
        );
    }

    #[test]
    fn test_interp_14_for_loop() {
        assert_prints("for (var i = 0; i < 3; i = i + 1) print i;", &["0", "1", "2"]);
    }

    #[test]
    fn test_interp_15_recursion() {
        assert_prints(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } \
             print fib(10);",
            &["55"],
        );
    }

    // ─── Functions and natives ───────────────────────────────────────────────

    #[test]
    fn test_interp_16_function_stringify() {
        assert_prints(
            "fun f() {} print f; print clock;",
            &["<fn f>", "<native fn>"],
        );
    }

    #[test]
    fn test_interp_17_clock_is_a_number() {
        assert_prints("print clock() >= 0;", &["true"]);
    }

    #[test]
    fn test_interp_18_implicit_nil_return() {
        assert_prints("fun f() {} print f();", &["nil"]);
    }

    // ─── Classes ─────────────────────────────────────────────────────────────

    #[test]
    fn test_interp_19_init_sets_fields() {
        assert_prints("class P { init(x) { this.x = x; } } print P(7).x;", &["7"]);
    }

    #[test]
    fn test_interp_20_methods_and_this() {
        assert_prints(
            "class C { init(n) { this.n = n; } double() { return this.n * 2; } } \
             print C(21).double();",
            &["42"],
        );
    }

    #[test]
    fn test_interp_21_init_returns_instance_on_bare_return() {
        assert_prints(
            "class P { init() { this.x = 1; return; this.x = 2; } } print P().x;",
            &["1"],
        );
    }

    #[test]
    fn test_interp_22_inherited_method() {
        assert_prints(
            "class A { m() { return \"a\"; } } class B < A {} print B().m();",
            &["a"],
        );
    }

    #[test]
    fn test_interp_23_super_call() {
        assert_prints(
            "class A { greet() { print \"A\"; } } \
             class B < A { greet() { super.greet(); print \"B\"; } } \
             B().greet();",
            &["A", "B"],
        );
    }

    #[test]
    fn test_interp_24_super_skips_own_override() {
        assert_prints(
            "class A { m() { return \"A\"; } } \
             class B < A { m() { return \"B\"; } } \
             class C < B { m() { return super.m(); } } \
             print C().m();",
            &["B"],
        );
    }

    #[test]
    fn test_interp_25_fields_are_mutable() {
        assert_prints(
            "class A {} var a = A(); a.f = 1; a.f = a.f + 1; print a.f;",
            &["2"],
        );
    }

    #[test]
    fn test_interp_26_fields_shadow_methods() {
        assert_prints(
            "class A { m() { return \"method\"; } } \
             var a = A(); a.m = \"field\"; print a.m;",
            &["field"],
        );
    }

    #[test]
    fn test_interp_27_class_and_instance_stringify() {
        assert_prints("class A {} print A; print A();", &["A", "A instance"]);
    }

    #[test]
    fn test_interp_28_bound_method_remembers_instance() {
        assert_prints(
            "class A { init(n) { this.n = n; } show() { print this.n; } } \
             var m = A(1).show; m();",
            &["1"],
        );
    }

    // ─── Runtime errors ──────────────────────────────────────────────────────

    #[test]
    fn test_interp_29_plus_type_error() {
        assert_runtime_error(
            "print 1 + \"a\";",
            "Operands must be either two numbers or a string and a literal value.",
        );
    }

    #[test]
    fn test_interp_30_unary_minus_type_error() {
        assert_runtime_error("print -\"a\";", "Operand must be a number.");
    }

    #[test]
    fn test_interp_31_comparison_type_error_format() {
        let (_, result) = run_source("print 1 < \"a\";");

        match result {
            Err(e) => assert_eq!(e.to_string(), "Operands must be numbers.\n[line 1]"),
            Ok(()) => panic!("expected runtime error"),
        }
    }

    #[test]
    fn test_interp_32_undefined_variable() {
        assert_runtime_error("print missing;", "Undefined variable 'missing'.");
    }

    #[test]
    fn test_interp_33_undefined_assignment_target() {
        assert_runtime_error("missing = 1;", "Undefined variable 'missing'.");
    }

    #[test]
    fn test_interp_34_calling_non_callable() {
        assert_runtime_error("\"hi\"();", "Can only call functions and classes.");
    }

    #[test]
    fn test_interp_35_arity_mismatch() {
        assert_runtime_error(
            "fun f(a, b) {} f(1);",
            "Expected 2 arguments but got 1.",
        );
    }

    #[test]
    fn test_interp_36_property_on_non_instance() {
        assert_runtime_error("1 .x;", "Only instances have properties.");
    }

    #[test]
    fn test_interp_37_field_on_non_instance() {
        assert_runtime_error("true.x = 1;", "Only instances have fields.");
    }

    #[test]
    fn test_interp_38_undefined_property() {
        assert_runtime_error("class A {} print A().x;", "Undefined property 'x'.");
    }

    #[test]
    fn test_interp_39_undefined_super_method() {
        assert_runtime_error(
            "class A {} class B < A { m() { return super.missing(); } } B().m();",
            "Undefined property 'missing'.",
        );
    }

    #[test]
    fn test_interp_40_superclass_must_be_class() {
        assert_runtime_error("var NotAClass = 1; class B < NotAClass {}", "Superclass must be a class.");
    }

    // ─── REPL echo ───────────────────────────────────────────────────────────

    #[test]
    fn test_interp_41_repl_echoes_expressions() {
        let (output, result) = run_source_with("1 + 2;", true);

        assert!(result.is_ok());
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_interp_42_repl_stays_silent_for_assign_set_call() {
        let (output, result) = run_source_with(
            "var x = 1; x = 2; fun f() {} f(); class A {} var a = A(); a.y = 3; x + 1;",
            true,
        );

        assert!(result.is_ok());
        assert_eq!(output, "3\n");
    }
}
