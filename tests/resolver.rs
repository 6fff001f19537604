#[cfg(test)]
mod resolver_tests {
    use lox_interpreter as lox;

    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::parser::Parser;
    use lox::resolver::Resolver;
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn resolve_source(source: &str) -> Vec<LoxError> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(
            parse_errors.is_empty(),
            "unexpected parse errors: {:?}",
            parse_errors
        );

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter).resolve(&statements)
    }

    fn assert_resolves_clean(source: &str) {
        let errors = resolve_source(source);
        assert!(errors.is_empty(), "unexpected resolve errors: {:?}", errors);
    }

    fn assert_single_error(source: &str, expected_message: &str) {
        let errors = resolve_source(source);

        assert_eq!(errors.len(), 1, "errors: {:?}", errors);
        assert!(
            errors[0].to_string().contains(expected_message),
            "expected '{}', got '{}'",
            expected_message,
            errors[0]
        );
    }

    #[test]
    fn test_resolver_01_read_in_own_initializer() {
        assert_single_error(
            "{ var a = a; }",
            "Cannot read local variable in its own initializer.",
        );
    }

    #[test]
    fn test_resolver_02_top_level_return() {
        assert_single_error("return 1;", "Cannot return from top-level code.");
    }

    #[test]
    fn test_resolver_03_self_inheritance() {
        assert_single_error("class X < X {}", "A class cannot inherit from itself.");
    }

    #[test]
    fn test_resolver_04_duplicate_local_declaration() {
        assert_single_error(
            "fun f() { var a = 1; var a = 2; }",
            "Variable with this name already declared in this scope.",
        );
    }

    #[test]
    fn test_resolver_05_this_outside_class() {
        assert_single_error("print this;", "Cannot use 'this' outside of a class.");
    }

    #[test]
    fn test_resolver_06_super_outside_class() {
        assert_single_error(
            "fun f() { super.m(); }",
            "Cannot use 'super' outside of a class.",
        );
    }

    #[test]
    fn test_resolver_07_super_without_superclass() {
        assert_single_error(
            "class A { m() { super.m(); } }",
            "Cannot use 'super' in a class with no superclass.",
        );
    }

    #[test]
    fn test_resolver_08_return_value_from_initializer() {
        assert_single_error(
            "class A { init() { return 1; } }",
            "Cannot return a value from an initializer.",
        );
    }

    #[test]
    fn test_resolver_09_bare_return_in_initializer_ok() {
        assert_resolves_clean("class A { init() { return; } }");
    }

    #[test]
    fn test_resolver_10_valid_program_resolves() {
        assert_resolves_clean(
            "class A { m() { return this; } } \
             class B < A { m() { return super.m(); } } \
             fun make() { var i = 0; fun tick() { i = i + 1; return i; } return tick; } \
             var t = make(); t();",
        );
    }

    #[test]
    fn test_resolver_11_global_redeclaration_ok() {
        // Redefining a global is legal; only local scopes reject duplicates.
        assert_resolves_clean("var a = 1; var a = 2;");
    }

    #[test]
    fn test_resolver_12_errors_accumulate() {
        let errors = resolve_source("return 1; print this;");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_resolver_13_shadowing_in_nested_scope_ok() {
        assert_resolves_clean("{ var a = 1; { var a = 2; print a; } print a; }");
    }

    #[test]
    fn test_resolver_14_return_inside_nested_function_ok() {
        assert_resolves_clean("fun outer() { fun inner() { return 1; } return inner; }");
    }
}
