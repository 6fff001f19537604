//! Static resolution pass for the Lox interpreter.
//!
//! This module performs a single AST walk to:
//! 1. **Build lexical scopes**: maintains a stack of `HashMap<String,bool>` tracking declared
//!    (false) and fully defined (true) names in each nested block, function, or class body.
//! 2. **Enforce static rules**: reports errors such as redeclaration in the same scope,
//!    reading a variable in its own initializer, invalid `return` outside functions,
//!    self-inheritance, and illegal use of `this` or `super` outside their classes.
//! 3. **Record binding distances**: for every variable occurrence (`Expr::Variable`,
//!    `Expr::Assign`, `Expr::This`, `Expr::Super`), calls back into the interpreter to
//!    note whether it is a local (and at what depth) or a global. This enables the
//!    runtime to perform O(1) lookups by climbing exactly the right number of
//!    environment frames.
//!
//! Diagnostics accumulate: a static error is recorded and the walk continues, so a
//! single pass surfaces every problem in the program. The caller must not run the
//! program if any error was produced.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::error::LoxError;
use crate::expr::Expr;
use crate::interpreter::Interpreter;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ClassType {
    /// Not inside any class
    None,

    /// Inside a class declaration _without_ a superclass
    Class,

    /// Inside a class declaration _with_ a superclass
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances (locals vs. globals) by calling back into the interpreter.
pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
    errors: Vec<LoxError>,
}

impl<'interp> Resolver<'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top-level statements and return every diagnostic produced.
    pub fn resolve(mut self, statements: &[Stmt]) -> Vec<LoxError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
        self.errors
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        debug!("Resolving stmt: {:?}", stmt);

        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Block(statements) => {
                // 1. Push a new anonymous scope for `{ … }`
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s);
                }

                // 2. Pop the block scope
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // 1. Declare the variable name (marked but not yet defined)
                self.declare(name);

                // 2. Resolve the initializer expression, if any
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                // 3. Define the variable so it's available in this scope
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Declare and define eagerly so the body may recurse.
                self.declare(&declaration.name);
                self.define(&declaration.name);

                self.resolve_function(FunctionType::Function, declaration);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                // Resolve every branch that *could* run, not just the one
                // that will.
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                // 1. Ensure we're inside a function or initializer
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Cannot return from top-level code.");
                }

                if let Some(expr) = value {
                    // 2. In an initializer, only bare `return;` is allowed
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Cannot return a value from an initializer.");
                    }

                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[Rc<FunctionDecl>]) {
        // 1. Declare & define the class name so methods can refer to it
        self.declare(name);
        self.define(name);

        // 2. Save and enter the class context
        let enclosing_class: ClassType = self.current_class;

        match superclass {
            Some(superclass_expr) => {
                // 3. Self-inheritance guard
                if let Expr::Variable {
                    name: super_name, ..
                } = superclass_expr
                {
                    if super_name.lexeme == name.lexeme {
                        self.error(super_name, "A class cannot inherit from itself.");
                    }
                }

                self.current_class = ClassType::Subclass;

                // 4. Resolve the superclass variable like any other use
                self.resolve_expr(superclass_expr);

                // 5. Open a scope for `super`
                self.begin_scope();
                self.scope_insert("super");
            }

            None => {
                self.current_class = ClassType::Class;
            }
        }

        // 6. Open the implicit `this` scope for methods
        self.begin_scope();
        self.scope_insert("this");

        // 7. Resolve each method in its own function context
        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(kind, method);
        }

        // 8. Close the `this` scope
        self.end_scope();

        // 9. If we opened a `super` scope, close it now
        if superclass.is_some() {
            self.end_scope();
        }

        // 10. Restore the outer class context
        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        debug!("Resolving expr: {:?}", expr);
        match expr {
            Expr::Literal(_) => {
                // Literals have no sub-expressions
            }

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // Prevent reading a variable in its own initializer
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.error(
                            name,
                            "Cannot read local variable in its own initializer.",
                        );
                    }
                }

                // Bind this variable occurrence at its lexical depth
                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // Resolve the right-hand side first, then bind the assignment
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => {
                // Properties are looked up dynamically; only the object
                // expression needs resolution.
                self.resolve_expr(object);
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                // 'this' is only valid inside class methods
                if self.current_class == ClassType::None {
                    self.error(keyword, "Cannot use 'this' outside of a class.");
                }

                // Bind 'this' like a local variable
                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                // 1. Disallow outside any class
                if self.current_class == ClassType::None {
                    self.error(keyword, "Cannot use 'super' outside of a class.");
                } else if self.current_class != ClassType::Subclass {
                    // 2. Disallow in a class with no superclass
                    self.error(keyword, "Cannot use 'super' in a class with no superclass.");
                }

                // 3. Bind 'super' like a local variable
                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.
    ///
    /// `kind` indicates whether this is a plain function, a method, or an
    /// initializer.
    fn resolve_function(&mut self, kind: FunctionType, declaration: &FunctionDecl) {
        // 1. Save the enclosing function context so we can restore it later.
        let enclosing = self.current_function;
        self.current_function = kind;

        // 2. Begin a new lexical scope for the function parameters & body.
        self.begin_scope();

        // 3. Declare and immediately define each parameter in this new scope.
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        // 4. Resolve each statement in the function body under this context.
        for stmt in &declaration.body {
            self.resolve_stmt(stmt);
        }

        // 5. End the function's parameter/body scope.
        self.end_scope();

        // 6. Restore the previous function context.
        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        // Global scope is not tracked; the environment handles it at runtime.
        if self.scopes.is_empty() {
            return;
        }

        let duplicate = self
            .scopes
            .last()
            .map_or(false, |scope| scope.contains_key(&name.lexeme));

        if duplicate {
            self.error(
                name,
                "Variable with this name already declared in this scope.",
            );
        }

        // Mark the name as declared but not yet defined
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        // Mark the name as fully defined in the current scope
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn scope_insert(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as either:
    ///  - a local at depth `d`, or
    ///  - a global if not found in any scope.
    fn resolve_local(&mut self, id: usize, name: &Token) {
        // 1. Search each scope from innermost outward
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                // 2. Tell the interpreter about the local binding
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        // 3. Not found in any scope → it's a global
        debug!("Resolved '{}' as global", name.lexeme);
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(LoxError::resolve(token, message));
    }
}
