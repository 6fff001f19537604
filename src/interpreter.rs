use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::callable::{LoxClass, LoxFunction, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::Expr;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local exit from statement execution.  `Return` is not an error: it is
/// raised by a `return` statement and consumed by the nearest enclosing call
/// frame.  Everything else travels as `Error` and surfaces at `interpret`.
pub enum Unwind {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Unwind {
    fn from(error: LoxError) -> Self {
        Unwind::Error(error)
    }
}

impl From<io::Error> for Unwind {
    fn from(error: io::Error) -> Self {
        Unwind::Error(LoxError::Io(error))
    }
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<usize, usize>,
    repl: bool,
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Builds an interpreter whose `print` statements (and REPL echo) write
    /// to the given sink instead of stdout.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            repl: false,
            output,
        }
    }

    /// In REPL mode, bare expression statements echo their value.
    pub fn set_repl(&mut self, repl: bool) {
        self.repl = repl;
    }

    /// Resolver callback: the expression node `id` refers to a local binding
    /// `depth` scopes out from its use site.  Nodes never noted here fall
    /// back to the global table at evaluation time.
    pub fn note_local(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        info!("Interpreting {} statement(s)", statements.len());

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}

                Err(Unwind::Error(e)) => return Err(e),

                // Statically rejected by the resolver.
                Err(Unwind::Return(_)) => return Ok(()),
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> std::result::Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                let value: Value = self.evaluate(expr)?;

                let silent = matches!(
                    expr,
                    Expr::Assign { .. } | Expr::Set { .. } | Expr::Call { .. }
                );

                if self.repl && !silent {
                    writeln!(self.output.borrow_mut(), "{}", value)?;
                }

                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output.borrow_mut(), "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(scope)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Runs `statements` inside `environment`, restoring the previous
    /// environment on every exit path, including unwinds.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> std::result::Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));

        self.environment = previous;

        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> std::result::Result<(), Unwind> {
        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(superclass_expr) => match self.evaluate(superclass_expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let token: &Token = match superclass_expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };

                    return Err(LoxError::runtime(token, "Superclass must be a class.").into());
                }
            },

            None => None,
        };

        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra scope binding `super`;
        // it is unwound again before the class value is stored.
        let enclosing: Option<Rc<RefCell<Environment>>> = match &superclass_value {
            Some(class) => {
                let previous = Rc::clone(&self.environment);

                let mut scope = Environment::with_enclosing(Rc::clone(&self.environment));
                scope.define("super", Value::Class(Rc::clone(class)));

                self.environment = Rc::new(RefCell::new(scope));

                Some(previous)
            }

            None => None,
        };

        let mut method_table: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for method in methods {
            let is_initializer = method.name.lexeme == "init";

            let function = LoxFunction::new(
                Rc::clone(method),
                Rc::clone(&self.environment),
                is_initializer,
            );

            method_table.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme.clone(), superclass_value, method_table);

        if let Some(previous) = enclosing {
            self.environment = previous;
        }

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)), name.line)?;

        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> std::result::Result<Value, Unwind> {
        match expr {
            Expr::Literal(token) => self.evaluate_literal(token).map_err(Unwind::Error),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                self.evaluate_unary(operator, right).map_err(Unwind::Error)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                self.evaluate_binary(left, operator, right)
                    .map_err(Unwind::Error)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                // Short-circuit by handing back the deciding operand itself.
                match operator.token_type {
                    TokenType::OR if is_truthy(&left) => Ok(left),
                    TokenType::AND if !is_truthy(&left) => Ok(left),
                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => {
                self.lookup_variable(name, *id).map_err(Unwind::Error)
            }

            Expr::This { id, keyword } => {
                self.lookup_variable(keyword, *id).map_err(Unwind::Error)
            }

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        *distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => self.globals.borrow_mut().assign(
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren).map_err(Unwind::Error)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    LoxInstance::get(&instance, name).map_err(Unwind::Error)
                }

                _ => Err(LoxError::runtime(name, "Only instances have properties.").into()),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(LoxError::runtime(name, "Only instances have fields.").into()),
            },

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method).map_err(Unwind::Error),
        }
    }

    fn evaluate_literal(&self, token: &Token) -> Result<Value> {
        match &token.token_type {
            TokenType::NUMBER(n) => Ok(Value::Number(*n)),

            TokenType::STRING(s) => Ok(Value::String(s.clone())),

            TokenType::TRUE => Ok(Value::Bool(true)),

            TokenType::FALSE => Ok(Value::Bool(false)),

            TokenType::NIL => Ok(Value::Nil),

            _ => Err(LoxError::runtime(token, "Invalid literal.")),
        }
    }

    fn evaluate_unary(&self, operator: &Token, value: Value) -> Result<Value> {
        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&self, left: Value, operator: &Token, right: Value) -> Result<Value> {
        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                // A leading string concatenates with any printable literal.
                (Value::String(a), b @ (Value::Number(_) | Value::String(_) | Value::Bool(_))) => {
                    Ok(Value::String(format!("{}{}", a, b)))
                }

                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be either two numbers or a string and a literal value.",
                )),
            },

            TokenType::MINUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::STAR => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::SLASH => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left, &right))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left, &right))),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    /// Resolved locals read the scope exactly `distance` hops out; anything
    /// the resolver left untouched is a global reference.
    fn lookup_variable(&self, name: &Token, id: usize) -> Result<Value> {
        match self.locals.get(&id) {
            Some(distance) => {
                Environment::get_at(&self.environment, *distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    fn call_value(&mut self, callee: Value, arguments: Vec<Value>, paren: &Token) -> Result<Value> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native fn {}", name);

                check_arity(arity, arguments.len(), paren)?;

                func(&arguments)
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                function.call(self, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                LoxClass::call(&class, self, arguments)
            }

            _ => Err(LoxError::runtime(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn evaluate_super(&mut self, id: usize, keyword: &Token, method: &Token) -> Result<Value> {
        let distance: usize = match self.locals.get(&id) {
            Some(distance) => *distance,
            None => {
                return Err(LoxError::runtime(
                    keyword,
                    "Cannot use 'super' outside of a class.",
                ))
            }
        };

        let superclass = Environment::get_at(&self.environment, distance, "super", keyword.line)?;

        // `this` always lives one scope inside the `super` scope.
        let instance = Environment::get_at(&self.environment, distance - 1, "this", keyword.line)?;

        match (superclass, instance) {
            (Value::Class(superclass), Value::Instance(instance)) => {
                match superclass.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),

                    None => Err(LoxError::runtime(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    )),
                }
            }

            _ => Err(LoxError::runtime(
                keyword,
                "'super' is only valid inside a subclass method.",
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,

        (Value::Number(a), Value::Number(b)) => a == b,

        (Value::String(a), Value::String(b)) => a == b,

        (Value::Bool(a), Value::Bool(b)) => a == b,

        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

        (
            Value::NativeFunction { func: a, .. },
            Value::NativeFunction { func: b, .. },
        ) => a == b,

        _ => false,
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
    if expected != got {
        return Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }

    Ok(())
}

fn clock_native(_arguments: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);

    Ok(Value::Number(timestamp))
}
