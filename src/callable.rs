//! Runtime callables: user functions, classes, and instances.
//!
//! A `LoxFunction` packages a shared declaration with the environment chain
//! it closed over.  Binding a method extends that chain with a one-entry
//! scope holding `this`; calling any function extends it again with a fresh
//! per-call scope for parameters.  Classes are callable too: invoking one
//! allocates an instance and runs its bound `init`, which always hands the
//! instance back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Interpreter, Unwind};
use crate::stmt::FunctionDecl;
use crate::token::Token;
use crate::value::Value;

pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produces a bound method: the same declaration over a closure extended
    /// with `this`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let mut scope = Environment::with_enclosing(Rc::clone(&self.closure));
        scope.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(scope)),
            is_initializer: self.is_initializer,
        }
    }

    /// Runs the body in a fresh per-call environment.  A `Return` unwind
    /// stops here; an initializer yields `this` no matter how the body
    /// exited.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let environment = Rc::new(RefCell::new(environment));

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    Ok(Value::Nil)
                }
            }

            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    Ok(value)
                }
            }

            Err(Unwind::Error(e)) => Err(e),
        }
    }

    // For an initializer the closure's innermost scope is always the `this`
    // binding installed by `bind`.
    fn bound_this(&self) -> Result<Value> {
        Environment::get_at(&self.closure, 0, "this", self.declaration.name.line)
    }
}

pub struct LoxClass {
    pub name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
        }
    }

    /// Looks `name` up on this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map_or(0, |initializer| initializer.arity())
    }

    /// Calling a class allocates an instance and runs a bound `init` when
    /// one exists.
    pub fn call(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    /// Property lookup: fields shadow methods; a found method is bound to
    /// this instance.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = instance.borrow().class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance)))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
