use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

/// One lexical scope: a name table plus an optional link to the enclosing
/// scope.  Scopes form a singly-linked chain rooted at the interpreter's
/// globals, shared through `Rc<RefCell<_>>` by every closure that captured
/// them.
#[derive(Debug, Clone)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Unconditionally binds `name` in this scope.  Redefinition is allowed
    /// here; duplicate local declarations are rejected statically by the
    /// resolver, which keeps redefining a global at the prompt legal.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(undefined_variable(name, line))
        }
    }

    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(undefined_variable(name, line))
        }
    }

    /// The scope reached by following `enclosing` exactly `distance` times,
    /// or `None` if the chain is shorter than that.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut scope: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..distance {
            let enclosing = scope.borrow().enclosing.clone()?;
            scope = enclosing;
        }

        Some(scope)
    }

    /// Reads `name` directly out of the scope `distance` hops away, without
    /// walking further outward.  The resolver only produces distances whose
    /// target scope holds the binding.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        match Environment::ancestor(env, distance) {
            Some(scope) => {
                let scope = scope.borrow();
                scope
                    .values
                    .get(name)
                    .cloned()
                    .ok_or_else(|| undefined_variable(name, line))
            }

            None => Err(undefined_variable(name, line)),
        }
    }

    /// Writes `name` directly into the scope `distance` hops away.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        match Environment::ancestor(env, distance) {
            Some(scope) => {
                scope.borrow_mut().values.insert(name.to_string(), value);
                Ok(())
            }

            None => Err(undefined_variable(name, line)),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

fn undefined_variable(name: &str, line: usize) -> LoxError {
    LoxError::Runtime {
        message: format!("Undefined variable '{}'.", name),
        line,
    }
}
