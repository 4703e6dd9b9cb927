//! Variable storage with a parent chain
//!
//! Each block, and each function call, gets a fresh [`Environment`] whose
//! `enclosing` link points outward. The chain always ends at the single
//! global environment. Lookups and assignments walk the chain; declarations
//! only ever touch the innermost scope.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::Value;
use crate::diagnostics::RuntimeError;
use crate::lexer::Token;

/// Shared handle to a scope
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: FxHashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A global scope
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope nested in `enclosing`
    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Self {
            values: FxHashMap::default(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope. Redeclaring overwrites.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Overwrite the nearest existing binding of `name`
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(outer) => outer.borrow_mut().assign(name, value),
            None => Err(undefined(name)),
        }
    }

    /// Value of the nearest binding of `name`
    pub fn lookup(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(outer) => outer.borrow().lookup(name),
            None => Err(undefined(name)),
        }
    }

    /// Like [`lookup`](Self::lookup), for callers without a token
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.enclosing.as_ref()?.borrow().get(name),
        }
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::at(name, format!("Undefined variable '{}'.", name.lexeme))
}
