//! Callable values

use std::rc::Rc;

use super::env::Environment;
use super::eval::Interpreter;
use super::value::{ControlFlow, Value};
use crate::ast::FunctionDecl;
use crate::diagnostics::RuntimeError;

/// Anything the interpreter can invoke with `callee(args)`
pub trait Callable {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Run with already-evaluated arguments; `args.len() == self.arity()`
    fn call(&self, interp: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError>;
}

/// A user-defined function
///
/// The body runs in a fresh scope whose parent is the *global* environment,
/// not the scope the function was declared in. Locals of enclosing blocks
/// are therefore not visible inside the body.
#[derive(Debug, Clone)]
pub struct Function {
    declaration: Rc<FunctionDecl>,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>) -> Self {
        Self { declaration }
    }
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interp: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut frame = Environment::with_enclosing(interp.globals());
        for (param, arg) in self.declaration.params.iter().zip(args) {
            frame.declare(param.lexeme.clone(), arg);
        }

        tracing::trace!(function = self.name(), "call");
        match interp.execute_block(&self.declaration.body, frame.into_ref())? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Normal => Ok(Value::Null),
        }
    }
}
