//! Tree-walking interpreter
//!
//! Executes the parsed program directly against a chain of environments.

pub mod env;
pub mod eval;
pub mod function;
pub mod value;

pub use env::Environment;
pub use eval::Interpreter;
pub use function::{Callable, Function};
pub use value::{ControlFlow, Value};
