//! Statement execution and expression evaluation
//!
//! The interpreter owns the global scope and a pointer to the current one.
//! Blocks and calls swap the current scope in and out through
//! [`Interpreter::execute_block`], which always restores the previous scope,
//! including when the block fails.

use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use crate::ast::*;
use crate::common::Span;
use crate::diagnostics::RuntimeError;
use crate::lexer::Token;

use super::env::{EnvRef, Environment};
use super::function::Function;
use super::value::{ControlFlow, Value};

type Slot = (Rc<RefCell<Vec<Value>>>, usize);

/// Tree-walking interpreter
///
/// Globals persist across [`run`](Self::run) calls, which is what the REPL
/// relies on.
pub struct Interpreter {
    globals: EnvRef,
    env: EnvRef,
    input: Box<dyn BufRead>,
    out: Box<dyn Write>,
    /// Every line written by `print`, in order
    output: Vec<String>,
}

impl Interpreter {
    /// Interpreter reading from stdin and printing to stdout
    pub fn new() -> Self {
        Self::with_io(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(input: Box<dyn BufRead>, out: Box<dyn Write>) -> Self {
        let globals = Environment::new().into_ref();
        Interpreter {
            env: globals.clone(),
            globals,
            input,
            out,
            output: Vec::new(),
        }
    }

    pub fn globals(&self) -> EnvRef {
        self.globals.clone()
    }

    /// Current value of a global, if bound
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    /// Lines printed so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.interpret(&program.statements)
    }

    /// Execute top-level statements in order, stopping at the first error
    ///
    /// A `return` outside any function ends the run without error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            if let ControlFlow::Return(_) = self.execute(stmt)? {
                tracing::debug!("top-level return, stopping");
                break;
            }
        }
        Ok(())
    }

    /// Run `statements` with `env` as the current scope
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: EnvRef,
    ) -> Result<ControlFlow, RuntimeError> {
        let previous = std::mem::replace(&mut self.env, env);
        let result = self.execute_all(statements);
        self.env = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        for stmt in statements {
            if let flow @ ControlFlow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Print { keyword, value } => {
                let value = self.evaluate(value)?;
                self.print(keyword, value.to_string())?;
            }
            Stmt::Variable { name, init } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                self.env.borrow_mut().declare(name.lexeme.clone(), value);
            }
            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(self.env.clone()).into_ref();
                return self.execute_block(statements, scope);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                }
                if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ ControlFlow::Return(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }
            }
            Stmt::Function(decl) => {
                let function = Function::new(decl.clone());
                self.env
                    .borrow_mut()
                    .declare(decl.name.lexeme.clone(), Value::Function(Rc::new(function)));
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                return Ok(ControlFlow::Return(value));
            }
            Stmt::Read {
                kind,
                keyword,
                target,
            } => self.read(*kind, keyword, target)?,
        }
        Ok(ControlFlow::Normal)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
            }),
            Expr::Grouping { inner } => self.evaluate(inner),
            Expr::Unary { op, operand, span } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(*span, "Operand must be a number.")),
                    },
                }
            }
            Expr::Binary {
                left,
                op,
                right,
                span,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, left, right, *span)
            }
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left)?;
                let decided = match op {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.env.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Variable { name } => self.env.borrow().lookup(name),
            Expr::Call {
                callee,
                args,
                paren,
            } => {
                let callee = self.evaluate(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                let Value::Function(function) = callee else {
                    return Err(RuntimeError::at(paren, "Expected function call."));
                };
                if args.len() != function.arity() {
                    return Err(RuntimeError::at(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            function.arity(),
                            args.len()
                        ),
                    ));
                }
                function.call(self, args)
            }
            Expr::Array { elements } => {
                let elements = elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(elements))
            }
            Expr::Index {
                object,
                index,
                bracket,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let (array, i) = slot(object, index, bracket)?;
                let element = array.borrow()[i].clone();
                Ok(element)
            }
            Expr::IndexAssign {
                object,
                index,
                value,
                bracket,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let (array, i) = slot(object, index, bracket)?;
                let value = self.evaluate(value)?;
                array.borrow_mut()[i] = value.clone();
                Ok(value)
            }
        }
    }

    fn read(&mut self, kind: ReadKind, keyword: &Token, target: &Expr) -> Result<(), RuntimeError> {
        let Expr::Variable { name } = target else {
            return Err(RuntimeError::at(keyword, "Read target must be a variable."));
        };

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| RuntimeError::at(keyword, format!("Could not read input: {e}.")))?;
        if read == 0 {
            return Err(RuntimeError::at(keyword, "Unexpected end of input."));
        }
        let line = line.trim_end_matches(['\n', '\r']);
        tracing::trace!(kind = kind.as_str(), input = line, "read");

        let value = match kind {
            ReadKind::String => Value::String(line.to_string()),
            ReadKind::Number => match parse_decimal(line.trim()) {
                Some(n) => Value::Number(n),
                None => return Err(RuntimeError::at(keyword, "Number value expected.")),
            },
            ReadKind::Boolean => match line.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(RuntimeError::at(keyword, "Boolean value expected.")),
            },
        };
        self.env.borrow_mut().assign(name, value)
    }

    fn print(&mut self, keyword: &Token, line: String) -> Result<(), RuntimeError> {
        writeln!(self.out, "{line}")
            .and_then(|()| self.out.flush())
            .map_err(|e| RuntimeError::at(keyword, format!("Could not write output: {e}.")))?;
        self.output.push(line);
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a plain decimal such as `-12`, `3.5` or `2e10`. Unlike
/// `str::parse::<f64>` this refuses `inf` and `NaN`.
fn parse_decimal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e.strip_prefix(['+', '-']).unwrap_or(e))),
        None => (unsigned, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let valid = !(int.is_empty() && frac.is_empty())
        && digits(int)
        && digits(frac)
        && exponent.is_none_or(|e| !e.is_empty() && digits(e));
    if valid { text.parse().ok() } else { None }
}

fn binary(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::Ne => return Ok(Value::Bool(left != right)),
        BinaryOp::Add => {
            return match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::new(
                    span,
                    "Operands must be two numbers or two strings.",
                )),
            };
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(RuntimeError::new(span, "Operands must be numbers."));
    };
    Ok(match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Rem => Value::Number(a % b),
        BinaryOp::Pow => Value::Number(a.powf(b)),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
    })
}

/// Resolve `object[index]` to a checked array slot
fn slot(object: Value, index: Value, bracket: &Token) -> Result<Slot, RuntimeError> {
    let Value::Array(array) = object else {
        return Err(RuntimeError::at(bracket, "Only arrays can be indexed."));
    };
    let Value::Number(n) = index else {
        return Err(RuntimeError::at(bracket, "Array index must be an integer."));
    };
    if n.fract() != 0.0 {
        return Err(RuntimeError::at(bracket, "Array index must be an integer."));
    }
    let len = array.borrow().len();
    if n < 0.0 || n >= len as f64 {
        return Err(RuntimeError::at(bracket, "Array index out of range."));
    }
    Ok((array, n as usize))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn interpreter(input: &str) -> Interpreter {
        Interpreter::with_io(
            Box::new(Cursor::new(input.to_string())),
            Box::new(io::sink()),
        )
    }

    fn exec(interp: &mut Interpreter, source: &str) -> Result<(), RuntimeError> {
        let lexed = lex(source);
        let parsed = parse(&lexed.tokens);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        interp.run(&parsed.program)
    }

    #[test]
    fn block_restores_scope_after_error() {
        let mut interp = interpreter("");
        let err = exec(&mut interp, "variable a = 1; { variable a = 2; a + nope; }").unwrap_err();
        assert_eq!(err.message, "Undefined variable 'nope'.");
        assert!(Rc::ptr_eq(&interp.env, &interp.globals));
        assert_eq!(interp.global("a"), Some(Value::Number(1.0)));
    }

    #[test]
    fn globals_survive_between_runs() {
        let mut interp = interpreter("");
        exec(&mut interp, "variable n = 41;").unwrap();
        exec(&mut interp, "n = n + 1; print n;").unwrap();
        assert_eq!(interp.output(), ["42"]);
    }

    #[test]
    fn read_strips_line_ending() {
        let mut interp = interpreter("hello\r\n 12 \nfalse\n");
        exec(
            &mut interp,
            "variable s; variable n; variable b; readstring s; readnumber n; readboolean b;",
        )
        .unwrap();
        assert_eq!(interp.global("s"), Some(Value::from("hello")));
        assert_eq!(interp.global("n"), Some(Value::Number(12.0)));
        assert_eq!(interp.global("b"), Some(Value::Bool(false)));
    }

    #[test]
    fn readnumber_accepts_only_decimals() {
        assert_eq!(parse_decimal("12"), Some(12.0));
        assert_eq!(parse_decimal("-3.5"), Some(-3.5));
        assert_eq!(parse_decimal("+.5"), Some(0.5));
        assert_eq!(parse_decimal("2e3"), Some(2000.0));
        assert_eq!(parse_decimal("7."), Some(7.0));
        for text in ["inf", "-Infinity", "NaN", "nan", ".", "", "1e", "1.2.3", "0x10"] {
            assert_eq!(parse_decimal(text), None, "{text:?}");
        }

        let mut interp = interpreter("NaN\n");
        let err = exec(&mut interp, "variable n;\nreadnumber n;").unwrap_err();
        assert_eq!(err.message, "Number value expected.");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn failed_write_reports_print_line() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut interp =
            Interpreter::with_io(Box::new(Cursor::new(String::new())), Box::new(Closed));
        let err = exec(&mut interp, "variable x = 1;\n\nprint x;").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.starts_with("Could not write output"));
        assert!(interp.output().is_empty());
    }

    #[test]
    fn top_level_return_stops_quietly() {
        let mut interp = interpreter("");
        exec(&mut interp, "print 1; return; print 2;").unwrap();
        assert_eq!(interp.output(), ["1"]);
    }

    #[test]
    fn fractional_index_is_rejected() {
        let mut interp = interpreter("");
        let err = exec(&mut interp, "variable a = [1, 2]; print a[0.5];").unwrap_err();
        assert_eq!(err.message, "Array index must be an integer.");
    }

    #[test]
    fn binary_type_errors() {
        let span = Span::default();
        let err = binary(BinaryOp::Add, Value::from(1.0), Value::from("a"), span).unwrap_err();
        assert_eq!(err.message, "Operands must be two numbers or two strings.");
        let err = binary(BinaryOp::Lt, Value::from("a"), Value::from("b"), span).unwrap_err();
        assert_eq!(err.message, "Operands must be numbers.");
        assert_eq!(
            binary(BinaryOp::Eq, Value::Null, Value::Null, span).unwrap(),
            Value::Bool(true)
        );
    }
}
