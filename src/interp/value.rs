//! Runtime values for the interpreter

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::function::Callable;

/// Runtime value
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Every number is a double
    Number(f64),
    String(String),
    /// Ordered, mutable, shared between every binding that holds it
    Array(Rc<RefCell<Vec<Value>>>),
    Function(Rc<dyn Callable>),
}

impl Value {
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// `null` and `false` are falsy; everything else, `0` and `""` included, is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Try to get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Render a double the way `print` shows it: integral values without `.0`,
/// magnitudes outside `[1e-3, 1e7)` in scientific form such as `1.0E21`
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n != 0.0 && !(1e-3..1e7).contains(&n.abs()) {
        let text = format!("{:e}", n);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    } else {
        format!("{}", n)
    }
}

type ArrayRef = Rc<RefCell<Vec<Value>>>;
type ArrayPtr = *const RefCell<Vec<Value>>;

/// Arrays can hold themselves, so rendering tracks the arrays it is inside
/// of and prints a revisited one as `[...]`.
fn write_array(
    f: &mut fmt::Formatter<'_>,
    arr: &ArrayRef,
    open: &mut Vec<ArrayPtr>,
    debug: bool,
) -> fmt::Result {
    let ptr = Rc::as_ptr(arr);
    if open.contains(&ptr) {
        return write!(f, "[...]");
    }
    open.push(ptr);
    write!(f, "[")?;
    for (i, v) in arr.borrow().iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_value(f, v, open, debug)?;
    }
    open.pop();
    write!(f, "]")
}

fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    open: &mut Vec<ArrayPtr>,
    debug: bool,
) -> fmt::Result {
    match value {
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", format_number(*n)),
        Value::String(s) if debug => write!(f, "{:?}", s),
        Value::String(s) => write!(f, "{}", s),
        Value::Array(arr) => write_array(f, arr, open, debug),
        Value::Function(func) => write!(f, "<function {}>", func.name()),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new(), true)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new(), false)
    }
}

/// Structural equality. A pair of arrays already under comparison further up
/// counts as equal, which ends the walk over cyclic arrays.
fn values_equal(a: &Value, b: &Value, pending: &mut Vec<(ArrayPtr, ArrayPtr)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
            if pending.contains(&pair) {
                return true;
            }
            let (left, right) = (a.borrow(), b.borrow());
            if left.len() != right.len() {
                return false;
            }
            pending.push(pair);
            let equal = left
                .iter()
                .zip(right.iter())
                .all(|(x, y)| values_equal(x, y, pending));
            pending.pop();
            equal
        }
        // Functions are equal only to themselves
        (Value::Function(a), Value::Function(b)) => {
            std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// How a statement finished. `Return` unwinds to the nearest function call.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Normal,
    Return(Value),
}
