//! Runtime value types for Skillet

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::token::Token;

/// Value categories used for runtime type enforcement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Decimal,
    Char,
    Str,
    Boolean,
    Array,
    Void,
}

impl ValueType {
    /// Infer the category of a runtime value from its shape.
    /// Null and callables carry no category.
    pub fn of(value: &Value) -> Option<ValueType> {
        match value {
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Decimal),
            Value::Char(_) => Some(ValueType::Char),
            Value::Str(_) => Some(ValueType::Str),
            Value::Bool(_) => Some(ValueType::Boolean),
            Value::Array(_) => Some(ValueType::Array),
            Value::Function(_) | Value::Native(_) | Value::Null => None,
        }
    }

    /// The source-level spelling of a category, as used in diagnostics.
    pub fn name(tag: Option<ValueType>) -> &'static str {
        match tag {
            Some(ValueType::Int) => "int",
            Some(ValueType::Decimal) => "decimal",
            Some(ValueType::Char) => "char",
            Some(ValueType::Str) => "string",
            Some(ValueType::Boolean) => "boolean",
            Some(ValueType::Array) => "array",
            Some(ValueType::Void) => "void",
            None => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ValueType::name(Some(*self)))
    }
}

/// Runtime values in Skillet
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),

    /// Arrays share their backing storage; `+` on arrays extends the
    /// left operand's storage in place.
    Array(Rc<RefCell<Vec<Value>>>),

    /// User-defined function
    Function(Rc<Function>),

    /// Built-in function
    Native(NativeFn),

    Null,
}

impl Value {
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Null is false, booleans pass through, every other value is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Rust's default float formatting already renders integral
            // values without a trailing ".0".
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(handle) => {
                let elements = handle.borrow();
                let parts: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Function(function) => write!(f, "<fn {}>", function.name.lexeme),
            Value::Native(_) => write!(f, "<native fn>"),
            Value::Null => write!(f, "null"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// A user-defined function: an immutable snapshot of its declaration.
/// The body is shared with the parsed tree, never mutated.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub param_types: Vec<ValueType>,
    pub return_type: ValueType,
    pub body: Rc<Vec<Stmt>>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Native function type
pub type NativeFnPtr =
    fn(&mut crate::interpreter::Interpreter<'_>, &[Value]) -> Result<Value, String>;

/// Native/built-in function
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFnPtr,
}

impl NativeFn {
    pub fn new(name: &'static str, arity: usize, func: NativeFnPtr) -> Self {
        Self { name, arity, func }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
