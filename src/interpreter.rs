//! Tree-walking interpreter for Skillet
//!
//! Walks the statement and expression trees against a current-environment
//! cursor, starting at the global environment. Every binding write goes
//! through the category check; the first runtime error aborts the run.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, Stmt};
use crate::environment::{AssignError, Environment};
use crate::error::{RuntimeError, RuntimeErrorKind, RuntimeResult};
use crate::token::{Token, TokenKind};
use crate::value::{Function, NativeFn, Value, ValueType};

/// How a statement finished: fall-through to the next statement, or a
/// `return` unwinding to the nearest enclosing call frame.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// The interpreter state. Program output goes through the injected writer
/// so hosts and tests control where it lands.
pub struct Interpreter<'out> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    out: &'out mut dyn Write,
}

impl<'out> Interpreter<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        let mut interpreter = Self {
            globals: Rc::clone(&globals),
            environment: globals,
            out,
        };
        interpreter.define_natives();
        interpreter
    }

    /// Register the built-in callables into the global scope.
    fn define_natives(&mut self) {
        let natives = [
            // clock()
            NativeFn::new("clock", 0, |_interpreter, _args| {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| format!("clock error: {}", e))?;
                Ok(Value::Float(now.as_secs_f64()))
            }),
            // display(value)
            NativeFn::new("display", 1, |interpreter, args| {
                write!(interpreter.out, "{}", args[0]).map_err(|e| e.to_string())?;
                Ok(Value::Null)
            }),
            // displayln(value)
            NativeFn::new("displayln", 1, |interpreter, args| {
                writeln!(interpreter.out, "{}", args[0]).map_err(|e| e.to_string())?;
                Ok(Value::Null)
            }),
            // size(array)
            NativeFn::new("size", 1, |_interpreter, args| match &args[0] {
                Value::Array(handle) => Ok(Value::Int(handle.borrow().len() as i64)),
                _ => Err("Expected array for size.".to_string()),
            }),
        ];

        for native in natives {
            self.globals
                .borrow_mut()
                .define(native.name.to_string(), Value::Native(native));
        }
    }

    /// Execute a statement sequence against the global environment.
    pub fn interpret(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        for statement in statements {
            // A `return` at top level stops the remaining statements.
            if let Flow::Return(_) = self.execute(statement)? {
                break;
            }
        }

        let _ = self.out.flush();
        Ok(())
    }

    fn execute(&mut self, statement: &Stmt) -> RuntimeResult<Flow> {
        match statement {
            Stmt::Block { statements } => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, environment)
            }

            Stmt::Expression { expression } => {
                self.evaluate(expression)?;
                Ok(Flow::Normal)
            }

            Stmt::Print { expression } => {
                let value = self.evaluate(expression)?;
                let _ = writeln!(self.out, "{}", value);
                Ok(Flow::Normal)
            }

            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Function { name, params, param_types, body, return_type } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    param_types: param_types.clone(),
                    return_type: *return_type,
                    body: Rc::clone(body),
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Var { name, ty, element_ty, initializer } => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => default_value(*ty),
                };

                self.check_declared_type(*ty, &value, name)?;
                if let (Some(element), Value::Array(handle)) = (element_ty, &value) {
                    self.check_element_types(*element, &handle.borrow(), name)?;
                }

                self.environment
                    .borrow_mut()
                    .define_typed(name.lexeme.clone(), value, *element_ty);
                Ok(Flow::Normal)
            }

            Stmt::For { initializer, condition, increment, body } => {
                if let Some(initializer) = initializer {
                    if let Flow::Return(value) = self.execute(initializer)? {
                        return Ok(Flow::Return(value));
                    }
                }

                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::ForEach { definition, array, body } => {
                self.execute(definition)?;

                let name = match definition.as_ref() {
                    Stmt::Var { name, .. } => name.clone(),
                    // The grammar only builds Var definitions.
                    _ => return Ok(Flow::Normal),
                };

                let handle = match self.evaluate(array)? {
                    Value::Array(handle) => handle,
                    other => {
                        return Err(RuntimeError::new(
                            RuntimeErrorKind::TypeMismatch(format!(
                                "Expected array in for-each loop, received type {}.",
                                ValueType::name(ValueType::of(&other))
                            )),
                            name.line,
                        ))
                    }
                };

                // Reads the length live so the body can grow or shrink it.
                let mut index = 0;
                while index < handle.borrow().len() {
                    let element = handle.borrow()[index].clone();
                    self.assign_variable(&name, element)?;
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                    index += 1;
                }

                Ok(Flow::Normal)
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    /// Execute statements in a fresh scope; the previous scope is restored
    /// on every exit path, including errors and control transfers.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> RuntimeResult<Flow> {
        let previous =
            std::mem::replace(&mut self.environment, Rc::new(RefCell::new(environment)));

        let mut result = Ok(Flow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expression: &Expr) -> RuntimeResult<Value> {
        match expression {
            Expr::Literal { value } => Ok(value.clone()),

            Expr::Grouping { expression } => self.evaluate(expression),

            Expr::Variable { name } => self.lookup_variable(name),

            Expr::Assign { name, index, value } => {
                let value = self.evaluate(value)?;

                match index {
                    Some(index_expr) => {
                        let index = self.index_value(index_expr, name)?;
                        let handle = self.array_binding(name)?;

                        let length = handle.borrow().len();
                        match usize::try_from(index).ok().filter(|i| *i < length) {
                            Some(slot) => handle.borrow_mut()[slot] = value.clone(),
                            None => {
                                return Err(RuntimeError::new(
                                    RuntimeErrorKind::IndexOutOfBounds { index },
                                    name.line,
                                ))
                            }
                        }

                        Ok(value)
                    }
                    None => {
                        self.assign_variable(name, value.clone())?;
                        Ok(value)
                    }
                }
            }

            Expr::ArrayAccess { name, index } => {
                let index = self.index_value(index, name)?;
                let handle = self.array_binding(name)?;

                let elements = handle.borrow();
                usize::try_from(index)
                    .ok()
                    .and_then(|i| elements.get(i).cloned())
                    .ok_or_else(|| {
                        RuntimeError::new(RuntimeErrorKind::IndexOutOfBounds { index }, name.line)
                    })
            }

            Expr::ArrayBlock { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }

            // Parsed but inert: no loop-exit effect is wired.
            Expr::Break { keyword: _ } => Ok(Value::Null),

            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_op(left, operator, right)
            }

            Expr::Logical { left, operator, right } => {
                let left = self.evaluate(left)?;

                if operator.kind == TokenKind::AndAnd {
                    if !left.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    let right = self.evaluate(right)?;
                    Ok(Value::Bool(right.is_truthy()))
                } else {
                    if left.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    let right = self.evaluate(right)?;
                    Ok(Value::Bool(right.is_truthy()))
                }
            }

            Expr::Ternary { condition, question, then_branch, else_branch } => {
                match self.evaluate(condition)? {
                    Value::Bool(true) => self.evaluate(then_branch),
                    Value::Bool(false) => self.evaluate(else_branch),
                    other => Err(RuntimeError::new(
                        RuntimeErrorKind::TypeMismatch(format!(
                            "Ternary condition must be a boolean, received type {}.",
                            ValueType::name(ValueType::of(&other))
                        )),
                        question.line,
                    )),
                }
            }

            Expr::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;

                match operator.kind {
                    TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
                    TokenKind::Tilde => match value {
                        Value::Int(n) => Ok(Value::Int(!n)),
                        _ => Err(RuntimeError::new(
                            RuntimeErrorKind::NonNumericOperand(
                                "Operand must be an integer.".to_string(),
                            ),
                            operator.line,
                        )),
                    },
                    TokenKind::Minus => match value {
                        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        _ => Err(RuntimeError::new(
                            RuntimeErrorKind::NonNumericOperand(
                                "Operand must be a number.".to_string(),
                            ),
                            operator.line,
                        )),
                    },
                    _ => Err(RuntimeError::new(
                        RuntimeErrorKind::NonNumericOperand(format!(
                            "Unsupported operator '{}'.",
                            operator.lexeme
                        )),
                        operator.line,
                    )),
                }
            }

            Expr::Call { callee, paren, arguments } => {
                // An undeclared callee name reads as "nothing callable
                // here", not as a variable lookup failure.
                let callee = match self.evaluate(callee) {
                    Ok(value) => value,
                    Err(error) => match error.kind {
                        RuntimeErrorKind::UndefinedVariable(_) => {
                            return Err(RuntimeError::new(
                                RuntimeErrorKind::NotCallable,
                                paren.line,
                            ))
                        }
                        _ => return Err(error),
                    },
                };

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                match callee {
                    Value::Function(function) => {
                        if args.len() != function.arity() {
                            return Err(RuntimeError::new(
                                RuntimeErrorKind::ArityMismatch {
                                    expected: function.arity(),
                                    got: args.len(),
                                },
                                paren.line,
                            ));
                        }
                        self.call_function(&function, args)
                    }
                    Value::Native(native) => {
                        if args.len() != native.arity {
                            return Err(RuntimeError::new(
                                RuntimeErrorKind::ArityMismatch {
                                    expected: native.arity,
                                    got: args.len(),
                                },
                                paren.line,
                            ));
                        }
                        (native.func)(self, &args).map_err(|message| {
                            RuntimeError::new(RuntimeErrorKind::TypeMismatch(message), paren.line)
                        })
                    }
                    _ => Err(RuntimeError::new(RuntimeErrorKind::NotCallable, paren.line)),
                }
            }

            Expr::Len { keyword, operand } => match self.evaluate(operand)? {
                Value::Array(handle) => Ok(Value::Int(handle.borrow().len() as i64)),
                _ => Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch("Expected array for len expression.".to_string()),
                    keyword.line,
                )),
            },
        }
    }

    /// Bind parameters into a fresh environment enclosed by the *global*
    /// scope — not the call site — and run the body. The language has no
    /// closures over enclosing local scope.
    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> RuntimeResult<Value> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.globals));
        for (param, arg) in function.params.iter().zip(args) {
            environment.define(param.lexeme.clone(), arg);
        }

        match self.execute_block(&function.body, environment)? {
            Flow::Return(value) => self.check_return_type(function, value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn check_return_type(&self, function: &Function, value: Value) -> RuntimeResult<Value> {
        let received = ValueType::of(&value);
        let matches = match function.return_type {
            ValueType::Void => matches!(value, Value::Null),
            declared => received == Some(declared),
        };

        if matches {
            Ok(value)
        } else {
            Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch(format!(
                    "Expected return type {}.",
                    function.return_type
                )),
                function.name.line,
            ))
        }
    }

    fn lookup_variable(&self, name: &Token) -> RuntimeResult<Value> {
        self.environment.borrow().get(&name.lexeme).ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
                name.line,
            )
        })
    }

    fn assign_variable(&mut self, name: &Token, value: Value) -> RuntimeResult<()> {
        match self.environment.borrow_mut().assign(&name.lexeme, value) {
            Ok(()) => Ok(()),
            Err(AssignError::Undefined) => Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
                name.line,
            )),
            Err(AssignError::TypeMismatch { expected, received }) => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch(format!(
                    "Type mismatch: expected type {}, received type {}",
                    ValueType::name(expected),
                    ValueType::name(received)
                )),
                name.line,
            )),
        }
    }

    fn array_binding(&self, name: &Token) -> RuntimeResult<Rc<RefCell<Vec<Value>>>> {
        match self.lookup_variable(name)? {
            Value::Array(handle) => Ok(handle),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch(format!(
                    "Only arrays can be indexed, '{}' has type {}.",
                    name.lexeme,
                    ValueType::name(ValueType::of(&other))
                )),
                name.line,
            )),
        }
    }

    fn index_value(&mut self, expression: &Expr, name: &Token) -> RuntimeResult<i64> {
        match self.evaluate(expression)? {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch(format!(
                    "Expected integer as index, received type {}.",
                    ValueType::name(ValueType::of(&other))
                )),
                name.line,
            )),
        }
    }

    fn check_declared_type(
        &self,
        declared: ValueType,
        value: &Value,
        name: &Token,
    ) -> RuntimeResult<()> {
        let received = ValueType::of(value);
        if received == Some(declared) {
            return Ok(());
        }

        Err(RuntimeError::new(
            RuntimeErrorKind::TypeMismatch(format!(
                "Type mismatch: expected type {}, received type {}",
                declared,
                ValueType::name(received)
            )),
            name.line,
        ))
    }

    fn check_element_types(
        &self,
        element_ty: ValueType,
        elements: &[Value],
        name: &Token,
    ) -> RuntimeResult<()> {
        for element in elements {
            if ValueType::of(element) != Some(element_ty) {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch(format!(
                        "Type mismatch: expected element type {}, received type {}",
                        element_ty,
                        ValueType::name(ValueType::of(element))
                    )),
                    name.line,
                ));
            }
        }
        Ok(())
    }
}

/// Default values for declarations without an initializer
fn default_value(ty: ValueType) -> Value {
    match ty {
        ValueType::Int => Value::Int(0),
        ValueType::Decimal => Value::Float(0.0),
        ValueType::Char => Value::Char('\0'),
        ValueType::Str => Value::Str(String::new()),
        ValueType::Boolean => Value::Bool(false),
        ValueType::Array => Value::array(Vec::new()),
        ValueType::Void => Value::Null,
    }
}

/// Numeric operand pair after promotion
enum Numbers {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// Promote to floating point if either operand is floating.
fn as_numbers(left: &Value, right: &Value) -> Option<Numbers> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(Numbers::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(Numbers::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(Numbers::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(Numbers::Floats(*a, *b)),
        _ => None,
    }
}

fn as_integers(left: &Value, right: &Value) -> Option<(i64, i64)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some((*a, *b)),
        _ => None,
    }
}

fn numbers_error(operator: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::NonNumericOperand("Operands must be numbers.".to_string()),
        operator.line,
    )
}

fn integers_error(operator: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::NonNumericOperand("Operands must be integers.".to_string()),
        operator.line,
    )
}

fn binary_op(left: Value, operator: &Token, right: Value) -> RuntimeResult<Value> {
    match operator.kind {
        TokenKind::Plus => {
            if let Some(numbers) = as_numbers(&left, &right) {
                return Ok(match numbers {
                    Numbers::Ints(a, b) => Value::Int(a.wrapping_add(b)),
                    Numbers::Floats(a, b) => Value::Float(a + b),
                });
            }

            if let Value::Str(s) = &left {
                return Ok(Value::Str(format!("{}{}", s, right)));
            }

            if let (Value::Array(left_handle), Value::Array(right_handle)) = (&left, &right) {
                // Appends onto the left operand's backing storage and
                // yields the same storage.
                let appended: Vec<Value> = right_handle.borrow().clone();
                left_handle.borrow_mut().extend(appended);
                return Ok(left.clone());
            }

            Err(RuntimeError::new(
                RuntimeErrorKind::NonNumericOperand(
                    "Operands must be two numbers, two strings or two arrays.".to_string(),
                ),
                operator.line,
            ))
        }

        TokenKind::Minus => match as_numbers(&left, &right) {
            Some(Numbers::Ints(a, b)) => Ok(Value::Int(a.wrapping_sub(b))),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a - b)),
            None => Err(numbers_error(operator)),
        },

        TokenKind::Star => match as_numbers(&left, &right) {
            Some(Numbers::Ints(a, b)) => Ok(Value::Int(a.wrapping_mul(b))),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a * b)),
            None => Err(numbers_error(operator)),
        },

        TokenKind::Slash => match as_numbers(&left, &right) {
            Some(Numbers::Ints(_, 0)) => Err(RuntimeError::new(
                RuntimeErrorKind::DivisionByZero,
                operator.line,
            )),
            Some(Numbers::Ints(a, b)) => Ok(Value::Int(a.wrapping_div(b))),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a / b)),
            None => Err(numbers_error(operator)),
        },

        TokenKind::Percent => match as_numbers(&left, &right) {
            Some(Numbers::Ints(_, 0)) => Err(RuntimeError::new(
                RuntimeErrorKind::DivisionByZero,
                operator.line,
            )),
            Some(Numbers::Ints(a, b)) => Ok(Value::Int(a.wrapping_rem(b))),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a % b)),
            None => Err(numbers_error(operator)),
        },

        TokenKind::StarStar => match as_numbers(&left, &right) {
            Some(Numbers::Ints(a, b)) => match u32::try_from(b) {
                Ok(exp) => Ok(Value::Int(a.wrapping_pow(exp))),
                Err(_) => Err(RuntimeError::new(
                    RuntimeErrorKind::NonNumericOperand(
                        "Exponent must be non-negative in integer power.".to_string(),
                    ),
                    operator.line,
                )),
            },
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a.powf(b))),
            None => Err(numbers_error(operator)),
        },

        TokenKind::Ampersand => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Int(a & b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::Pipe => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Int(a | b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::Caret => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Int(a ^ b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::LessLess => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Int(a.wrapping_shl(b as u32))),
            None => Err(integers_error(operator)),
        },

        TokenKind::GreaterGreater => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Int(a.wrapping_shr(b as u32))),
            None => Err(integers_error(operator)),
        },

        // Relational comparison is integer-only; floating comparisons are
        // not defined in this language.
        TokenKind::Less => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Bool(a < b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::LessEqual => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Bool(a <= b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::Greater => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Bool(a > b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::GreaterEqual => match as_integers(&left, &right) {
            Some((a, b)) => Ok(Value::Bool(a >= b)),
            None => Err(integers_error(operator)),
        },

        TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
        TokenKind::BangEqual => Ok(Value::Bool(left != right)),

        _ => Err(RuntimeError::new(
            RuntimeErrorKind::NonNumericOperand(format!(
                "Unsupported operator '{}'.",
                operator.lexeme
            )),
            operator.line,
        )),
    }
}
