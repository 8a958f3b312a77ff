//! Variable environment for Skillet
//!
//! Scoped storage mapping names to type-tagged bindings, with a reference
//! to the enclosing scope. Lookup and assignment walk outward through the
//! chain; definition always lands in the innermost scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{Value, ValueType};

/// A binding couples a value with the category inferred from it at
/// definition time and, for array declarations, the declared element
/// category.
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    ty: Option<ValueType>,
    element_ty: Option<ValueType>,
}

/// Why an assignment was rejected
#[derive(Debug, Clone)]
pub enum AssignError {
    Undefined,
    TypeMismatch {
        expected: Option<ValueType>,
        received: Option<ValueType>,
    },
}

/// Variable environment with lexical scoping
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Binding>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Create a new outermost (global) environment
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// Create a child environment chained to an enclosing scope
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Define a name in the current scope. The recorded category is the
    /// one inferred from the value actually observed.
    pub fn define(&mut self, name: String, value: Value) {
        self.define_typed(name, value, None);
    }

    /// Define a name carrying a declared element category (arrays).
    pub fn define_typed(&mut self, name: String, value: Value, element_ty: Option<ValueType>) {
        let ty = ValueType::of(&value);
        self.values.insert(name, Binding { value, ty, element_ty });
    }

    /// Look a name up, innermost scope first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.values.get(name) {
            Some(binding.value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Assign to the innermost scope holding the name. The new value's
    /// category must equal the category on record for the binding.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        if let Some(binding) = self.values.get_mut(name) {
            let received = ValueType::of(&value);
            if binding.ty != received {
                return Err(AssignError::TypeMismatch {
                    expected: binding.ty,
                    received,
                });
            }
            binding.value = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(AssignError::Undefined)
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
