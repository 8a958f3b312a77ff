//! Abstract syntax tree definitions for Skillet
//!
//! Two closed variant sets, expressions and statements. Every evaluation
//! concern is an exhaustive `match` over these enums, so adding a variant
//! is a compile-checked change everywhere it matters.

use std::rc::Rc;

use crate::token::Token;
use crate::value::{Value, ValueType};

/// Expression nodes
#[derive(Debug, Clone)]
pub enum Expr {
    /// Assignment: `name = value`, or `name[index] = value`
    Assign {
        name: Token,
        index: Option<Box<Expr>>,
        value: Box<Expr>,
    },

    /// Bracket-indexed read: `name[index]`
    ArrayAccess { name: Token, index: Box<Expr> },

    /// Array literal block: `{ a, b, c }`
    ArrayBlock { elements: Vec<Expr> },

    /// Binary operation: `a + b`, `x << y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `break` — references its enclosing loop but is inert at runtime
    Break { keyword: Token },

    /// Function call: `f(a, b)`
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Grouping: `(expr)`
    Grouping { expression: Box<Expr> },

    /// Array length: `len(a)`
    Len { keyword: Token, operand: Box<Expr> },

    /// Literal value: `42`, `"hello"`, `true`, `null`
    Literal { value: Value },

    /// Short-circuit logical and/or: `a && b`, `a || b`
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Conditional: `cond ? a : b`
    Ternary {
        condition: Box<Expr>,
        question: Token,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Unary operation: `-x`, `!y`, `~z`
    Unary { operator: Token, operand: Box<Expr> },

    /// Variable reference: `foo`
    Variable { name: Token },
}

/// Statement nodes
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Block: `{ stmt* }` — owns a nested scope at execution time
    Block { statements: Vec<Stmt> },

    /// Expression evaluated for effect
    Expression { expression: Expr },

    /// If statement with optional else branch
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// Function declaration. The body is behind `Rc` so runtime function
    /// values share the parsed tree instead of cloning it per call.
    Function {
        name: Token,
        params: Vec<Token>,
        param_types: Vec<ValueType>,
        body: Rc<Vec<Stmt>>,
        return_type: ValueType,
    },

    /// Print statement: `print expr;`
    Print { expression: Expr },

    /// Return with optional value
    Return { keyword: Token, value: Option<Expr> },

    /// Variable declaration: `int x = 5;`, `array<int> a = {1, 2};`
    Var {
        name: Token,
        ty: ValueType,
        element_ty: Option<ValueType>,
        initializer: Option<Expr>,
    },

    /// Classic three-clause for loop
    For {
        initializer: Option<Box<Stmt>>,
        condition: Expr,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },

    /// For-each over an array: `for (int x : xs) ...`
    ForEach {
        definition: Box<Stmt>,
        array: Expr,
        body: Box<Stmt>,
    },

    /// While loop
    While { condition: Expr, body: Box<Stmt> },
}
