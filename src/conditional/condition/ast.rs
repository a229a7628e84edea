// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for guard expressions

use serde_json::{Number, Value};

/// A guard expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A bare name or literal; its value is the expression's value
    Operand(Operand),
    /// Comparison expression: left op right
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    /// Logical AND
    And(Box<Expression>, Box<Expression>),
    /// Logical OR
    Or(Box<Expression>, Box<Expression>),
    /// Logical NOT
    Not(Box<Expression>),
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Field name or registered constant key, e.g. `active` or `Status.ACTIVE`
    Name(String),
    Literal(Literal),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >
    Gt,
    /// >=
    Gte,
    /// <
    Lt,
    /// <=
    Lte,
    /// contains (for strings, sequences and map keys)
    Contains,
}

/// Literal values in expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Null,
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Integer(i) => Value::Number(Number::from(*i)),
            Literal::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Value::Number(Number::from(*n as i64))
            }
            Literal::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Contains => write!(f, "contains"),
        }
    }
}
