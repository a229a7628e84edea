//! Guard expression evaluator
//!
//! Evaluation yields a JSON value; deciding whether that value is an
//! acceptable guard result is the caller's business. Logical operators
//! demand boolean operands and never coerce.

use super::ast::{CompareOp, Expression, Operand};
use crate::conditional::context::EvaluationContext;
use crate::host::decimal::Decimal;
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

/// Why an expression could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("operator '{operator}' requires boolean operands, found {found}")]
    NotBoolean {
        operator: &'static str,
        found: &'static str,
    },

    #[error("cannot apply '{op}' to {left} and {right}")]
    Incomparable {
        op: CompareOp,
        left: &'static str,
        right: &'static str,
    },
}

/// Evaluate an expression against an evaluation context
pub fn evaluate(expr: &Expression, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match expr {
        Expression::Operand(operand) => resolve(operand, ctx),
        Expression::Compare { left, op, right } => {
            let left = resolve(left, ctx)?;
            let right = resolve(right, ctx)?;
            evaluate_compare(&left, *op, &right).map(Value::Bool)
        }
        Expression::And(left, right) => {
            if !evaluate_bool(left, ctx, "and")? {
                return Ok(Value::Bool(false));
            }
            evaluate_bool(right, ctx, "and").map(Value::Bool)
        }
        Expression::Or(left, right) => {
            if evaluate_bool(left, ctx, "or")? {
                return Ok(Value::Bool(true));
            }
            evaluate_bool(right, ctx, "or").map(Value::Bool)
        }
        Expression::Not(inner) => evaluate_bool(inner, ctx, "not").map(|b| Value::Bool(!b)),
    }
}

/// Name of a value's JSON kind, for error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

fn evaluate_bool(
    expr: &Expression,
    ctx: &EvaluationContext,
    operator: &'static str,
) -> Result<bool, EvalError> {
    match evaluate(expr, ctx)? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::NotBoolean {
            operator,
            found: kind_of(&other),
        }),
    }
}

fn resolve(operand: &Operand, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    match operand {
        Operand::Literal(literal) => Ok(literal.to_value()),
        Operand::Name(name) => ctx
            .get_path(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownName(name.clone())),
    }
}

fn evaluate_compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool, EvalError> {
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::NotEq => Ok(!values_equal(left, right)),
        CompareOp::Gt => compare_ordered(left, op, right, |o| o.is_gt()),
        CompareOp::Gte => compare_ordered(left, op, right, |o| o.is_ge()),
        CompareOp::Lt => compare_ordered(left, op, right, |o| o.is_lt()),
        CompareOp::Lte => compare_ordered(left, op, right, |o| o.is_le()),
        CompareOp::Contains => check_contains(left, right),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            numeric_order(left, right).is_some_and(Ordering::is_eq)
        }
        _ => left == right,
    }
}

/// Exact order of two numbers, so `3 == 3.0` and `1e-17 != 0`
fn numeric_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            Some(Decimal::from_number(l)?.cmp(&Decimal::from_number(r)?))
        }
        _ => None,
    }
}

fn compare_ordered<F>(left: &Value, op: CompareOp, right: &Value, cmp: F) -> Result<bool, EvalError>
where
    F: Fn(Ordering) -> bool,
{
    let ordering = match (left, right) {
        (Value::Number(_), Value::Number(_)) => numeric_order(left, right),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    };
    ordering.map(cmp).ok_or(EvalError::Incomparable {
        op,
        left: kind_of(left),
        right: kind_of(right),
    })
}

fn check_contains(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        // String contains substring
        (Value::String(s), Value::String(substr)) => Ok(s.contains(substr.as_str())),
        // Sequence contains value
        (Value::Array(items), needle) => Ok(items.iter().any(|item| values_equal(item, needle))),
        // Map contains key
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        _ => Err(EvalError::Incomparable {
            op: CompareOp::Contains,
            left: kind_of(left),
            right: kind_of(right),
        }),
    }
}
