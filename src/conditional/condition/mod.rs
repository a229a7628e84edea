// SPDX-License-Identifier: MIT

//! Guard expression language
//!
//! This module provides parsing and evaluation of guard expressions.
//! Guards are simple expressions like:
//! - `active == true`
//! - `status == Status.BLOCKED or total > 1000`
//! - `not (kind == 'internal')`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal, Operand};
pub use evaluator::{evaluate, kind_of, EvalError};
pub use parser::{parse, ParseError};
