// SPDX-License-Identifier: MIT

//! Conditional constraint layer
//!
//! A conditional constraint wraps an ordinary constraint and only enforces
//! it when a guard expression, evaluated against the subject, is true.
//!
//! - `context` builds the name -> value lookup guards are evaluated in
//! - `guard` evaluates guards and insists on a boolean result
//! - `derivation` turns a declaration into the wrapped constraint
//! - `resolution` picks the validator matching the field's type
//! - `descriptor` and `orchestrator` tie it together per field
//! - `rules` loads declarations from YAML and runs them as a plan

pub mod condition;
pub mod context;
pub mod derivation;
pub mod descriptor;
pub mod guard;
pub mod orchestrator;
pub mod resolution;
pub mod rules;

pub use context::{ContextBuilder, EvaluationContext, FieldTable, VisibleField};
pub use derivation::{derive, ConditionalDeclaration, DerivedConstraint};
pub use descriptor::{GuardedFieldDescriptor, PendingDescriptor};
pub use guard::GuardEvaluator;
pub use orchestrator::{ConditionalValidator, Outcome};
pub use resolution::{find_capable, ValidatorResolver};
