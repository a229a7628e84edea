// SPDX-License-Identifier: MIT

//! Guard evaluation with a strict boolean contract

use crate::conditional::condition::{self, kind_of};
use crate::conditional::context::{ContextBuilder, EvaluationContext};
use crate::error::ConditionalError;
use crate::host::{EnumType, Subject};
use serde_json::Value;

/// Evaluates guard expressions against subjects
///
/// One evaluator serves every declaration of an owner type; its context
/// builder registers nested enumeration constants on first use.
#[derive(Debug, Default)]
pub struct GuardEvaluator {
    builder: ContextBuilder,
}

impl GuardEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator whose contexts always carry the constants of `enums`
    pub fn with_context_enums(enums: &[EnumType]) -> Self {
        Self {
            builder: ContextBuilder::with_context_enums(enums),
        }
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.builder
    }

    /// Has the one-time constant registration already run?
    pub fn static_context_initialized(&self) -> bool {
        self.builder.constants_registered()
    }

    /// Evaluate `expression` against `context`.
    ///
    /// Only a boolean result is accepted: numbers, strings, null and the
    /// like fail with `InvalidGuardExpression`.
    pub fn evaluate(
        &self,
        context: &EvaluationContext,
        expression: &str,
    ) -> Result<bool, ConditionalError> {
        let parsed = condition::parse(expression)
            .map_err(|e| ConditionalError::invalid_guard(expression, e.to_string()))?;

        let result = condition::evaluate(&parsed, context)
            .map_err(|e| ConditionalError::invalid_guard(expression, e.to_string()))?;

        log::trace!("Guard \"{}\" evaluated to {}", expression, result);

        match result {
            Value::Bool(b) => Ok(b),
            other => Err(ConditionalError::invalid_guard(
                expression,
                format!("should return boolean, returned {}", kind_of(&other)),
            )),
        }
    }

    /// Build a fresh context for `subject` and evaluate `expression` in it
    pub fn is_true_expression(
        &self,
        subject: &dyn Subject,
        expression: &str,
    ) -> Result<bool, ConditionalError> {
        let context = self.builder.build(subject)?;
        self.evaluate(&context, expression)
    }
}
