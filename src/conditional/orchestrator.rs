// SPDX-License-Identifier: MIT

//! Per-subject conditional validation
//!
//! Each call starts by evaluating the guard. A false guard ends the call as
//! valid without touching the wrapped validator; a true guard extracts the
//! field and returns the validator's verdict. Failures propagate unretried.

use crate::conditional::descriptor::GuardedFieldDescriptor;
use crate::conditional::guard::GuardEvaluator;
use crate::error::ConditionalError;
use crate::host::{Subject, ValidationContext};
use std::sync::Arc;

/// How a single conditional check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Guard was false; the field counts as valid
    Skipped,
    /// Guard was true; the wrapped validator's result
    Delegated(bool),
}

impl Outcome {
    pub fn is_valid(self) -> bool {
        match self {
            Outcome::Skipped => true,
            Outcome::Delegated(valid) => valid,
        }
    }
}

/// The conditional check for one descriptor, usable like any validator
#[derive(Debug, Clone)]
pub struct ConditionalValidator {
    descriptor: Arc<GuardedFieldDescriptor>,
    evaluator: Arc<GuardEvaluator>,
}

impl ConditionalValidator {
    pub fn new(descriptor: Arc<GuardedFieldDescriptor>, evaluator: Arc<GuardEvaluator>) -> Self {
        Self {
            descriptor,
            evaluator,
        }
    }

    pub fn descriptor(&self) -> &GuardedFieldDescriptor {
        &self.descriptor
    }

    pub fn evaluator(&self) -> &Arc<GuardEvaluator> {
        &self.evaluator
    }

    /// Run the check and report which way it went
    pub fn evaluate(
        &self,
        subject: &dyn Subject,
        context: &mut ValidationContext,
    ) -> Result<Outcome, ConditionalError> {
        if !self
            .descriptor
            .is_constraint_enabled(&self.evaluator, subject)?
        {
            log::trace!(
                "Skipping {} on {}: guard is false",
                self.descriptor.constraint().name(),
                self.descriptor.field()
            );
            return Ok(Outcome::Skipped);
        }

        self.descriptor
            .is_valid(subject, context)
            .map(Outcome::Delegated)
    }

    /// Single-constraint validation entry point
    pub fn is_valid(
        &self,
        subject: &dyn Subject,
        context: &mut ValidationContext,
    ) -> Result<bool, ConditionalError> {
        self.evaluate(subject, context).map(Outcome::is_valid)
    }
}
