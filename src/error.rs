// SPDX-License-Identifier: MIT

//! Typed error handling for conditional-validator
//!
//! Setup-time errors (`MalformedDeclaration`, `NoCapableValidator`,
//! `ValidatorInitialization`) abort bootstrap. Validation-time errors
//! (`InvalidGuardExpression`, `ContextBuild`, `FieldExtraction`) abort the
//! single check they occur in. Nothing here is retried.

use crate::host::ValueType;
use thiserror::Error;

/// Top-level error type for conditional-validator
#[derive(Debug, Error)]
pub enum ConditionalError {
    /// A conditional declaration is missing something it needs
    #[error("Malformed conditional declaration '{declaration}': {problem}")]
    MalformedDeclaration {
        declaration: String,
        problem: DeclarationProblem,
    },

    /// No registered validator accepts the guarded field's type
    #[error("No validator for constraint '{constraint}' accepts field type {field_type}")]
    NoCapableValidator {
        constraint: String,
        field_type: ValueType,
    },

    /// The resolved validator rejected the derived attributes
    #[error("Validator for constraint '{constraint}' failed to initialize: {reason}")]
    ValidatorInitialization { constraint: String, reason: String },

    /// Guard expression failed to parse, evaluate, or produce a boolean
    #[error("Invalid guard expression \"{expression}\": {reason}")]
    InvalidGuardExpression { expression: String, reason: String },

    /// A visible field could not be read while building the evaluation context
    #[error("Unable to read field \"{field}\" of {type_name} used in expression: {source}")]
    ContextBuild {
        type_name: String,
        field: String,
        #[source]
        source: FieldAccessError,
    },

    /// The guarded field could not be read for delegation
    #[error("Unable to extract value of field \"{field}\" from {type_name}: {source}")]
    FieldExtraction {
        type_name: String,
        field: String,
        #[source]
        source: FieldAccessError,
    },

    /// The declaration targets a field its type does not have
    #[error("Type '{type_name}' has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    /// Constraint or conditional kind not present in the catalog
    #[error("Unknown constraint kind: {0}")]
    UnknownKind(String),

    /// Subject type not present in the type table
    #[error("Unknown subject type: {0}")]
    UnknownType(String),

    /// A type appears among its own ancestors
    #[error("Type '{0}' inherits from itself")]
    CyclicInheritance(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// What exactly is wrong with a malformed declaration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationProblem {
    /// No `expression` attribute at all
    #[error("the conditional constraint does not have the attribute \"expression\"")]
    MissingExpression,

    /// `expression` present but blank
    #[error("the attribute \"expression\" must not be empty")]
    EmptyExpression,

    /// The conditional kind does not name the constraint it stands in for
    #[error("conditional kind '{0}' does not declare which constraint it validates as")]
    MissingValidateAs(String),

    /// The wrapped kind cannot produce a failure message
    #[error("constraint '{0}' does not have the attribute \"message\"")]
    MissingMessage(String),

    /// A wrapped-constraint attribute without default was not supplied
    #[error("required attribute \"{0}\" is missing")]
    MissingAttribute(String),

    /// The declaration carries an attribute the wrapped kind does not define
    #[error("attribute \"{attribute}\" is not defined by constraint '{constraint}'")]
    UnexpectedAttribute {
        attribute: String,
        constraint: String,
    },

    /// Attribute value has the wrong shape
    #[error("attribute \"{attribute}\" must be {expected}")]
    AttributeType {
        attribute: String,
        expected: &'static str,
    },
}

/// Failure to read a field from a subject
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldAccessError {
    /// The subject refuses to expose the field
    #[error("access to field '{0}' denied")]
    Denied(String),

    /// The subject has no such field
    #[error("no field '{0}'")]
    NoSuchField(String),

    /// The stored value does not fit the declared field type
    #[error("value of field '{field}' is not a {expected}")]
    TypeMismatch { field: String, expected: ValueType },
}

impl ConditionalError {
    /// Create a malformed-declaration error
    pub fn malformed(declaration: impl Into<String>, problem: DeclarationProblem) -> Self {
        Self::MalformedDeclaration {
            declaration: declaration.into(),
            problem,
        }
    }

    /// Create an invalid-guard error
    pub fn invalid_guard(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGuardExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown-field error
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// True for errors raised while setting up a declaration
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDeclaration { .. }
                | Self::NoCapableValidator { .. }
                | Self::ValidatorInitialization { .. }
                | Self::UnknownField { .. }
                | Self::UnknownKind(_)
                | Self::UnknownType(_)
                | Self::CyclicInheritance(_)
        )
    }
}
