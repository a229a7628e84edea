// SPDX-License-Identifier: MIT

//! Host validation framework collaborators
//!
//! This module provides:
//! - constraint kind metadata and the kind catalog
//! - exact decimal comparison for numeric bounds
//! - the validator trait, bindings, factory and registry
//! - subject types, field tables and value types

pub mod builtin;
mod constraint;
pub(crate) mod decimal;
pub mod registry;
mod subject;
mod validator;
mod value_type;

pub use constraint::{
    ActualConstraintSpec, AttributeDef, AttributeType, Attributes, ConditionalKind,
    ConstraintCatalog, ConstraintKind, EXPRESSION, GROUPS, MESSAGE, PAYLOAD,
};
pub use registry::ValidatorRegistry;
pub use subject::{EnumType, FieldDef, FieldRef, Record, Subject, TypeDescriptor, Visibility};
pub use validator::{
    ConstraintValidator, DefaultValidatorFactory, ValidationContext, ValidatorBinding,
    ValidatorFactory,
};
pub use value_type::ValueType;
