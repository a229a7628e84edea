// SPDX-License-Identifier: MIT

//! Guarded field descriptors
//!
//! Setup happens in two steps: `PendingDescriptor::derive` binds a
//! declaration to a field and derives the wrapped constraint, then
//! `initialize` resolves the validator. The resulting
//! `GuardedFieldDescriptor` is immutable and shared across threads.

use crate::conditional::derivation::{self, ConditionalDeclaration};
use crate::conditional::guard::GuardEvaluator;
use crate::conditional::resolution::ValidatorResolver;
use crate::error::ConditionalError;
use crate::host::{
    ActualConstraintSpec, ConstraintValidator, FieldRef, Subject, TypeDescriptor,
    ValidationContext, ValueType,
};
use std::sync::Arc;

/// A declaration bound to a field, before its validator is resolved
#[derive(Debug, Clone)]
pub struct PendingDescriptor {
    owner: Arc<TypeDescriptor>,
    field: FieldRef,
    field_type: ValueType,
    expression: String,
    constraint: ActualConstraintSpec,
}

impl PendingDescriptor {
    /// Bind `declaration` to `owner.field_name` and derive its constraint
    pub fn derive(
        owner: Arc<TypeDescriptor>,
        field_name: &str,
        declaration: &ConditionalDeclaration,
    ) -> Result<Self, ConditionalError> {
        let (field, field_type) = match owner.find_field(field_name) {
            Some((field, def)) => (field, def.value_type.clone()),
            None => return Err(ConditionalError::unknown_field(&owner.name, field_name)),
        };

        let label = format!("{}.{}", owner.name, field_name);
        let derived = derivation::derive(declaration, &label)?;

        Ok(Self {
            owner,
            field,
            field_type,
            expression: derived.expression,
            constraint: derived.constraint,
        })
    }

    pub fn constraint(&self) -> &ActualConstraintSpec {
        &self.constraint
    }

    /// Resolve and initialise the validator, completing setup
    pub fn initialize(
        self,
        resolver: &ValidatorResolver,
    ) -> Result<GuardedFieldDescriptor, ConditionalError> {
        let validator = resolver.resolve(&self.constraint, &self.field_type)?;
        Ok(GuardedFieldDescriptor {
            owner: self.owner,
            field: self.field,
            field_type: self.field_type,
            expression: self.expression,
            constraint: self.constraint,
            validator,
        })
    }
}

/// A conditional constraint ready for repeated validation
pub struct GuardedFieldDescriptor {
    owner: Arc<TypeDescriptor>,
    field: FieldRef,
    field_type: ValueType,
    expression: String,
    constraint: ActualConstraintSpec,
    validator: Box<dyn ConstraintValidator>,
}

impl GuardedFieldDescriptor {
    /// Derive and initialise in one step
    pub fn setup(
        owner: Arc<TypeDescriptor>,
        field_name: &str,
        declaration: &ConditionalDeclaration,
        resolver: &ValidatorResolver,
    ) -> Result<Self, ConditionalError> {
        PendingDescriptor::derive(owner, field_name, declaration)?.initialize(resolver)
    }

    pub fn owner(&self) -> &Arc<TypeDescriptor> {
        &self.owner
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn field_type(&self) -> &ValueType {
        &self.field_type
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn constraint(&self) -> &ActualConstraintSpec {
        &self.constraint
    }

    /// Does the guard hold for `subject`?
    pub fn is_constraint_enabled(
        &self,
        evaluator: &GuardEvaluator,
        subject: &dyn Subject,
    ) -> Result<bool, ConditionalError> {
        evaluator.is_true_expression(subject, &self.expression)
    }

    /// Read the guarded field and hand it to the resolved validator
    pub fn is_valid(
        &self,
        subject: &dyn Subject,
        context: &mut ValidationContext,
    ) -> Result<bool, ConditionalError> {
        let value =
            subject
                .read_field(&self.field)
                .map_err(|source| ConditionalError::FieldExtraction {
                    type_name: subject.subject_type().name.clone(),
                    field: self.field.name.clone(),
                    source,
                })?;
        Ok(self.validator.is_valid(&value, context))
    }
}

impl std::fmt::Debug for GuardedFieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedFieldDescriptor")
            .field("field", &self.field)
            .field("field_type", &self.field_type)
            .field("expression", &self.expression)
            .field("constraint", &self.constraint.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ConstraintCatalog, Record, Visibility};
    use serde_json::json;

    fn person() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::new("Person")
                .field("active", Visibility::Private, ValueType::Boolean)
                .field("code", Visibility::Private, ValueType::Text),
        )
    }

    fn not_null_when(expression: &str) -> ConditionalDeclaration {
        let catalog = ConstraintCatalog::with_builtins();
        ConditionalDeclaration::new(catalog.conditional("NotNullWhen").unwrap())
            .with("expression", json!(expression))
    }

    #[test]
    fn test_setup_binds_field() {
        let descriptor = GuardedFieldDescriptor::setup(
            person(),
            "code",
            &not_null_when("active == true"),
            &ValidatorResolver::default(),
        )
        .unwrap();
        assert_eq!(descriptor.field().to_string(), "Person.code");
        assert_eq!(descriptor.field_type(), &ValueType::Text);
        assert_eq!(descriptor.expression(), "active == true");
        assert_eq!(descriptor.constraint().name(), "NotNull");
    }

    #[test]
    fn test_unknown_field() {
        let err = PendingDescriptor::derive(person(), "email", &not_null_when("active"))
            .unwrap_err();
        assert!(matches!(err, ConditionalError::UnknownField { .. }));
    }

    #[test]
    fn test_guard_and_delegation() {
        let descriptor = GuardedFieldDescriptor::setup(
            person(),
            "code",
            &not_null_when("active == true"),
            &ValidatorResolver::default(),
        )
        .unwrap();
        let evaluator = GuardEvaluator::new();
        let mut ctx = ValidationContext::new(descriptor.constraint().message.clone());

        let subject = Record::new(person()).with("active", json!(true));
        assert!(descriptor.is_constraint_enabled(&evaluator, &subject).unwrap());
        assert!(!descriptor.is_valid(&subject, &mut ctx).unwrap());

        let subject = subject.with("code", json!("X"));
        assert!(descriptor.is_valid(&subject, &mut ctx).unwrap());
    }

    #[test]
    fn test_extraction_failure() {
        let descriptor = GuardedFieldDescriptor::setup(
            person(),
            "code",
            &not_null_when("active"),
            &ValidatorResolver::default(),
        )
        .unwrap();
        let subject = Record::new(person()).sealed("code");
        let mut ctx = ValidationContext::default();
        assert!(matches!(
            descriptor.is_valid(&subject, &mut ctx),
            Err(ConditionalError::FieldExtraction { .. })
        ));
    }
}
