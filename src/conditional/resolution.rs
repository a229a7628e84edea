// SPDX-License-Identifier: MIT

//! Validator resolution by field type

use crate::error::ConditionalError;
use crate::host::{
    ActualConstraintSpec, ConstraintValidator, DefaultValidatorFactory, ValidatorBinding,
    ValidatorFactory, ValidatorRegistry, ValueType,
};
use std::sync::Arc;

/// First binding, in registration order, that accepts `field_type`
pub fn find_capable<'a>(
    bindings: &'a [ValidatorBinding],
    field_type: &ValueType,
) -> Option<&'a ValidatorBinding> {
    bindings.iter().find(|b| b.is_capable_of(field_type))
}

/// Picks and instantiates validators for derived constraints
#[derive(Clone)]
pub struct ValidatorResolver {
    registry: ValidatorRegistry,
    factory: Arc<dyn ValidatorFactory>,
}

impl ValidatorResolver {
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self::with_factory(registry, Arc::new(DefaultValidatorFactory))
    }

    pub fn with_factory(registry: ValidatorRegistry, factory: Arc<dyn ValidatorFactory>) -> Self {
        Self { registry, factory }
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Select the binding for `kind` on a field declared as `field_type`.
    ///
    /// When several bindings match, the first registered wins.
    pub fn select(
        &self,
        kind: &str,
        field_type: &ValueType,
    ) -> Result<ValidatorBinding, ConditionalError> {
        let bindings = self.registry.bindings_for(kind);
        let chosen = find_capable(&bindings, field_type).cloned().ok_or_else(|| {
            ConditionalError::NoCapableValidator {
                constraint: kind.to_string(),
                field_type: field_type.clone(),
            }
        })?;

        let capable = bindings
            .iter()
            .filter(|b| b.is_capable_of(field_type))
            .count();
        if capable > 1 {
            log::warn!(
                "{} validators for {} accept {}; using {}",
                capable,
                kind,
                field_type,
                chosen.name()
            );
        }

        Ok(chosen)
    }

    /// Select, instantiate and initialise the validator for `constraint`
    pub fn resolve(
        &self,
        constraint: &ActualConstraintSpec,
        field_type: &ValueType,
    ) -> Result<Box<dyn ConstraintValidator>, ConditionalError> {
        let binding = self.select(constraint.name(), field_type)?;
        let mut validator = self.factory.instantiate(&binding);
        validator.initialize(constraint).map_err(|reason| {
            ConditionalError::ValidatorInitialization {
                constraint: constraint.name().to_string(),
                reason,
            }
        })?;

        log::debug!(
            "Resolved {} for {} on {}",
            binding.name(),
            constraint.name(),
            field_type
        );
        Ok(validator)
    }
}

impl Default for ValidatorResolver {
    fn default() -> Self {
        Self::new(ValidatorRegistry::with_builtins())
    }
}

impl std::fmt::Debug for ValidatorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorResolver")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ConstraintKind, ValidationContext};
    use serde_json::{json, Value};

    struct Fixed(bool);

    impl ConstraintValidator for Fixed {
        fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value, _context: &mut ValidationContext) -> bool {
            self.0
        }
    }

    struct Refusing;

    impl ConstraintValidator for Refusing {
        fn initialize(&mut self, constraint: &ActualConstraintSpec) -> Result<(), String> {
            Err(format!("{} not supported", constraint.name()))
        }

        fn is_valid(&self, _value: &Value, _context: &mut ValidationContext) -> bool {
            false
        }
    }

    fn spec(kind: &str) -> ActualConstraintSpec {
        ActualConstraintSpec {
            kind: Arc::new(ConstraintKind::standard(kind, "m")),
            attributes: [("message".to_string(), json!("m"))].into_iter().collect(),
            message: "m".to_string(),
        }
    }

    fn registry() -> ValidatorRegistry {
        let registry = ValidatorRegistry::new();
        registry.register(
            "Check",
            ValidatorBinding::new("CheckText", ValueType::Text, || Box::new(Fixed(true))),
        );
        registry.register(
            "Check",
            ValidatorBinding::new("CheckNumber", ValueType::Number, || Box::new(Fixed(false))),
        );
        registry.register(
            "Check",
            ValidatorBinding::new("CheckAny", ValueType::Any, || Box::new(Fixed(true))),
        );
        registry
    }

    #[test]
    fn test_find_capable_takes_first_match() {
        let bindings = registry().bindings_for("Check");
        assert_eq!(
            find_capable(&bindings, &ValueType::Integer).map(|b| b.name()),
            Some("CheckNumber")
        );
        assert_eq!(
            find_capable(&bindings, &ValueType::Text).map(|b| b.name()),
            Some("CheckText")
        );
        assert_eq!(
            find_capable(&bindings, &ValueType::Map).map(|b| b.name()),
            Some("CheckAny")
        );
        assert!(find_capable(&[], &ValueType::Map).is_none());
    }

    #[test]
    fn test_select_is_deterministic() {
        let resolver = ValidatorResolver::new(registry());
        for _ in 0..10 {
            let chosen = resolver.select("Check", &ValueType::Decimal).unwrap();
            assert_eq!(chosen.name(), "CheckNumber");
        }
    }

    #[test]
    fn test_no_capable_validator() {
        let resolver = ValidatorResolver::new(ValidatorRegistry::with_builtins());
        let err = resolver
            .resolve(&spec("AssertTrue"), &ValueType::Text)
            .err()
            .unwrap();
        match err {
            ConditionalError::NoCapableValidator {
                constraint,
                field_type,
            } => {
                assert_eq!(constraint, "AssertTrue");
                assert_eq!(field_type, ValueType::Text);
            }
            other => panic!("Expected NoCapableValidator, got {:?}", other),
        }

        assert!(matches!(
            resolver.select("Unregistered", &ValueType::Any),
            Err(ConditionalError::NoCapableValidator { .. })
        ));
    }

    #[test]
    fn test_resolve_instantiates_and_initializes() {
        let resolver = ValidatorResolver::new(registry());
        let validator = resolver.resolve(&spec("Check"), &ValueType::Integer).unwrap();
        let mut ctx = ValidationContext::new("m");
        assert!(!validator.is_valid(&json!(1), &mut ctx));
    }

    #[test]
    fn test_initialization_failure() {
        let registry = ValidatorRegistry::new();
        registry.register(
            "Strict",
            ValidatorBinding::new("StrictAny", ValueType::Any, || Box::new(Refusing)),
        );
        let resolver = ValidatorResolver::new(registry);
        assert!(matches!(
            resolver.resolve(&spec("Strict"), &ValueType::Text),
            Err(ConditionalError::ValidatorInitialization { .. })
        ));
    }
}
