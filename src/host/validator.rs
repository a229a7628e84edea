use crate::host::{ActualConstraintSpec, ValueType};
use serde_json::Value;
use std::sync::Arc;

/// A validator for one constraint kind over values of one type.
///
/// Instances are initialised once and then shared across threads, so
/// `is_valid` must not depend on per-call mutable state.
pub trait ConstraintValidator: Send + Sync {
    /// Configure the validator from the constraint's attributes
    fn initialize(&mut self, constraint: &ActualConstraintSpec) -> Result<(), String>;

    /// Check a single value
    fn is_valid(&self, value: &Value, context: &mut ValidationContext) -> bool;
}

/// Reporting handle handed through to validators.
///
/// The conditional layer never looks inside it; validators use it to
/// replace the default failure message with their own.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    default_message: Option<String>,
    default_disabled: bool,
    messages: Vec<String>,
}

impl ValidationContext {
    pub fn new(default_message: impl Into<String>) -> Self {
        Self {
            default_message: Some(default_message.into()),
            ..Self::default()
        }
    }

    pub fn default_message(&self) -> Option<&str> {
        self.default_message.as_deref()
    }

    /// Suppress the default message for this check
    pub fn disable_default_message(&mut self) {
        self.default_disabled = true;
    }

    /// Report a failure with a custom message template
    pub fn add_message(&mut self, template: impl Into<String>) {
        self.messages.push(template.into());
    }

    /// Messages to report if the check failed
    pub fn failure_messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.default_disabled {
            if let Some(message) = &self.default_message {
                out.push(message.clone());
            }
        }
        out.extend(self.messages.iter().cloned());
        out
    }
}

type Constructor = dyn Fn() -> Box<dyn ConstraintValidator> + Send + Sync;

/// A validator implementation paired with the value type it accepts
#[derive(Clone)]
pub struct ValidatorBinding {
    name: String,
    accepts: ValueType,
    constructor: Arc<Constructor>,
}

impl ValidatorBinding {
    pub fn new<F>(name: impl Into<String>, accepts: ValueType, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn ConstraintValidator> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            accepts,
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self) -> &ValueType {
        &self.accepts
    }

    /// Can this binding check a field declared as `field_type`?
    pub fn is_capable_of(&self, field_type: &ValueType) -> bool {
        self.accepts.is_assignable_from(field_type)
    }

    pub(crate) fn construct(&self) -> Box<dyn ConstraintValidator> {
        (self.constructor)()
    }
}

impl std::fmt::Debug for ValidatorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorBinding")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .finish()
    }
}

/// Produces validator instances for chosen bindings
pub trait ValidatorFactory: Send + Sync {
    fn instantiate(&self, binding: &ValidatorBinding) -> Box<dyn ConstraintValidator>;
}

/// Factory that calls the binding's own constructor
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidatorFactory;

impl ValidatorFactory for DefaultValidatorFactory {
    fn instantiate(&self, binding: &ValidatorBinding) -> Box<dyn ConstraintValidator> {
        binding.construct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AlwaysValid;

    impl ConstraintValidator for AlwaysValid {
        fn initialize(&mut self, _constraint: &ActualConstraintSpec) -> Result<(), String> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value, _context: &mut ValidationContext) -> bool {
            true
        }
    }

    #[test]
    fn test_binding_capability() {
        let binding = ValidatorBinding::new("number", ValueType::Number, || Box::new(AlwaysValid));
        assert!(binding.is_capable_of(&ValueType::Integer));
        assert!(!binding.is_capable_of(&ValueType::Text));
        assert_eq!(binding.name(), "number");
    }

    #[test]
    fn test_default_factory_constructs() {
        let binding = ValidatorBinding::new("any", ValueType::Any, || Box::new(AlwaysValid));
        let validator = DefaultValidatorFactory.instantiate(&binding);
        let mut ctx = ValidationContext::default();
        assert!(validator.is_valid(&json!(null), &mut ctx));
    }

    #[test]
    fn test_context_messages() {
        let mut ctx = ValidationContext::new("{default}");
        assert_eq!(ctx.failure_messages(), vec!["{default}"]);

        ctx.disable_default_message();
        ctx.add_message("custom");
        assert_eq!(ctx.failure_messages(), vec!["custom"]);
        assert_eq!(ctx.default_message(), Some("{default}"));
    }
}
