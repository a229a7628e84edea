// SPDX-License-Identifier: MIT

//! Deriving the wrapped constraint from a conditional declaration
//!
//! A declaration carries the guard under `expression` and, next to it, the
//! attributes of the constraint it stands in for. Derivation splits the two:
//! the guard is kept aside and everything else becomes the attribute set of
//! an `ActualConstraintSpec` for the wrapped kind.

use crate::error::{ConditionalError, DeclarationProblem};
use crate::host::{ActualConstraintSpec, Attributes, ConditionalKind, EXPRESSION, MESSAGE};
use serde_json::Value;
use std::sync::Arc;

/// One conditional constraint as authored: its kind plus explicit attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDeclaration {
    pub kind: Arc<ConditionalKind>,
    pub attributes: Attributes,
}

impl ConditionalDeclaration {
    pub fn new(kind: Arc<ConditionalKind>) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
        }
    }

    /// Set an explicit attribute value
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// The kind's declared defaults overlaid with the explicit values
    pub fn effective_attributes(&self) -> Attributes {
        let mut effective: Attributes = self
            .kind
            .attributes
            .iter()
            .filter_map(|def| def.default.clone().map(|v| (def.name.clone(), v)))
            .collect();
        effective.extend(
            self.attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        effective
    }
}

/// Result of derivation: the guard and the wrapped constraint
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedConstraint {
    pub expression: String,
    pub constraint: ActualConstraintSpec,
}

/// Derive the wrapped constraint of `declaration`.
///
/// `label` names the declaration in error messages (usually `Type.field`).
pub fn derive(
    declaration: &ConditionalDeclaration,
    label: &str,
) -> Result<DerivedConstraint, ConditionalError> {
    let malformed = |problem| ConditionalError::malformed(label, problem);
    let attributes = declaration.effective_attributes();

    let expression = match attributes.get(EXPRESSION) {
        None => return Err(malformed(DeclarationProblem::MissingExpression)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(malformed(DeclarationProblem::EmptyExpression))
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(malformed(DeclarationProblem::AttributeType {
                attribute: EXPRESSION.to_string(),
                expected: "a string",
            }))
        }
    };

    let wrapped = declaration.kind.validate_as.clone().ok_or_else(|| {
        malformed(DeclarationProblem::MissingValidateAs(
            declaration.kind.name.clone(),
        ))
    })?;

    let mut copied: Attributes = attributes
        .into_iter()
        .filter(|(name, _)| name != EXPRESSION)
        .collect();

    if wrapped.attribute(MESSAGE).is_none() {
        return Err(malformed(DeclarationProblem::MissingMessage(
            wrapped.name.clone(),
        )));
    }

    for (name, value) in &copied {
        let def = wrapped.attribute(name).ok_or_else(|| {
            malformed(DeclarationProblem::UnexpectedAttribute {
                attribute: name.clone(),
                constraint: wrapped.name.clone(),
            })
        })?;
        if !def.kind.accepts(value) {
            return Err(malformed(DeclarationProblem::AttributeType {
                attribute: name.clone(),
                expected: def.kind.describe(),
            }));
        }
    }

    for def in &wrapped.attributes {
        if copied.contains_key(&def.name) {
            continue;
        }
        match &def.default {
            Some(default) => {
                copied.insert(def.name.clone(), default.clone());
            }
            None => {
                return Err(malformed(DeclarationProblem::MissingAttribute(
                    def.name.clone(),
                )))
            }
        }
    }

    let message = copied
        .get(MESSAGE)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(DeclarationProblem::MissingMessage(wrapped.name.clone())))?;

    log::debug!(
        "Derived {} from {} for {} guarded by \"{}\"",
        wrapped.name,
        declaration.kind.name,
        label,
        expression
    );

    Ok(DerivedConstraint {
        expression,
        constraint: ActualConstraintSpec {
            kind: wrapped,
            attributes: copied,
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AttributeDef, AttributeType, ConstraintCatalog, ConstraintKind};
    use serde_json::json;

    fn catalog() -> ConstraintCatalog {
        ConstraintCatalog::with_builtins()
    }

    fn declaration(kind: &str) -> ConditionalDeclaration {
        ConditionalDeclaration::new(catalog().conditional(kind).unwrap())
    }

    fn problem(result: Result<DerivedConstraint, ConditionalError>) -> DeclarationProblem {
        match result {
            Err(ConditionalError::MalformedDeclaration { problem, .. }) => problem,
            other => panic!("Expected MalformedDeclaration, got {:?}", other),
        }
    }

    #[test]
    fn test_derive_copies_attributes_without_expression() {
        let decl = declaration("DecimalMaxWhen")
            .with("expression", json!("active == true"))
            .with("value", json!("10.5"))
            .with("inclusive", json!(false));

        let derived = derive(&decl, "Order.total").unwrap();
        assert_eq!(derived.expression, "active == true");
        assert_eq!(derived.constraint.name(), "DecimalMax");
        assert!(derived.constraint.attribute(EXPRESSION).is_none());
        assert_eq!(derived.constraint.str_attribute("value"), Some("10.5"));
        assert_eq!(derived.constraint.bool_attribute("inclusive"), Some(false));
        assert_eq!(
            derived.constraint.message,
            "{javax.validation.constraints.DecimalMax.message}"
        );
        assert_eq!(derived.constraint.attribute("groups"), Some(&json!([])));
    }

    #[test]
    fn test_custom_message_is_kept() {
        let decl = declaration("NotNullWhen")
            .with("expression", json!("active"))
            .with("message", json!("code is required"));
        let derived = derive(&decl, "Person.code").unwrap();
        assert_eq!(derived.constraint.message, "code is required");
    }

    #[test]
    fn test_missing_expression() {
        let decl = declaration("NotNullWhen");
        assert_eq!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::MissingExpression
        );
    }

    #[test]
    fn test_empty_expression() {
        let decl = declaration("NotNullWhen").with("expression", json!("  "));
        assert_eq!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::EmptyExpression
        );
    }

    #[test]
    fn test_missing_validate_as() {
        let mut kind = (*catalog().conditional("NotNullWhen").unwrap()).clone();
        kind.name = "OrphanWhen".to_string();
        kind.validate_as = None;
        let decl =
            ConditionalDeclaration::new(Arc::new(kind)).with("expression", json!("active"));
        assert_eq!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::MissingValidateAs("OrphanWhen".to_string())
        );
    }

    #[test]
    fn test_wrapped_kind_without_message() {
        let wrapped = Arc::new(
            ConstraintKind::bare("Silent")
                .with_attribute(AttributeDef::optional("level", AttributeType::Integer, json!(1))),
        );
        let decl = ConditionalDeclaration::new(Arc::new(ConditionalKind::wrapping(wrapped)))
            .with("expression", json!("active"));
        assert_eq!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::MissingMessage("Silent".to_string())
        );
    }

    #[test]
    fn test_missing_required_attribute() {
        let decl = declaration("MaxWhen").with("expression", json!("active"));
        assert_eq!(
            problem(derive(&decl, "Order.count")),
            DeclarationProblem::MissingAttribute("value".to_string())
        );
    }

    #[test]
    fn test_unexpected_attribute() {
        let decl = declaration("NotNullWhen")
            .with("expression", json!("active"))
            .with("severity", json!("high"));
        assert_eq!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::UnexpectedAttribute {
                attribute: "severity".to_string(),
                constraint: "NotNull".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_attribute_type() {
        let decl = declaration("MaxWhen")
            .with("expression", json!("active"))
            .with("value", json!("ten"));
        assert_eq!(
            problem(derive(&decl, "Order.count")),
            DeclarationProblem::AttributeType {
                attribute: "value".to_string(),
                expected: "an integer",
            }
        );

        let decl = declaration("NotNullWhen").with("expression", json!(true));
        assert!(matches!(
            problem(derive(&decl, "Person.code")),
            DeclarationProblem::AttributeType { .. }
        ));
    }

    #[test]
    fn test_error_names_declaration() {
        let decl = declaration("MaxWhen").with("expression", json!("active"));
        let err = derive(&decl, "Order.count").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Order.count"));
        assert!(text.contains("\"value\""));
    }

    #[test]
    fn test_effective_attributes_overlay_defaults() {
        let decl = declaration("SizeWhen")
            .with("expression", json!("active"))
            .with("max", json!(3));
        let effective = decl.effective_attributes();
        assert_eq!(effective.get("min"), Some(&json!(0)));
        assert_eq!(effective.get("max"), Some(&json!(3)));
        assert_eq!(effective.get("expression"), Some(&json!("active")));
    }
}
