// SPDX-License-Identifier: MIT

//! Constraint kind metadata
//!
//! A `ConstraintKind` describes an ordinary constraint ("NotNull",
//! "DecimalMax", ...) by its attribute definitions. A `ConditionalKind`
//! stands in for exactly one constraint kind (`validate_as`) and adds the
//! `expression` attribute on top of that kind's attributes.

use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Attribute name holding the guard expression
pub const EXPRESSION: &str = "expression";
/// Attribute name holding the failure message template
pub const MESSAGE: &str = "message";
/// Attribute name holding the validation groups
pub const GROUPS: &str = "groups";
/// Attribute name holding the payload list
pub const PAYLOAD: &str = "payload";

/// Name -> value attribute mapping
pub type Attributes = BTreeMap<String, Value>;

/// Shape of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Text,
    Boolean,
    Integer,
    TextList,
}

impl AttributeType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::Text => value.is_string(),
            AttributeType::Boolean => value.is_boolean(),
            AttributeType::Integer => value.is_i64(),
            AttributeType::TextList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            AttributeType::Text => "a string",
            AttributeType::Boolean => "a boolean",
            AttributeType::Integer => "an integer",
            AttributeType::TextList => "a list of strings",
        }
    }
}

/// Definition of one attribute of a kind
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeType,
    /// `None` means the attribute is required
    pub default: Option<Value>,
}

impl AttributeDef {
    pub fn required(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: AttributeType, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default),
        }
    }
}

/// An ordinary constraint kind
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintKind {
    pub name: String,
    pub attributes: Vec<AttributeDef>,
}

impl ConstraintKind {
    /// A kind with the standard `message`, `groups` and `payload` attributes
    pub fn standard(name: impl Into<String>, default_message: &str) -> Self {
        Self {
            name: name.into(),
            attributes: vec![
                AttributeDef::optional(MESSAGE, AttributeType::Text, json!(default_message)),
                AttributeDef::optional(GROUPS, AttributeType::TextList, json!([])),
                AttributeDef::optional(PAYLOAD, AttributeType::TextList, json!([])),
            ],
        }
    }

    /// A kind with no attributes at all
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A conditional kind, standing in for one constraint kind
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalKind {
    pub name: String,
    pub validate_as: Option<Arc<ConstraintKind>>,
    pub attributes: Vec<AttributeDef>,
}

impl ConditionalKind {
    /// The `<Name>When` kind for `kind`: `expression` plus the wrapped attributes
    pub fn wrapping(kind: Arc<ConstraintKind>) -> Self {
        let mut attributes = vec![AttributeDef::required(EXPRESSION, AttributeType::Text)];
        attributes.extend(kind.attributes.iter().cloned());
        Self {
            name: format!("{}When", kind.name),
            validate_as: Some(kind),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A fully parameterised constraint: kind plus attribute values
///
/// Produced by deriving a conditional declaration; validators are
/// initialised from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualConstraintSpec {
    pub kind: Arc<ConstraintKind>,
    pub attributes: Attributes,
    /// Failure message template read from `attributes`
    pub message: String,
}

impl ActualConstraintSpec {
    pub fn name(&self) -> &str {
        &self.kind.name
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn bool_attribute(&self, name: &str) -> Option<bool> {
        self.attributes.get(name).and_then(Value::as_bool)
    }

    pub fn i64_attribute(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(Value::as_i64)
    }

    /// Validation groups; empty means the default group
    pub fn groups(&self) -> Vec<String> {
        self.attributes
            .get(GROUPS)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Registry of constraint and conditional kinds by name
#[derive(Debug, Clone, Default)]
pub struct ConstraintCatalog {
    kinds: HashMap<String, Arc<ConstraintKind>>,
    conditionals: HashMap<String, Arc<ConditionalKind>>,
}

impl ConstraintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in kind and its `<Name>When` counterpart
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for kind in builtin_kinds() {
            catalog.register_with_conditional(kind);
        }
        catalog
    }

    pub fn register(&mut self, kind: ConstraintKind) -> Arc<ConstraintKind> {
        let kind = Arc::new(kind);
        self.kinds.insert(kind.name.clone(), kind.clone());
        kind
    }

    pub fn register_conditional(&mut self, kind: ConditionalKind) -> Arc<ConditionalKind> {
        let kind = Arc::new(kind);
        self.conditionals.insert(kind.name.clone(), kind.clone());
        kind
    }

    /// Register `kind` and the generated conditional kind wrapping it
    pub fn register_with_conditional(&mut self, kind: ConstraintKind) -> Arc<ConditionalKind> {
        let kind = self.register(kind);
        self.register_conditional(ConditionalKind::wrapping(kind))
    }

    pub fn kind(&self, name: &str) -> Option<Arc<ConstraintKind>> {
        self.kinds.get(name).cloned()
    }

    pub fn conditional(&self, name: &str) -> Option<Arc<ConditionalKind>> {
        self.conditionals.get(name).cloned()
    }

    /// Conditional kind names, sorted
    pub fn conditional_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conditionals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn builtin_kinds() -> Vec<ConstraintKind> {
    use AttributeType::*;

    let standard = |name: &str| {
        ConstraintKind::standard(
            name,
            &format!("{{javax.validation.constraints.{}.message}}", name),
        )
    };
    let bound =
        |name: &str| standard(name).with_attribute(AttributeDef::required("value", Integer));
    let decimal_bound = |name: &str| {
        standard(name)
            .with_attribute(AttributeDef::required("value", Text))
            .with_attribute(AttributeDef::optional("inclusive", Boolean, json!(true)))
    };

    vec![
        standard("Null"),
        standard("NotNull"),
        standard("AssertTrue"),
        standard("AssertFalse"),
        bound("Min"),
        bound("Max"),
        decimal_bound("DecimalMin"),
        decimal_bound("DecimalMax"),
        standard("Size")
            .with_attribute(AttributeDef::optional("min", Integer, json!(0)))
            .with_attribute(AttributeDef::optional("max", Integer, json!(i32::MAX))),
        standard("NotEmpty"),
        standard("NotBlank"),
        standard("Pattern").with_attribute(AttributeDef::required("regexp", Text)),
        ConstraintKind::standard(
            "Isbn10",
            "{org.apache.bval.extras.constraints.checkdigit.ISBN10.message}",
        ),
        ConstraintKind::standard(
            "Directory",
            "{org.apache.bval.extras.constraints.file.Directory.message}",
        ),
    ]
}
