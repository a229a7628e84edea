// SPDX-License-Identifier: MIT

//! Subject types and instances
//!
//! A `TypeDescriptor` is the explicit field table of one subject type; the
//! parent link forms the inheritance chain. A `Subject` is an instance that
//! can report its runtime type and yield the value of any field in that
//! chain, bypassing visibility.

use crate::error::FieldAccessError;
use crate::host::ValueType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Declared visibility of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    /// Visible only inside the declaring module
    Package,
    Private,
}

/// A field declared directly on a type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub visibility: Visibility,
    pub value_type: ValueType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, visibility: Visibility, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            visibility,
            value_type,
        }
    }
}

/// An enumeration type with named constants
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct EnumType {
    pub name: String,
    pub constants: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, constants: &[&str]) -> Self {
        Self {
            name: name.into(),
            constants: constants.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Identifies a field by its declaring type and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub declared_on: String,
    pub name: String,
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.declared_on, self.name)
    }
}

/// Field table of a subject type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub parent: Option<Arc<TypeDescriptor>>,
    pub fields: Vec<FieldDef>,
    /// Enumerations nested in this type
    pub enums: Vec<EnumType>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: Arc<TypeDescriptor>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        visibility: Visibility,
        value_type: ValueType,
    ) -> Self {
        self.fields.push(FieldDef::new(name, visibility, value_type));
        self
    }

    pub fn nested_enum(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Iterate this type and its ancestors, most derived first
    pub fn lineage(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |ty| ty.parent.as_deref())
    }

    /// All fields of the chain with their declaring type, most derived first
    pub fn all_fields(&self) -> impl Iterator<Item = (&TypeDescriptor, &FieldDef)> {
        self.lineage()
            .flat_map(|ty| ty.fields.iter().map(move |field| (ty, field)))
    }

    /// Find the most derived field with this name
    pub fn find_field(&self, name: &str) -> Option<(FieldRef, &FieldDef)> {
        self.all_fields()
            .find(|(_, field)| field.name == name)
            .map(|(ty, field)| {
                (
                    FieldRef {
                        declared_on: ty.name.clone(),
                        name: field.name.clone(),
                    },
                    field,
                )
            })
    }

    /// Look up a field by its exact reference
    pub fn resolve(&self, field: &FieldRef) -> Option<&FieldDef> {
        self.lineage()
            .find(|ty| ty.name == field.declared_on)
            .and_then(|ty| ty.fields.iter().find(|f| f.name == field.name))
    }

    /// Is `name` this type or one of its ancestors?
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage().any(|ty| ty.name == name)
    }
}

/// An instance being validated
pub trait Subject: Send + Sync {
    /// Runtime type of the instance
    fn subject_type(&self) -> &Arc<TypeDescriptor>;

    /// Read a field anywhere in the chain, regardless of its visibility
    fn read_field(&self, field: &FieldRef) -> Result<Value, FieldAccessError>;
}

/// A dynamic subject backed by a value map
///
/// Unset fields read as `null`, like an uninitialised reference.
#[derive(Debug, Clone)]
pub struct Record {
    subject_type: Arc<TypeDescriptor>,
    values: HashMap<FieldRef, Value>,
    sealed: HashSet<FieldRef>,
}

impl Record {
    pub fn new(subject_type: Arc<TypeDescriptor>) -> Self {
        Self {
            subject_type,
            values: HashMap::new(),
            sealed: HashSet::new(),
        }
    }

    /// Set the most derived field named `name`; unknown names are ignored
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Set a possibly shadowed field on a specific ancestor
    pub fn with_on(mut self, declared_on: &str, name: &str, value: Value) -> Self {
        self.values.insert(
            FieldRef {
                declared_on: declared_on.to_string(),
                name: name.to_string(),
            },
            value,
        );
        self
    }

    /// Deny all reads of the most derived field named `name`
    pub fn sealed(mut self, name: &str) -> Self {
        if let Some((field, _)) = self.subject_type.find_field(name) {
            self.sealed.insert(field);
        }
        self
    }

    /// Set the most derived field named `name`, returning whether it exists
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.subject_type.find_field(name) {
            Some((field, _)) => {
                self.values.insert(field, value);
                true
            }
            None => {
                log::warn!(
                    "Ignoring value for unknown field '{}' of {}",
                    name,
                    self.subject_type.name
                );
                false
            }
        }
    }
}

impl Subject for Record {
    fn subject_type(&self) -> &Arc<TypeDescriptor> {
        &self.subject_type
    }

    fn read_field(&self, field: &FieldRef) -> Result<Value, FieldAccessError> {
        let def = self
            .subject_type
            .resolve(field)
            .ok_or_else(|| FieldAccessError::NoSuchField(field.to_string()))?;

        if self.sealed.contains(field) {
            return Err(FieldAccessError::Denied(field.name.clone()));
        }

        let value = self.values.get(field).cloned().unwrap_or(Value::Null);
        if !def.value_type.admits(&value) {
            return Err(FieldAccessError::TypeMismatch {
                field: field.name.clone(),
                expected: def.value_type.clone(),
            });
        }
        Ok(value)
    }
}
