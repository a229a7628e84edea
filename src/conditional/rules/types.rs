// SPDX-License-Identifier: MIT

//! YAML schema types for rules files and subject documents
//!
//! A rules file declares the subject types (fields, visibility, value types,
//! nested enumerations), enumerations exposed to every guard, and the
//! conditional constraints attached to fields.

use crate::host::{EnumType, ValueType, Visibility};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level rules file
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct RulesFile {
    /// Subject types, parents may appear after their children
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Enumerations whose constants every guard may reference
    #[serde(default)]
    pub context_enums: Vec<EnumType>,
    /// Conditional constraint declarations
    #[serde(default)]
    pub constraints: Vec<DeclarationDef>,
}

/// A subject type
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct TypeDef {
    pub name: String,
    /// Name of the parent type
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Enumerations nested in this type
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

/// A field declared on a type
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    /// `integer`, `text`, ... or `{enum: Name}`
    #[serde(rename = "type", with = "serde_yaml::with::singleton_map")]
    #[schemars(with = "ValueType")]
    pub value_type: ValueType,
    #[serde(default)]
    pub visibility: Visibility,
}

/// One conditional constraint on a field
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct DeclarationDef {
    /// Owner type name
    #[serde(rename = "type")]
    pub type_name: String,
    pub field: String,
    /// Conditional kind, e.g. "NotNullWhen"
    pub kind: String,
    /// Attribute values, including `expression`
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// A subject instance as a JSON document
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct SubjectDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}
