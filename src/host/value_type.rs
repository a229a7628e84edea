// SPDX-License-Identifier: MIT

//! Value types used for validator dispatch
//!
//! Every field declares a `ValueType`; every validator binding declares the
//! `ValueType` it accepts. Dispatch asks whether the accepted type is
//! assignable from the field's declared type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Static type of a field or of a validator's accepted values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Accepts any value
    Any,
    Boolean,
    /// Integer or decimal
    Number,
    Integer,
    Decimal,
    Text,
    /// File-system path held as a string
    Path,
    Sequence,
    Map,
    /// Constant of the named enumeration
    Enum(String),
}

impl ValueType {
    /// Can a field declared as `field_type` be handed to a validator accepting `self`?
    pub fn is_assignable_from(&self, field_type: &ValueType) -> bool {
        match (self, field_type) {
            (ValueType::Any, _) => true,
            (ValueType::Number, ValueType::Integer | ValueType::Decimal) => true,
            (accepted, field) => accepted == field,
        }
    }

    /// Does a runtime value fit this type? Null fits every type.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ValueType::Any, _) => true,
            (ValueType::Boolean, Value::Bool(_)) => true,
            (ValueType::Number | ValueType::Decimal, Value::Number(_)) => true,
            (ValueType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueType::Text | ValueType::Path | ValueType::Enum(_), Value::String(_)) => true,
            (ValueType::Sequence, Value::Array(_)) => true,
            (ValueType::Map, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Any => write!(f, "any"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Number => write!(f, "number"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Decimal => write!(f, "decimal"),
            ValueType::Text => write!(f, "text"),
            ValueType::Path => write!(f, "path"),
            ValueType::Sequence => write!(f, "sequence"),
            ValueType::Map => write!(f, "map"),
            ValueType::Enum(name) => write!(f, "enum {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_accepts_everything() {
        for field in [
            ValueType::Boolean,
            ValueType::Integer,
            ValueType::Text,
            ValueType::Enum("Status".to_string()),
        ] {
            assert!(ValueType::Any.is_assignable_from(&field));
        }
    }

    #[test]
    fn test_number_accepts_numeric_subtypes() {
        assert!(ValueType::Number.is_assignable_from(&ValueType::Integer));
        assert!(ValueType::Number.is_assignable_from(&ValueType::Decimal));
        assert!(ValueType::Number.is_assignable_from(&ValueType::Number));
        assert!(!ValueType::Number.is_assignable_from(&ValueType::Text));
        // Not the other way round
        assert!(!ValueType::Integer.is_assignable_from(&ValueType::Number));
    }

    #[test]
    fn test_text_is_not_path() {
        assert!(!ValueType::Text.is_assignable_from(&ValueType::Path));
        assert!(!ValueType::Path.is_assignable_from(&ValueType::Text));
    }

    #[test]
    fn test_enum_assignability_by_name() {
        let status = ValueType::Enum("Status".to_string());
        assert!(status.is_assignable_from(&ValueType::Enum("Status".to_string())));
        assert!(!status.is_assignable_from(&ValueType::Enum("Kind".to_string())));
    }

    #[test]
    fn test_admits() {
        assert!(ValueType::Integer.admits(&json!(3)));
        assert!(!ValueType::Integer.admits(&json!(3.5)));
        assert!(ValueType::Decimal.admits(&json!(3.5)));
        assert!(ValueType::Text.admits(&json!(null)));
        assert!(!ValueType::Boolean.admits(&json!("true")));
        assert!(ValueType::Sequence.admits(&json!([1, 2])));
        assert!(ValueType::Map.admits(&json!({"a": 1})));
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let ty: ValueType = serde_yaml::from_str("integer").unwrap();
        assert_eq!(ty, ValueType::Integer);
        let ty: ValueType = serde_yaml::with::singleton_map::deserialize(
            serde_yaml::Deserializer::from_str("enum: Status"),
        )
        .unwrap();
        assert_eq!(ty, ValueType::Enum("Status".to_string()));
    }
}
