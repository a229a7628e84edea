//! Rules loader - YAML file loading and parsing
//!
//! This module handles loading rules files and subject documents.

use super::types::{RulesFile, SubjectDocument};
use crate::error::ConditionalError;
use std::fs;
use std::path::Path;

/// Loads rules files and subject documents
pub struct RulesLoader;

impl RulesLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a rules file from disk
    pub fn load_rules<P: AsRef<Path>>(&self, path: P) -> Result<RulesFile, ConditionalError> {
        let path = path.as_ref();
        log::debug!("Loading rules from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a rules file from a YAML string
    pub fn parse_yaml(content: &str) -> Result<RulesFile, ConditionalError> {
        let rules: RulesFile = serde_yaml::from_str(content)?;
        Ok(rules)
    }

    /// Load a subject document from a JSON file
    pub fn load_subject<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<SubjectDocument, ConditionalError> {
        let content = fs::read_to_string(path)?;
        Self::parse_subject(&content)
    }

    /// Parse a subject document from a JSON string
    pub fn parse_subject(content: &str) -> Result<SubjectDocument, ConditionalError> {
        let doc: SubjectDocument = serde_json::from_str(content)?;
        Ok(doc)
    }
}

impl Default for RulesLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ValueType, Visibility};
    use serde_json::json;

    #[test]
    fn test_parse_rules() {
        let yaml = r#"
types:
  - name: Person
    fields:
      - name: active
        type: boolean
        visibility: private
      - name: code
        type: text
        visibility: private
      - name: status
        type:
          enum: Status
    enums:
      - name: Status
        constants: [ACTIVE, BLOCKED]

constraints:
  - type: Person
    field: code
    kind: NotNullWhen
    attributes:
      expression: "active == true"
"#;
        let rules = RulesLoader::parse_yaml(yaml).unwrap();
        assert_eq!(rules.types.len(), 1);
        assert!(rules.context_enums.is_empty());

        let person = &rules.types[0];
        assert!(person.extends.is_none());
        assert_eq!(person.fields[0].visibility, Visibility::Private);
        assert_eq!(person.fields[1].value_type, ValueType::Text);
        assert_eq!(
            person.fields[2].value_type,
            ValueType::Enum("Status".to_string())
        );
        assert_eq!(person.fields[2].visibility, Visibility::Public);
        assert_eq!(person.enums[0].constants, vec!["ACTIVE", "BLOCKED"]);

        let decl = &rules.constraints[0];
        assert_eq!(decl.type_name, "Person");
        assert_eq!(decl.kind, "NotNullWhen");
        assert_eq!(
            decl.attributes.get("expression"),
            Some(&json!("active == true"))
        );
    }

    #[test]
    fn test_parse_empty_rules() {
        let rules = RulesLoader::parse_yaml("{}").unwrap();
        assert!(rules.types.is_empty());
        assert!(rules.constraints.is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(matches!(
            RulesLoader::parse_yaml("types: [name: ["),
            Err(ConditionalError::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_subject() {
        let doc = RulesLoader::parse_subject(
            r#"{"type": "Person", "fields": {"active": true, "code": null}}"#,
        )
        .unwrap();
        assert_eq!(doc.type_name, "Person");
        assert_eq!(doc.fields.get("active"), Some(&json!(true)));
        assert_eq!(doc.fields.get("code"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_missing_rules_file() {
        let loader = RulesLoader::new();
        assert!(matches!(
            loader.load_rules("/nonexistent/rules.yaml"),
            Err(ConditionalError::Io(_))
        ));
    }
}
