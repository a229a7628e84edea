// SPDX-License-Identifier: MIT

//! Evaluation contexts for guard expressions
//!
//! A context maps names to values: every field of the subject that the
//! validator may see, plus enumeration constants registered under
//! `<Enum>.<CONSTANT>`. Field visibility is computed once per subject type
//! into a `FieldTable`; enumeration constants are registered once per
//! builder.

use crate::error::ConditionalError;
use crate::host::{EnumType, FieldDef, FieldRef, Subject, TypeDescriptor, ValueType, Visibility};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Name -> value lookup for a single evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    variables: HashMap<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Look up `path`: an exact key first (constants contain dots), then a
    /// walk into map values (e.g. "address.country")
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.variables.get(path) {
            return Some(value);
        }

        let mut parts = path.split('.');
        let mut current = self.variables.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// All names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Enumeration constants keyed by `<Enum>.<CONSTANT>`
pub type ConstantTable = HashMap<String, Value>;

fn register_enum(table: &mut ConstantTable, enum_type: &EnumType) {
    for constant in &enum_type.constants {
        table.insert(
            format!("{}.{}", enum_type.name, constant),
            Value::String(constant.clone()),
        );
    }
}

/// A field the validator may see, with its declaring type
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleField {
    pub field: FieldRef,
    pub value_type: ValueType,
}

/// The fields visible for one concrete subject type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    pub type_name: String,
    pub fields: Vec<VisibleField>,
}

impl FieldTable {
    /// Compute the visible fields of `subject_type`.
    ///
    /// The chain is walked from the runtime type up to the root. A name
    /// declared on several types resolves to the visible declaration seen
    /// last, i.e. the one closest to the root.
    pub fn for_type(subject_type: &TypeDescriptor) -> Self {
        let mut fields: Vec<VisibleField> = Vec::new();

        for (declaring, field) in subject_type.all_fields() {
            if !is_visible_by_validator(subject_type, declaring, field) {
                continue;
            }
            let visible = VisibleField {
                field: FieldRef {
                    declared_on: declaring.name.clone(),
                    name: field.name.clone(),
                },
                value_type: field.value_type.clone(),
            };
            match fields.iter_mut().find(|f| f.field.name == field.name) {
                Some(existing) => *existing = visible,
                None => fields.push(visible),
            }
        }

        Self {
            type_name: subject_type.name.clone(),
            fields,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.field.name == name)
    }
}

/// Public and protected fields anywhere in the chain are visible; private
/// fields only when declared on the subject's own runtime type.
pub fn is_visible_by_validator(
    subject_type: &TypeDescriptor,
    declaring: &TypeDescriptor,
    field: &FieldDef,
) -> bool {
    match field.visibility {
        Visibility::Public | Visibility::Protected => true,
        Visibility::Private => declaring.name == subject_type.name,
        Visibility::Package => false,
    }
}

/// Builds evaluation contexts from subjects
pub struct ContextBuilder {
    /// Constants from enumerations supplied at construction
    explicit: ConstantTable,
    /// Constants from the nested enumerations of the first subject type seen
    nested: OnceCell<ConstantTable>,
    tables: RwLock<HashMap<String, Arc<FieldTable>>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::with_context_enums(&[])
    }

    /// Builder that always exposes the constants of `enums`
    pub fn with_context_enums(enums: &[EnumType]) -> Self {
        let mut explicit = ConstantTable::new();
        for enum_type in enums {
            register_enum(&mut explicit, enum_type);
        }
        Self {
            explicit,
            nested: OnceCell::new(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Has the one-time nested-constant registration completed?
    pub fn constants_registered(&self) -> bool {
        self.nested.get().is_some()
    }

    /// Register the constants of the enumerations nested in `subject_type`
    /// (and its ancestors) unless some earlier call already did.
    ///
    /// Concurrent first callers block until the winner finishes. Returns
    /// whether this call performed the registration.
    pub fn register_nested_constants(&self, subject_type: &TypeDescriptor) -> bool {
        let mut registered_now = false;
        self.nested.get_or_init(|| {
            registered_now = true;
            let mut table = ConstantTable::new();
            for ty in subject_type.lineage() {
                for enum_type in &ty.enums {
                    register_enum(&mut table, enum_type);
                }
            }
            log::info!(
                "Registered {} enumeration constants from {}",
                table.len(),
                subject_type.name
            );
            table
        });
        registered_now
    }

    /// Look up a registered constant
    pub fn constant(&self, key: &str) -> Option<&Value> {
        self.explicit
            .get(key)
            .or_else(|| self.nested.get().and_then(|nested| nested.get(key)))
    }

    /// Visible-field table for a type, computed on first use
    pub fn field_table(&self, subject_type: &TypeDescriptor) -> Arc<FieldTable> {
        {
            let tables = self
                .tables
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(table) = tables.get(&subject_type.name) {
                return table.clone();
            }
        }

        let mut tables = self
            .tables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tables
            .entry(subject_type.name.clone())
            .or_insert_with(|| {
                log::debug!("Computing visible fields of {}", subject_type.name);
                Arc::new(FieldTable::for_type(subject_type))
            })
            .clone()
    }

    /// Build a fresh context for `subject`
    pub fn build(&self, subject: &dyn Subject) -> Result<EvaluationContext, ConditionalError> {
        let subject_type = subject.subject_type();
        self.register_nested_constants(subject_type);

        let mut ctx = EvaluationContext::new();
        for (key, value) in &self.explicit {
            ctx.set(key.clone(), value.clone());
        }
        if let Some(nested) = self.nested.get() {
            for (key, value) in nested {
                ctx.set(key.clone(), value.clone());
            }
        }

        let table = self.field_table(subject_type);
        for visible in &table.fields {
            let value =
                subject
                    .read_field(&visible.field)
                    .map_err(|source| ConditionalError::ContextBuild {
                        type_name: subject_type.name.clone(),
                        field: visible.field.name.clone(),
                        source,
                    })?;
            ctx.set(visible.field.name.clone(), value);
        }

        Ok(ctx)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("explicit", &self.explicit.len())
            .field("constants_registered", &self.constants_registered())
            .finish()
    }
}
