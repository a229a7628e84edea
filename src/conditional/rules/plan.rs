// SPDX-License-Identifier: MIT

//! Validation plans built from rules files
//!
//! Bootstrap turns a `RulesFile` into a type table and one
//! `ConditionalValidator` per declaration. Any setup error aborts the whole
//! bootstrap. Declarations on the same owner type share a `GuardEvaluator`.

use super::types::{RulesFile, SubjectDocument, TypeDef};
use crate::conditional::derivation::ConditionalDeclaration;
use crate::conditional::descriptor::GuardedFieldDescriptor;
use crate::conditional::guard::GuardEvaluator;
use crate::conditional::orchestrator::ConditionalValidator;
use crate::conditional::resolution::ValidatorResolver;
use crate::error::ConditionalError;
use crate::host::{ConstraintCatalog, Record, Subject, TypeDescriptor, ValidationContext};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Group a constraint belongs to when it names none
pub const DEFAULT_GROUP: &str = "Default";

/// A failed check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// `Type.field` of the guarded field
    pub field: String,
    pub constraint: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.constraint, self.message)
    }
}

/// Every conditional check of a rules file, ready to run
#[derive(Debug)]
pub struct ValidationPlan {
    types: HashMap<String, Arc<TypeDescriptor>>,
    checks: Vec<ConditionalValidator>,
}

impl ValidationPlan {
    /// Bootstrap with the built-in catalog and validators
    pub fn from_rules(rules: &RulesFile) -> Result<Self, ConditionalError> {
        Self::bootstrap(
            rules,
            &ConstraintCatalog::with_builtins(),
            &ValidatorResolver::default(),
        )
    }

    pub fn bootstrap(
        rules: &RulesFile,
        catalog: &ConstraintCatalog,
        resolver: &ValidatorResolver,
    ) -> Result<Self, ConditionalError> {
        let types = build_types(&rules.types)?;
        let mut evaluators: HashMap<String, Arc<GuardEvaluator>> = HashMap::new();
        let mut checks = Vec::with_capacity(rules.constraints.len());

        for def in &rules.constraints {
            let owner = types
                .get(&def.type_name)
                .cloned()
                .ok_or_else(|| ConditionalError::UnknownType(def.type_name.clone()))?;
            let kind = catalog
                .conditional(&def.kind)
                .ok_or_else(|| ConditionalError::UnknownKind(def.kind.clone()))?;

            let declaration = ConditionalDeclaration {
                kind,
                attributes: def.attributes.clone(),
            };
            let descriptor =
                GuardedFieldDescriptor::setup(owner.clone(), &def.field, &declaration, resolver)?;

            let evaluator = evaluators
                .entry(owner.name.clone())
                .or_insert_with(|| {
                    Arc::new(GuardEvaluator::with_context_enums(&rules.context_enums))
                })
                .clone();
            checks.push(ConditionalValidator::new(Arc::new(descriptor), evaluator));
        }

        log::debug!(
            "Bootstrapped {} conditional constraints over {} types",
            checks.len(),
            types.len()
        );
        Ok(Self { types, checks })
    }

    pub fn type_named(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn checks(&self) -> &[ConditionalValidator] {
        &self.checks
    }

    /// Build a subject from a JSON document; unknown types and fields fail
    pub fn subject_from(&self, doc: &SubjectDocument) -> Result<Record, ConditionalError> {
        let subject_type = self
            .type_named(&doc.type_name)
            .cloned()
            .ok_or_else(|| ConditionalError::UnknownType(doc.type_name.clone()))?;

        let mut record = Record::new(subject_type);
        for (name, value) in &doc.fields {
            if !record.set(name, value.clone()) {
                return Err(ConditionalError::unknown_field(&doc.type_name, name));
            }
        }
        Ok(record)
    }

    /// Run every check that applies to `subject` in the requested groups.
    ///
    /// An empty `groups` slice means the default group. The first guard or
    /// extraction failure aborts the run.
    pub fn validate(
        &self,
        subject: &dyn Subject,
        groups: &[String],
    ) -> Result<Vec<Violation>, ConditionalError> {
        let requested: HashSet<&str> = if groups.is_empty() {
            HashSet::from([DEFAULT_GROUP])
        } else {
            groups.iter().map(String::as_str).collect()
        };
        let subject_type = subject.subject_type();
        let mut violations = Vec::new();

        for check in &self.checks {
            let descriptor = check.descriptor();
            if !subject_type.is_a(&descriptor.owner().name) {
                continue;
            }
            if !in_groups(&descriptor.constraint().groups(), &requested) {
                continue;
            }

            let mut context = ValidationContext::new(descriptor.constraint().message.clone());
            if check.is_valid(subject, &mut context)? {
                continue;
            }

            let mut messages = context.failure_messages();
            if messages.is_empty() {
                messages.push(descriptor.constraint().message.clone());
            }
            for message in messages {
                violations.push(Violation {
                    field: descriptor.field().to_string(),
                    constraint: descriptor.constraint().name().to_string(),
                    message,
                });
            }
        }

        Ok(violations)
    }
}

fn in_groups(constraint_groups: &[String], requested: &HashSet<&str>) -> bool {
    if constraint_groups.is_empty() {
        return requested.contains(DEFAULT_GROUP);
    }
    constraint_groups
        .iter()
        .any(|g| requested.contains(g.as_str()))
}

/// Resolve parents and build descriptors for every type
fn build_types(defs: &[TypeDef]) -> Result<HashMap<String, Arc<TypeDescriptor>>, ConditionalError> {
    let by_name: HashMap<&str, &TypeDef> = defs.iter().map(|d| (d.name.as_str(), d)).collect();
    let mut built = HashMap::new();

    for def in defs {
        let mut visiting = HashSet::new();
        build_type(&def.name, &by_name, &mut built, &mut visiting)?;
    }
    Ok(built)
}

fn build_type(
    name: &str,
    by_name: &HashMap<&str, &TypeDef>,
    built: &mut HashMap<String, Arc<TypeDescriptor>>,
    visiting: &mut HashSet<String>,
) -> Result<Arc<TypeDescriptor>, ConditionalError> {
    if let Some(existing) = built.get(name) {
        return Ok(existing.clone());
    }
    if !visiting.insert(name.to_string()) {
        return Err(ConditionalError::CyclicInheritance(name.to_string()));
    }

    let def = by_name
        .get(name)
        .ok_or_else(|| ConditionalError::UnknownType(name.to_string()))?;

    let mut descriptor = TypeDescriptor::new(&def.name);
    if let Some(parent) = &def.extends {
        descriptor = descriptor.extends(build_type(parent, by_name, built, visiting)?);
    }
    for field in &def.fields {
        descriptor = descriptor.field(&field.name, field.visibility, field.value_type.clone());
    }
    for enum_type in &def.enums {
        descriptor = descriptor.nested_enum(enum_type.clone());
    }

    let descriptor = Arc::new(descriptor);
    built.insert(def.name.clone(), descriptor.clone());
    Ok(descriptor)
}
