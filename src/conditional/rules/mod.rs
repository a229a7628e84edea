// SPDX-License-Identifier: MIT

pub mod loader;
pub mod plan;
pub mod types;

pub use loader::RulesLoader;
pub use plan::{ValidationPlan, Violation, DEFAULT_GROUP};
pub use types::{DeclarationDef, FieldSpec, RulesFile, SubjectDocument, TypeDef};
