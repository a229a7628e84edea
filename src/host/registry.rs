// SPDX-License-Identifier: MIT

use crate::host::builtin;
use crate::host::validator::ValidatorBinding;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Constraint kind name -> candidate validator bindings.
///
/// Bindings for a kind are kept in registration order, which is the order
/// resolution tries them in.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    bindings: Arc<RwLock<HashMap<String, Vec<ValidatorBinding>>>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in validators
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtin::register_all(&registry);
        registry
    }

    pub fn register(&self, kind: &str, binding: ValidatorBinding) {
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        bindings.entry(kind.to_string()).or_default().push(binding);
    }

    /// Bindings for `kind` in registration order; empty if none
    pub fn bindings_for(&self, kind: &str) -> Vec<ValidatorBinding> {
        let bindings = self
            .bindings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        bindings.get(kind).cloned().unwrap_or_default()
    }

    pub fn contains(&self, kind: &str) -> bool {
        !self.bindings_for(kind).is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bindings = self
            .bindings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f.debug_map().entries(bindings.iter()).finish()
    }
}
