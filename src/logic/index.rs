//! Dependency Index
//!
//! Answers "which triggers does dependent X have" and "which dependents does
//! trigger Y affect". The reverse direction is precomputed once when the index
//! is built, so both lookups are map reads.

use crate::config::DependencyMap;
use crate::types::{ModuleId, ModuleSet};
use std::collections::BTreeMap;

/// Read-only lookup structure built from a [`DependencyMap`].
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    triggers: BTreeMap<ModuleId, ModuleSet>,
    dependents: BTreeMap<ModuleId, ModuleSet>,
    empty: ModuleSet,
}

impl DependencyIndex {
    pub fn new(rules: &DependencyMap) -> Self {
        let mut triggers = BTreeMap::new();
        let mut dependents: BTreeMap<ModuleId, ModuleSet> = BTreeMap::new();

        for (dependent, trigger_ids) in rules.iter() {
            triggers.insert(dependent.clone(), trigger_ids.clone());
            for trigger in trigger_ids {
                dependents
                    .entry(trigger.clone())
                    .or_default()
                    .insert(dependent.clone());
            }
        }

        Self {
            triggers,
            dependents,
            empty: ModuleSet::new(),
        }
    }

    /// Triggers of `dependent`; empty if it is not a configured dependent.
    pub fn triggers_of(&self, dependent: &str) -> &ModuleSet {
        self.triggers.get(dependent).unwrap_or(&self.empty)
    }

    /// Dependents whose trigger set contains `trigger`.
    pub fn dependents_of(&self, trigger: &str) -> &ModuleSet {
        self.dependents.get(trigger).unwrap_or(&self.empty)
    }

    pub fn is_dependent(&self, id: &str) -> bool {
        self.triggers.contains_key(id)
    }

    pub fn is_trigger(&self, id: &str) -> bool {
        self.dependents.contains_key(id)
    }

    /// True when no rules are configured at all.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Every module that acts as a trigger, sorted.
    pub fn all_triggers(&self) -> impl Iterator<Item = &ModuleId> {
        self.dependents.keys()
    }

    /// Every configured dependent, sorted.
    pub fn all_dependents(&self) -> impl Iterator<Item = &ModuleId> {
        self.triggers.keys()
    }
}

impl From<&DependencyMap> for DependencyIndex {
    fn from(rules: &DependencyMap) -> Self {
        Self::new(rules)
    }
}
