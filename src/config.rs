//! Dependency rule configuration.
//!
//! Rules are read from the environment's JSON configuration tree at a fixed,
//! colon-separated section path and shaped as
//! `{ "Dependent": ["Trigger", "Trigger", ...], ... }`.
//!
//! # Loading Rules
//!
//! - Missing section (or `null`): empty rule set, every engine operation is a no-op
//! - Malformed section: [`GuardError::Config`]
//! - Blank module ids: [`GuardError::Config`]
//! - Any dependent that transitively triggers itself: [`GuardError::Cycle`]
//!
//! Rules are immutable once loaded. Changing them requires reloading the
//! environment.

use crate::error::{GuardError, Result};
use crate::types::{ModuleId, ModuleSet};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Section path of the dependency rules inside the configuration tree.
pub const RULES_PATH: &str =
    "Lombiq_Hosting_Tenants_FeaturesGuard:ConditionallyEnabledFeaturesOptions:ConditionallyEnabledFeatures";

/// Configured dependent → triggers relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    rules: BTreeMap<ModuleId, ModuleSet>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl DependencyMap {
    /// Build and validate a rule set from `(dependent, triggers)` pairs.
    ///
    /// Repeated dependents merge their trigger lists; repeated triggers collapse.
    pub fn new<D, T, I>(rules: impl IntoIterator<Item = (D, I)>) -> Result<Self>
    where
        D: Into<ModuleId>,
        T: Into<ModuleId>,
        I: IntoIterator<Item = T>,
    {
        let mut map: BTreeMap<ModuleId, ModuleSet> = BTreeMap::new();
        for (dependent, triggers) in rules {
            map.entry(dependent.into())
                .or_default()
                .extend(triggers.into_iter().map(Into::into));
        }

        let rules = Self { rules: map };
        rules.validate()?;
        Ok(rules)
    }

    /// Rule set with no dependents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Extract the rules from a whole configuration tree.
    pub fn from_config_tree(tree: &Value) -> Result<Self> {
        let mut section = tree;
        for key in RULES_PATH.split(':') {
            match section.get(key) {
                Some(next) => section = next,
                None => {
                    debug!("No dependency rules configured at {}", RULES_PATH);
                    return Ok(Self::empty());
                }
            }
        }

        if section.is_null() {
            debug!("Dependency rules at {} are null", RULES_PATH);
            return Ok(Self::empty());
        }

        let raw: BTreeMap<ModuleId, Vec<ModuleId>> = serde_json::from_value(section.clone())
            .map_err(|e| {
                GuardError::config(format!(
                    "rules at {} must map module ids to arrays of module ids: {}",
                    RULES_PATH, e
                ))
            })?;

        Self::new(raw)
    }

    /// Parse a configuration tree from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tree: Value = serde_json::from_str(json)?;
        Self::from_config_tree(&tree)
    }

    /// Load a configuration tree from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    /// Check ids and reject cyclic relationships.
    pub fn validate(&self) -> Result<()> {
        for (dependent, triggers) in &self.rules {
            if dependent.is_blank() {
                return Err(GuardError::config("dependent module id cannot be empty"));
            }
            if let Some(blank) = triggers.iter().find(|t| t.is_blank()) {
                return Err(GuardError::config(format!(
                    "dependent '{}' lists an empty trigger id '{}'",
                    dependent, blank
                )));
            }
            if triggers.is_empty() {
                warn!(
                    "Dependent '{}' has no triggers and will never be enabled automatically",
                    dependent
                );
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(GuardError::Cycle {
                path: cycle.into_iter().map(|id| id.to_string()).collect(),
            });
        }

        Ok(())
    }

    /// Triggers configured for `dependent`, if it is a dependent at all.
    pub fn triggers_of(&self, dependent: &str) -> Option<&ModuleSet> {
        self.rules.get(dependent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ModuleSet)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn find_cycle(&self) -> Option<Vec<ModuleId>> {
        let mut state: HashMap<&ModuleId, Visit> = HashMap::new();
        let mut path: Vec<&ModuleId> = Vec::new();

        self.rules
            .keys()
            .find_map(|start| self.visit(start, &mut state, &mut path))
    }

    fn visit<'a>(
        &'a self,
        node: &'a ModuleId,
        state: &mut HashMap<&'a ModuleId, Visit>,
        path: &mut Vec<&'a ModuleId>,
    ) -> Option<Vec<ModuleId>> {
        match state.get(node) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                let start = path.iter().position(|n| *n == node)?;
                let mut cycle: Vec<ModuleId> = path[start..].iter().map(|n| (*n).clone()).collect();
                cycle.push(node.clone());
                return Some(cycle);
            }
            None => {}
        }

        state.insert(node, Visit::InProgress);
        path.push(node);

        if let Some(triggers) = self.rules.get(node) {
            for trigger in triggers {
                if let Some(cycle) = self.visit(trigger, state, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        state.insert(node, Visit::Done);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn tree(rules: Value) -> Value {
        json!({
            "Lombiq_Hosting_Tenants_FeaturesGuard": {
                "ConditionallyEnabledFeaturesOptions": {
                    "ConditionallyEnabledFeatures": rules
                }
            }
        })
    }

    #[test]
    fn test_missing_section_is_empty() {
        let rules = DependencyMap::from_config_tree(&json!({ "Other": {} })).unwrap();
        assert!(rules.is_empty());

        let rules = DependencyMap::from_config_tree(&json!({
            "Lombiq_Hosting_Tenants_FeaturesGuard": { "ConditionallyEnabledFeaturesOptions": {} }
        }))
        .unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_rules_path_uses_full_section_name() {
        let rules = DependencyMap::from_json_str(
            r#"{
                "Lombiq_Hosting_Tenants_FeaturesGuard": {
                    "ConditionallyEnabledFeaturesOptions": {
                        "ConditionallyEnabledFeatures": { "B": ["A1"] }
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(rules.triggers_of("B").unwrap().contains("A1"));

        // the short root name is not recognised
        let rules = DependencyMap::from_json_str(
            r#"{
                "FeaturesGuard": {
                    "ConditionallyEnabledFeaturesOptions": {
                        "ConditionallyEnabledFeatures": { "B": ["A1"] }
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_null_section_is_empty() {
        let rules = DependencyMap::from_config_tree(&tree(Value::Null)).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_loads_rules() {
        let rules = DependencyMap::from_config_tree(&tree(json!({
            "B": ["A1", "A2"],
            "C": ["A2"]
        })))
        .unwrap();

        assert_eq!(rules.len(), 2);
        let triggers = rules.triggers_of("B").unwrap();
        assert!(triggers.contains("A1"));
        assert!(triggers.contains("A2"));
        assert!(rules.triggers_of("A1").is_none());
    }

    #[test]
    fn test_duplicate_triggers_collapse() {
        let rules = DependencyMap::new([("B", vec!["A", "A", "C"])]).unwrap();
        assert_eq!(rules.triggers_of("B").unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_section_rejected() {
        let err = DependencyMap::from_config_tree(&tree(json!({ "B": "A" }))).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));

        let err = DependencyMap::from_config_tree(&tree(json!(["B"]))).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_blank_ids_rejected() {
        assert!(matches!(
            DependencyMap::new([("", vec!["A"])]),
            Err(GuardError::Config(_))
        ));
        assert!(matches!(
            DependencyMap::new([("B", vec![" "])]),
            Err(GuardError::Config(_))
        ));
    }

    #[test]
    fn test_empty_trigger_list_allowed() {
        let rules = DependencyMap::new([("B", Vec::<&str>::new())]).unwrap();
        assert!(rules.triggers_of("B").unwrap().is_empty());
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let err = DependencyMap::new([("B", vec!["B"])]).unwrap_err();
        match err {
            GuardError::Cycle { path } => assert_eq!(path, vec!["B", "B"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let err = DependencyMap::new([
            ("A", vec!["B"]),
            ("B", vec!["C"]),
            ("C", vec!["A", "X"]),
        ])
        .unwrap_err();
        match err {
            GuardError::Cycle { path } => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path.len(), 4);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_chain_without_cycle_accepted() {
        // C is a dependent of B, which is itself a dependent of A
        let rules = DependencyMap::new([("B", vec!["A"]), ("C", vec!["B"])]).unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_diamond_is_not_cycle() {
        let rules = DependencyMap::new([
            ("D", vec!["B", "C"]),
            ("B", vec!["A"]),
            ("C", vec!["A"]),
        ]);
        assert!(rules.is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            tree(json!({ "Dependent": ["Trigger"] }))
        )
        .unwrap();

        let rules = DependencyMap::load_from_file(file.path()).unwrap();
        assert!(rules.triggers_of("Dependent").unwrap().contains("Trigger"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = DependencyMap::load_from_file("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, GuardError::Io(_)));
    }

    #[test]
    fn test_invalid_json_text() {
        let err = DependencyMap::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, GuardError::Json(_)));
    }
}
