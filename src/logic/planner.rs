//! Propagation planners
//!
//! Each lifecycle reaction is a pure function of the dependency index, the
//! module that changed state, and a freshly fetched enabled set. They return
//! the command the engine should issue, or `None` when nothing would change.
//!
//! # Reactions
//!
//! | Event    | Reaction   | Command |
//! |----------|------------|---------|
//! | enabled  | enable     | `Enable(dependents not yet enabled, force)` |
//! | disabled | self-heal  | `Enable({id})` if a trigger of `id` is still enabled |
//! | disabled | cascade    | `Disable(available dependents left without an enabled trigger)` |
//!
//! Self-heal and cascade produce disjoint outcomes (re-enabling `id` versus
//! disabling other modules), so the order the engine runs them in is irrelevant.

use crate::logic::index::DependencyIndex;
use crate::types::{ModuleId, ModuleSet};
use std::fmt;

/// A single command issued to the activation registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationCommand {
    /// Enable every module in `ids`. `force` bypasses registry eligibility policy.
    Enable { ids: ModuleSet, force: bool },

    /// Disable every module in `ids`
    Disable { ids: ModuleSet },
}

impl ActivationCommand {
    pub fn ids(&self) -> &ModuleSet {
        match self {
            Self::Enable { ids, .. } | Self::Disable { ids } => ids,
        }
    }

    pub fn is_enable(&self) -> bool {
        matches!(self, Self::Enable { .. })
    }
}

impl fmt::Display for ActivationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = join(self.ids());
        match self {
            Self::Enable { force: true, .. } => write!(f, "Enable({{{}}}, force)", ids),
            Self::Enable { force: false, .. } => write!(f, "Enable({{{}}})", ids),
            Self::Disable { .. } => write!(f, "Disable({{{}}})", ids),
        }
    }
}

fn join(ids: &ModuleSet) -> String {
    ids.iter().map(ModuleId::as_str).collect::<Vec<_>>().join(", ")
}

/// Dependents of a just-enabled trigger that are available and not yet enabled.
pub fn plan_enable(
    index: &DependencyIndex,
    enabled_id: &str,
    enabled: &ModuleSet,
    available: &ModuleSet,
) -> Option<ActivationCommand> {
    let ids: ModuleSet = index
        .dependents_of(enabled_id)
        .iter()
        .filter(|d| available.contains(*d) && !enabled.contains(*d))
        .cloned()
        .collect();

    if ids.is_empty() {
        return None;
    }

    Some(ActivationCommand::Enable { ids, force: true })
}

/// Re-enable a dependent that was disabled while one of its triggers is still enabled.
///
/// Unforced: the registry's own eligibility policy still applies.
pub fn plan_self_heal(
    index: &DependencyIndex,
    disabled_id: &str,
    enabled: &ModuleSet,
    available: &ModuleSet,
) -> Option<ActivationCommand> {
    if !index.is_dependent(disabled_id)
        || enabled.contains(disabled_id)
        || !available.contains(disabled_id)
    {
        return None;
    }

    let has_enabled_trigger = index
        .triggers_of(disabled_id)
        .iter()
        .any(|t| enabled.contains(t));

    if !has_enabled_trigger {
        return None;
    }

    let mut ids = ModuleSet::new();
    ids.insert(ModuleId::from(disabled_id));
    Some(ActivationCommand::Enable { ids, force: false })
}

/// Disable dependents of a just-disabled trigger once none of their triggers remain.
///
/// Each dependent is judged on its own trigger set. A trigger that self-heal
/// already re-enabled counts as enabled. Dependents the registry no longer
/// lists as available are left alone.
pub fn plan_cascade(
    index: &DependencyIndex,
    disabled_id: &str,
    enabled: &ModuleSet,
    available: &ModuleSet,
) -> Option<ActivationCommand> {
    let ids: ModuleSet = index
        .dependents_of(disabled_id)
        .iter()
        .filter(|d| available.contains(*d) && enabled.contains(*d))
        .filter(|d| {
            !index
                .triggers_of(d.as_str())
                .iter()
                .any(|t| enabled.contains(t))
        })
        .cloned()
        .collect();

    if ids.is_empty() {
        return None;
    }

    Some(ActivationCommand::Disable { ids })
}

/// A dependent whose enabled state disagrees with its triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Enabled although none of its triggers are
    Orphaned(ModuleId),
    /// Disabled although at least one trigger is enabled
    Missing(ModuleId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphaned(id) => write!(f, "{} is enabled without any enabled trigger", id),
            Self::Missing(id) => write!(f, "{} is disabled while a trigger is enabled", id),
        }
    }
}

/// List every available dependent that breaks "enabled iff a trigger is enabled".
pub fn violations(
    index: &DependencyIndex,
    enabled: &ModuleSet,
    available: &ModuleSet,
) -> Vec<Violation> {
    index
        .all_dependents()
        .filter(|d| available.contains(*d))
        .filter_map(|d| {
            let triggered = index
                .triggers_of(d.as_str())
                .iter()
                .any(|t| enabled.contains(t));
            match (enabled.contains(d), triggered) {
                (true, false) => Some(Violation::Orphaned(d.clone())),
                (false, true) => Some(Violation::Missing(d.clone())),
                _ => None,
            }
        })
        .collect()
}
