//! Core types shared by the index, planners and engine.
//!
//! Module identifiers are opaque strings wrapped in a newtype so that they
//! cannot be confused with arbitrary text, and the per-environment flags the
//! engine needs are carried in an explicit [`EngineContext`] value.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Identifier of an activatable module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sorted set of module identifiers. Sorted so issued commands are deterministic.
pub type ModuleSet = BTreeSet<ModuleId>;

/// Build a [`ModuleSet`] from anything string-like.
pub fn module_set<I, S>(ids: I) -> ModuleSet
where
    I: IntoIterator<Item = S>,
    S: Into<ModuleId>,
{
    ids.into_iter().map(Into::into).collect()
}

/// Whether an environment is the shared default/template environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnvironmentMode {
    /// Canonical template environment. Never mutated by propagation.
    Default,
    /// Ordinary tenant environment.
    #[default]
    Tenant,
}

/// The eight module lifecycle transitions a host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleEvent {
    Installing,
    Installed,
    Enabling,
    Enabled,
    Disabling,
    Disabled,
    Uninstalling,
    Uninstalled,
}

impl LifecycleEvent {
    /// Returns true for callbacks fired after the registry state has changed
    pub const fn is_post_transition(self) -> bool {
        matches!(
            self,
            Self::Installed | Self::Enabled | Self::Disabled | Self::Uninstalled
        )
    }

    /// The pre-transition callback that precedes this one, if any
    pub const fn preceding(self) -> Option<Self> {
        match self {
            Self::Installed => Some(Self::Installing),
            Self::Enabled => Some(Self::Enabling),
            Self::Disabled => Some(Self::Disabling),
            Self::Uninstalled => Some(Self::Uninstalling),
            _ => None,
        }
    }
}

/// Per-invocation inputs the engine must not read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineContext {
    pub mode: EnvironmentMode,
    /// Set during environment setup, while the registry may lag the descriptor.
    pub bootstrapping: bool,
}

impl EngineContext {
    /// Context for an ordinary tenant outside of setup
    pub const fn tenant() -> Self {
        Self {
            mode: EnvironmentMode::Tenant,
            bootstrapping: false,
        }
    }

    /// Context for the default environment
    pub const fn default_environment() -> Self {
        Self {
            mode: EnvironmentMode::Default,
            bootstrapping: false,
        }
    }

    /// Same context, flagged as inside the setup window
    pub const fn in_bootstrap(mut self) -> Self {
        self.bootstrapping = true;
        self
    }

    pub const fn is_default_environment(&self) -> bool {
        matches!(self.mode, EnvironmentMode::Default)
    }
}
