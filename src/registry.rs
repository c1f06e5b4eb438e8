//! Contracts for the external activation state.
//!
//! The engine never owns the enabled set. It asks an [`ActivationRegistry`]
//! (authoritative) or a [`DescriptorSnapshot`] (bootstrap only) for it on every
//! decision and sends commands back to the registry.
//!
//! # Contract
//!
//! - Reads return the state as of the call; implementors must not cache across calls.
//! - `enable`/`disable` receive non-empty sets only.
//! - Any failure is returned as an error and is propagated to the host unchanged.
//!
//! Queries are statically typed (`is_enabled` returns a plain bool), so
//! callers never inspect concrete registry types to answer state questions.

use crate::error::Result;
use crate::logic::planner::ActivationCommand;
use crate::types::ModuleSet;
use std::sync::Arc;

/// Authoritative store of which modules exist and which are enabled.
pub trait ActivationRegistry {
    /// Every module the environment can activate.
    fn list_available_modules(&self) -> Result<ModuleSet>;

    /// Modules currently enabled.
    fn list_enabled_modules(&self) -> Result<ModuleSet>;

    /// Enable `ids`. `force` bypasses the registry's own eligibility policy.
    fn enable(&self, ids: &ModuleSet, force: bool) -> Result<()>;

    /// Disable `ids`.
    fn disable(&self, ids: &ModuleSet) -> Result<()>;

    fn is_enabled(&self, id: &str) -> Result<bool> {
        Ok(self.list_enabled_modules()?.contains(id))
    }

    /// Route a planned command to `enable` or `disable`.
    fn apply(&self, command: &ActivationCommand) -> Result<()> {
        match command {
            ActivationCommand::Enable { ids, force } => self.enable(ids, *force),
            ActivationCommand::Disable { ids } => self.disable(ids),
        }
    }
}

/// Alternative view of enabled modules that can run ahead of the registry
/// while an environment is being set up.
pub trait DescriptorSnapshot {
    fn get_enabled_modules(&self) -> Result<ModuleSet>;
}

impl<T: ActivationRegistry + ?Sized> ActivationRegistry for Arc<T> {
    fn list_available_modules(&self) -> Result<ModuleSet> {
        (**self).list_available_modules()
    }

    fn list_enabled_modules(&self) -> Result<ModuleSet> {
        (**self).list_enabled_modules()
    }

    fn enable(&self, ids: &ModuleSet, force: bool) -> Result<()> {
        (**self).enable(ids, force)
    }

    fn disable(&self, ids: &ModuleSet) -> Result<()> {
        (**self).disable(ids)
    }

    fn is_enabled(&self, id: &str) -> Result<bool> {
        (**self).is_enabled(id)
    }
}

impl<T: DescriptorSnapshot + ?Sized> DescriptorSnapshot for Arc<T> {
    fn get_enabled_modules(&self) -> Result<ModuleSet> {
        (**self).get_enabled_modules()
    }
}
