//! Propagation Engine
//!
//! Reacts to a single module's enable/disable transition by fetching the
//! current activation state, running the planners, and issuing the resulting
//! commands to the activation registry.
//!
//! # Design
//!
//! - **Fresh reads**: the enabled set is fetched per reaction, never cached
//! - **Explicit context**: environment mode and bootstrap window come in as arguments
//! - **No retries**: registry failures propagate to the caller untouched
//! - **No redundant writes**: empty plans issue nothing
//!
//! # Enabled-Set Source
//!
//! | Context         | Source |
//! |-----------------|--------|
//! | bootstrapping   | Descriptor snapshot |
//! | otherwise       | Activation registry |

use crate::config::DependencyMap;
use crate::error::Result;
use crate::lifecycle::FeatureEventHandler;
use crate::logic::index::DependencyIndex;
use crate::logic::planner::{self, ActivationCommand};
use crate::registry::{ActivationRegistry, DescriptorSnapshot};
use crate::types::{EngineContext, LifecycleEvent, ModuleId, ModuleSet};
use tracing::{debug, info, warn};

/// Commands issued in response to one lifecycle callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    pub module: ModuleId,
    pub event: LifecycleEvent,
    pub commands: Vec<ActivationCommand>,
}

impl PropagationReport {
    fn new(module: &str, event: LifecycleEvent) -> Self {
        Self {
            module: ModuleId::from(module),
            event,
            commands: Vec::new(),
        }
    }

    /// True when nothing was issued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Modules enabled by this callback.
    pub fn enabled(&self) -> ModuleSet {
        self.collect(true)
    }

    /// Modules disabled by this callback.
    pub fn disabled(&self) -> ModuleSet {
        self.collect(false)
    }

    fn collect(&self, enable: bool) -> ModuleSet {
        self.commands
            .iter()
            .filter(|c| c.is_enable() == enable)
            .flat_map(|c| c.ids().iter().cloned())
            .collect()
    }
}

/// The conditional feature dependency engine.
#[derive(Debug)]
pub struct FeaturesGuard<R, S> {
    index: DependencyIndex,
    registry: R,
    snapshot: S,
}

impl<R, S> FeaturesGuard<R, S>
where
    R: ActivationRegistry,
    S: DescriptorSnapshot,
{
    pub fn new(rules: &DependencyMap, registry: R, snapshot: S) -> Self {
        Self {
            index: DependencyIndex::new(rules),
            registry,
            snapshot,
        }
    }

    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// Enable the dependents of a module that was just enabled.
    pub fn on_module_enabled(&self, id: &str, ctx: &EngineContext) -> Result<PropagationReport> {
        let mut report = PropagationReport::new(id, LifecycleEvent::Enabled);

        if ctx.is_default_environment() {
            debug!("Default environment, skipping propagation for '{}'", id);
            return Ok(report);
        }

        let dependents = self.index.dependents_of(id);
        if dependents.is_empty() {
            return Ok(report);
        }

        let available = self.registry.list_available_modules()?;
        self.warn_unavailable(dependents, &available);

        let enabled = self.enabled_set(ctx)?;
        if let Some(command) = planner::plan_enable(&self.index, id, &enabled, &available) {
            self.issue(command, &mut report)?;
        }

        Ok(report)
    }

    /// Self-heal `id` if it is a dependent, then cascade to its own dependents.
    pub fn on_module_disabled(&self, id: &str, ctx: &EngineContext) -> Result<PropagationReport> {
        let mut report = PropagationReport::new(id, LifecycleEvent::Disabled);

        if ctx.is_default_environment() {
            debug!("Default environment, skipping propagation for '{}'", id);
            return Ok(report);
        }

        self.self_heal(id, ctx, &mut report)?;
        self.cascade(id, ctx, &mut report)?;

        Ok(report)
    }

    fn self_heal(&self, id: &str, ctx: &EngineContext, report: &mut PropagationReport) -> Result<()> {
        if !self.index.is_dependent(id) {
            return Ok(());
        }

        let available = self.registry.list_available_modules()?;
        let enabled = self.enabled_set(ctx)?;
        if let Some(command) = planner::plan_self_heal(&self.index, id, &enabled, &available) {
            info!("'{}' was disabled while a trigger is still enabled", id);
            self.issue(command, report)?;
        }

        Ok(())
    }

    fn cascade(&self, id: &str, ctx: &EngineContext, report: &mut PropagationReport) -> Result<()> {
        if !self.index.is_trigger(id) {
            return Ok(());
        }

        let available = self.registry.list_available_modules()?;
        let enabled = self.enabled_set(ctx)?;
        if let Some(command) = planner::plan_cascade(&self.index, id, &enabled, &available) {
            self.issue(command, report)?;
        }

        Ok(())
    }

    fn enabled_set(&self, ctx: &EngineContext) -> Result<ModuleSet> {
        if ctx.bootstrapping {
            self.snapshot.get_enabled_modules()
        } else {
            self.registry.list_enabled_modules()
        }
    }

    fn issue(&self, command: ActivationCommand, report: &mut PropagationReport) -> Result<()> {
        info!("{} after {} of '{}'", command, report.event, report.module);
        self.registry.apply(&command)?;
        report.commands.push(command);
        Ok(())
    }

    fn warn_unavailable(&self, dependents: &ModuleSet, available: &ModuleSet) {
        for missing in dependents.difference(available) {
            warn!("Configured dependent '{}' is not available", missing);
        }
    }
}

impl<R, S> FeatureEventHandler for FeaturesGuard<R, S>
where
    R: ActivationRegistry,
    S: DescriptorSnapshot,
{
    fn enabled(&self, module: &ModuleId, ctx: &EngineContext) -> Result<()> {
        self.on_module_enabled(module.as_str(), ctx).map(|_| ())
    }

    fn disabled(&self, module: &ModuleId, ctx: &EngineContext) -> Result<()> {
        self.on_module_disabled(module.as_str(), ctx).map(|_| ())
    }
}
