//! In-memory activation state
//!
//! `MemoryShell` stands in for a host environment: it implements both
//! [`ActivationRegistry`] and [`DescriptorSnapshot`], keeps a journal of the
//! commands it received through those traits, and queues the lifecycle
//! transitions each state change produces so a host can dispatch them.
//!
//! # Modelled Host Behaviour
//!
//! - Unknown modules are ignored with a warning
//! - Restricted modules are only enabled when the caller forces it
//! - The descriptor view can be staged ahead of the registry to model setup
//! - A one-shot failure can be injected to model an unavailable store

use crate::error::{GuardError, Result};
use crate::logic::planner::ActivationCommand;
use crate::registry::{ActivationRegistry, DescriptorSnapshot};
use crate::types::{LifecycleEvent, ModuleId, ModuleSet};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A state change the registry has applied and the host still has to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub module: ModuleId,
    pub event: LifecycleEvent,
}

#[derive(Debug, Default)]
struct ShellState {
    available: ModuleSet,
    enabled: ModuleSet,
    descriptor: ModuleSet,
    restricted: ModuleSet,
    journal: Vec<ActivationCommand>,
    transitions: VecDeque<Transition>,
    fail_next: Option<String>,
}

impl ShellState {
    fn check_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(reason) => Err(GuardError::registry(reason)),
            None => Ok(()),
        }
    }

    fn apply_enable(&mut self, ids: &ModuleSet, force: bool) -> ModuleSet {
        let mut changed = ModuleSet::new();
        for id in ids {
            if !self.available.contains(id) {
                warn!("Ignoring enable of unknown module '{}'", id);
                continue;
            }
            if self.restricted.contains(id) && !force {
                warn!("Module '{}' is restricted and was not enabled", id);
                continue;
            }
            self.descriptor.insert(id.clone());
            if self.enabled.insert(id.clone()) {
                changed.insert(id.clone());
                self.transitions.push_back(Transition {
                    module: id.clone(),
                    event: LifecycleEvent::Enabled,
                });
            }
        }
        changed
    }

    fn apply_disable(&mut self, ids: &ModuleSet) -> ModuleSet {
        let mut changed = ModuleSet::new();
        for id in ids {
            self.descriptor.remove(id);
            if self.enabled.remove(id) {
                changed.insert(id.clone());
                self.transitions.push_back(Transition {
                    module: id.clone(),
                    event: LifecycleEvent::Disabled,
                });
            }
        }
        changed
    }
}

/// In-memory environment implementing the registry and snapshot contracts.
#[derive(Debug, Default)]
pub struct MemoryShell {
    state: Mutex<ShellState>,
}

impl MemoryShell {
    /// Shell with the given modules available and nothing enabled.
    pub fn new(available: ModuleSet) -> Self {
        Self {
            state: Mutex::new(ShellState {
                available,
                ..ShellState::default()
            }),
        }
    }

    /// Mark modules as already enabled in both views, without transitions.
    pub fn with_enabled(self, ids: ModuleSet) -> Self {
        {
            let mut state = self.lock();
            state.enabled.extend(ids.iter().cloned());
            state.descriptor.extend(ids);
        }
        self
    }

    /// Mark modules the registry refuses to enable unless forced.
    pub fn with_restricted(self, ids: ModuleSet) -> Self {
        self.lock().restricted.extend(ids);
        self
    }

    fn lock(&self) -> MutexGuard<'_, ShellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enable a module as an administrator would. Returns true if it changed state.
    pub fn admin_enable(&self, id: &str) -> bool {
        let ids: ModuleSet = [ModuleId::from(id)].into();
        !self.lock().apply_enable(&ids, false).is_empty()
    }

    /// Disable a module as an administrator would. Returns true if it changed state.
    pub fn admin_disable(&self, id: &str) -> bool {
        let ids: ModuleSet = [ModuleId::from(id)].into();
        !self.lock().apply_disable(&ids).is_empty()
    }

    /// Record modules as enabled in the descriptor only, as during setup.
    pub fn stage_in_descriptor(&self, ids: ModuleSet) {
        self.lock().descriptor.extend(ids);
    }

    /// Catch the registry up with the descriptor, as at the end of setup.
    pub fn sync_registry(&self) {
        let mut state = self.lock();
        let staged: ModuleSet = state.descriptor.difference(&state.enabled).cloned().collect();
        debug!("Registry caught up with {} staged module(s)", staged.len());
        state.enabled.extend(staged);
    }

    /// Make the next registry or snapshot call fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.lock().fail_next = Some(reason.into());
    }

    /// Next queued transition, oldest first.
    pub fn pop_transition(&self) -> Option<Transition> {
        self.lock().transitions.pop_front()
    }

    pub fn pending_transitions(&self) -> usize {
        self.lock().transitions.len()
    }

    /// Commands received through [`ActivationRegistry`], in order.
    pub fn journal(&self) -> Vec<ActivationCommand> {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Registry view of enabled modules.
    pub fn enabled(&self) -> ModuleSet {
        self.lock().enabled.clone()
    }

    /// Descriptor view of enabled modules.
    pub fn descriptor(&self) -> ModuleSet {
        self.lock().descriptor.clone()
    }

    pub fn available(&self) -> ModuleSet {
        self.lock().available.clone()
    }
}

impl ActivationRegistry for MemoryShell {
    fn list_available_modules(&self) -> Result<ModuleSet> {
        let mut state = self.lock();
        state.check_failure()?;
        Ok(state.available.clone())
    }

    fn list_enabled_modules(&self) -> Result<ModuleSet> {
        let mut state = self.lock();
        state.check_failure()?;
        Ok(state.enabled.clone())
    }

    fn enable(&self, ids: &ModuleSet, force: bool) -> Result<()> {
        let mut state = self.lock();
        state.check_failure()?;
        state.journal.push(ActivationCommand::Enable {
            ids: ids.clone(),
            force,
        });
        state.apply_enable(ids, force);
        Ok(())
    }

    fn disable(&self, ids: &ModuleSet) -> Result<()> {
        let mut state = self.lock();
        state.check_failure()?;
        state
            .journal
            .push(ActivationCommand::Disable { ids: ids.clone() });
        state.apply_disable(ids);
        Ok(())
    }
}

impl DescriptorSnapshot for MemoryShell {
    fn get_enabled_modules(&self) -> Result<ModuleSet> {
        let mut state = self.lock();
        state.check_failure()?;
        Ok(state.descriptor.clone())
    }
}
