//! Host lifecycle dispatcher
//!
//! Plays the part of the hosting platform around a [`MemoryShell`]: applies an
//! administrator's enable/disable action, then announces each resulting
//! transition to every registered handler. Commands issued by handlers queue
//! further transitions, which are announced in turn until the shell is quiet.
//!
//! Events are processed strictly one at a time, matching the engine's
//! single-event-per-environment assumption.

use crate::error::{GuardError, Result};
use crate::lifecycle::{dispatch, FeatureEventHandler};
use crate::memory::{MemoryShell, Transition};
use crate::types::EngineContext;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on announced transitions per administrator action.
pub const DEFAULT_MAX_STEPS: usize = 1024;

pub struct HostSimulator {
    shell: Arc<MemoryShell>,
    handlers: Vec<Box<dyn FeatureEventHandler>>,
    ctx: EngineContext,
    max_steps: usize,
}

impl HostSimulator {
    pub fn new(shell: Arc<MemoryShell>, ctx: EngineContext) -> Self {
        Self {
            shell,
            handlers: Vec::new(),
            ctx,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_handler(mut self, handler: impl FeatureEventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn shell(&self) -> &MemoryShell {
        &self.shell
    }

    pub fn context(&self) -> EngineContext {
        self.ctx
    }

    /// Enable `id` as an administrator and settle. Returns every announced transition.
    pub fn enable(&self, id: &str) -> Result<Vec<Transition>> {
        if !self.shell.admin_enable(id) {
            debug!("Enable of '{}' changed nothing", id);
        }
        self.settle()
    }

    /// Disable `id` as an administrator and settle. Returns every announced transition.
    pub fn disable(&self, id: &str) -> Result<Vec<Transition>> {
        if !self.shell.admin_disable(id) {
            debug!("Disable of '{}' changed nothing", id);
        }
        self.settle()
    }

    /// Announce queued transitions until none remain.
    pub fn settle(&self) -> Result<Vec<Transition>> {
        let mut announced = Vec::new();

        while let Some(transition) = self.shell.pop_transition() {
            if announced.len() >= self.max_steps {
                return Err(GuardError::propagation(format!(
                    "transitions did not settle within {} steps",
                    self.max_steps
                )));
            }

            debug!("Announcing {} of '{}'", transition.event, transition.module);
            if let Some(before) = transition.event.preceding() {
                dispatch(&self.handlers, before, &transition.module, &self.ctx)?;
            }
            dispatch(&self.handlers, transition.event, &transition.module, &self.ctx)?;
            announced.push(transition);
        }

        Ok(announced)
    }
}
