//! Module lifecycle callbacks exposed to the host.
//!
//! A host announces every module transition through [`FeatureEventHandler`].
//! All eight callbacks default to doing nothing, so a handler only overrides
//! the transitions it reacts to.

use crate::error::Result;
use crate::types::{EngineContext, LifecycleEvent, ModuleId};

/// Receiver of module lifecycle transitions.
///
/// Post-transition callbacks (`installed`, `enabled`, `disabled`,
/// `uninstalled`) fire after the registry already reflects the change.
pub trait FeatureEventHandler {
    fn installing(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn installed(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn enabling(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn enabled(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn disabling(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn disabled(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn uninstalling(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    fn uninstalled(&self, _module: &ModuleId, _ctx: &EngineContext) -> Result<()> {
        Ok(())
    }

    /// Route `event` to the matching callback.
    fn on_event(&self, event: LifecycleEvent, module: &ModuleId, ctx: &EngineContext) -> Result<()> {
        match event {
            LifecycleEvent::Installing => self.installing(module, ctx),
            LifecycleEvent::Installed => self.installed(module, ctx),
            LifecycleEvent::Enabling => self.enabling(module, ctx),
            LifecycleEvent::Enabled => self.enabled(module, ctx),
            LifecycleEvent::Disabling => self.disabling(module, ctx),
            LifecycleEvent::Disabled => self.disabled(module, ctx),
            LifecycleEvent::Uninstalling => self.uninstalling(module, ctx),
            LifecycleEvent::Uninstalled => self.uninstalled(module, ctx),
        }
    }
}

/// Announce `event` to every handler in order, stopping at the first failure.
pub fn dispatch(
    handlers: &[Box<dyn FeatureEventHandler>],
    event: LifecycleEvent,
    module: &ModuleId,
    ctx: &EngineContext,
) -> Result<()> {
    for handler in handlers {
        handler.on_event(event, module, ctx)?;
    }
    Ok(())
}
