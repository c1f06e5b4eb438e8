//! Features Guard Library
//!
//! Keeps conditionally enabled modules in step with the trigger modules that
//! justify them: a dependent is enabled while at least one of its triggers is.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logic;
pub mod memory;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use config::{DependencyMap, RULES_PATH};
pub use engine::guard::{FeaturesGuard, PropagationReport};
pub use error::{GuardError, Result};
pub use host::HostSimulator;
pub use lifecycle::{dispatch, FeatureEventHandler};
pub use logic::index::DependencyIndex;
pub use logic::planner::{
    plan_cascade, plan_enable, plan_self_heal, violations, ActivationCommand, Violation,
};
pub use memory::{MemoryShell, Transition};
pub use registry::{ActivationRegistry, DescriptorSnapshot};
pub use types::{module_set, EngineContext, EnvironmentMode, LifecycleEvent, ModuleId, ModuleSet};
