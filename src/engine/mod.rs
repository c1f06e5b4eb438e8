//! Engine modules — the reactive core that turns lifecycle events into commands.
//!
//! The engine sits between the host's lifecycle dispatcher and the activation
//! registry. It reads state, defers every decision to `logic`, and issues the
//! resulting commands.

pub mod guard;
