//! Logic modules: pure decision functions over in-memory sets.
//!
//! Nothing in this layer talks to the registry. The engine fetches the current
//! state, hands it to these functions, and issues whatever they return.
//!
//! # Modules
//!
//! - `index` — forward and reverse lookups over the dependency rules
//! - `planner` — enable, self-heal and cascade decisions

pub mod index;
pub mod planner;
