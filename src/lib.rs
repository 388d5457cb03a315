//! Guard Watch - tile-based guard AI simulation
//!
//! Guards sense a single target, accumulate suspicion, switch between
//! patrol, chase and cooldown, and request escalation side effects from the
//! host through narrow trait boundaries.

pub mod core;
pub mod guard;
pub mod loader;
pub mod simulation;
pub mod spatial;
