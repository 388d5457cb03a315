pub mod tick;
pub mod world;

pub use tick::{run_guard_tick, DetainCause, GuardEvent};
pub use world::{GuardWorld, MapState};
