pub mod config;
pub mod error;
pub mod types;

pub use config::{secs_to_ticks, Command, SimulationConfig};
pub use error::{GuardError, Result};
pub use types::{ActionId, Direction, GuardId, RegionId, Scope, SignalId, Tick, TilePos, Vec2};
