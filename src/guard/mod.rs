//! Guard AI: sensing, suspicion, alert state machine, movement and escalation

pub mod alert;
pub mod collaborators;
pub mod config;
pub mod escalation;
pub mod geometry;
pub mod movement;
pub mod overlay;
pub mod patrol;
pub mod runtime;
pub mod sensing;
pub mod suspicion;

pub use collaborators::{
    DisguiseModifiers, Effect, EffectLog, GuardEffects, Notification, Target, WorldQuery,
};
pub use config::{GuardConfig, PatrolSpec, TriggerMode};
pub use runtime::{AlertState, GuardRuntimeState};
pub use sensing::DetectionResult;

use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, GuardId, Tick, TilePos};

/// A guard instance on the map
///
/// The config is the guard's immutable definition; `state` is rebuilt from
/// it whenever the definition is reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guard {
    pub id: GuardId,
    pub position: TilePos,
    /// Spawn tile; random-radius wander is centred here
    pub home: TilePos,
    pub facing: Direction,
    pub config: GuardConfig,
    pub state: GuardRuntimeState,
}

impl Guard {
    pub fn new(id: GuardId, position: TilePos, config: GuardConfig, now: Tick) -> Self {
        let state = GuardRuntimeState::on_definition_changed(&config, now);
        Self {
            id,
            position,
            home: position,
            facing: Direction::Down,
            config,
            state,
        }
    }

    /// Replace the definition and start over from a fresh runtime state
    pub fn redefine(&mut self, config: GuardConfig, now: Tick) {
        self.state = GuardRuntimeState::on_definition_changed(&config, now);
        self.config = config;
    }

    pub fn name(&self) -> &str {
        &self.config.authority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redefine_resets_state() {
        let mut guard = Guard::new(GuardId(3), TilePos::new(4, 4), GuardConfig::new("TownGuards"), 0);
        guard.state.suspicion = 50.0;
        guard.state.enter(AlertState::Chase, 10);

        guard.redefine(GuardConfig::new("Harbor"), 200);
        assert_eq!(guard.state.suspicion, 0.0);
        assert_eq!(guard.state.alert_state, AlertState::Patrol);
        assert_eq!(guard.name(), "Harbor");
        assert_eq!(guard.home, TilePos::new(4, 4));
    }
}
