//! Mutable per-guard state

use serde::{Deserialize, Serialize};

use crate::core::types::{Tick, TilePos};
use crate::guard::config::{GuardConfig, PatrolSpec};

/// Behavioral state of a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertState {
    #[default]
    Patrol,
    Chase,
    /// Inert after a detain until `cooldown_until`
    Cooldown,
}

/// Runtime bookkeeping for the active patrol plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRuntime {
    /// Current waypoint index (fixed routes)
    pub index: usize,
    /// Ping-pong heading toward the last waypoint
    pub forward: bool,
    /// Chosen random wander target
    pub target: Option<TilePos>,
    /// Steps blocked until this tick
    pub wait_until: Tick,
}

/// Runtime bookkeeping for idle scanning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdleRuntime {
    pub index: usize,
    pub next_turn: Tick,
}

/// Mutable state owned by exactly one guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardRuntimeState {
    /// Accumulated suspicion in [0, 100]
    pub suspicion: f32,
    pub alert_state: AlertState,
    /// Warn threshold crossed since the last reset
    pub warned: bool,
    pub last_detection_tick: Option<Tick>,
    /// Consecutive ticks of detection
    pub seen_duration_ticks: Tick,
    /// Last detection was inside the hard cone
    pub last_in_hard_cone: bool,
    /// When the current alert state was entered
    pub state_entered_tick: Tick,
    pub cooldown_until_tick: Tick,

    pub current_speed: u8,
    pub target_speed: u8,
    pub ramp_counter: Tick,

    /// Busy with a step animation until this tick
    pub moving_until: Tick,
    pub patrol: PatrolRuntime,
    pub idle: IdleRuntime,
    /// Patrol plan enabled (host can pause it)
    pub patrol_active: bool,
    /// Guard enabled (host can stop it)
    pub active: bool,

    /// Next report follow-up allowed from this tick
    pub report_until: Tick,
    pub last_friendly_notice: Option<Tick>,
}

impl GuardRuntimeState {
    /// Fresh state for a (re)loaded guard definition
    ///
    /// Nothing carries over from a previous definition: suspicion, alert
    /// state and patrol progress all start over. An invalid definition
    /// produces an inactive guard.
    pub fn on_definition_changed(config: &GuardConfig, now: Tick) -> Self {
        let valid = match config.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("guard for '{}' disabled: {}", config.authority, e);
                false
            }
        };

        let speed = config.movement.patrol_speed.clamp(1, 6);

        Self {
            suspicion: 0.0,
            alert_state: AlertState::Patrol,
            warned: false,
            last_detection_tick: None,
            seen_duration_ticks: 0,
            last_in_hard_cone: false,
            state_entered_tick: now,
            cooldown_until_tick: 0,
            current_speed: speed,
            target_speed: speed,
            ramp_counter: 0,
            moving_until: now,
            patrol: PatrolRuntime {
                forward: true,
                ..Default::default()
            },
            idle: IdleRuntime::default(),
            patrol_active: valid && !matches!(config.patrol, PatrolSpec::None),
            active: valid && config.active,
            report_until: 0,
            last_friendly_notice: None,
        }
    }

    pub fn is_chasing(&self) -> bool {
        self.alert_state == AlertState::Chase
    }

    /// Switch state, stamping the entry tick
    pub fn enter(&mut self, state: AlertState, now: Tick) {
        if self.alert_state != state {
            tracing::debug!("alert state {:?} -> {:?} at tick {}", self.alert_state, state, now);
            self.alert_state = state;
            self.state_entered_tick = now;
        }
    }

    /// Ticks spent in the current state
    pub fn time_in_state(&self, now: Tick) -> Tick {
        now.saturating_sub(self.state_entered_tick)
    }

    /// Detection absent for strictly longer than `lose_sight_ticks`
    pub fn lost(&self, now: Tick, lose_sight_ticks: Tick) -> bool {
        match self.last_detection_tick {
            None => true,
            Some(last) => now.saturating_sub(last) > lose_sight_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let config = GuardConfig::new("TownGuards");
        let state = GuardRuntimeState::on_definition_changed(&config, 10);
        assert_eq!(state.suspicion, 0.0);
        assert_eq!(state.alert_state, AlertState::Patrol);
        assert_eq!(state.state_entered_tick, 10);
        assert_eq!(state.current_speed, 4);
        assert!(state.active);
        assert!(!state.patrol_active);
    }

    #[test]
    fn test_invalid_definition_is_inactive() {
        let mut config = GuardConfig::new("TownGuards");
        config.patrol = PatrolSpec::Fixed {
            points: vec![],
            looping: false,
            wait: 0,
        };
        let state = GuardRuntimeState::on_definition_changed(&config, 0);
        assert!(!state.active);
        assert!(!state.patrol_active);
    }

    #[test]
    fn test_reload_discards_progress() {
        let config = GuardConfig::new("TownGuards");
        let mut state = GuardRuntimeState::on_definition_changed(&config, 0);
        state.suspicion = 60.0;
        state.enter(AlertState::Chase, 5);

        let reloaded = GuardRuntimeState::on_definition_changed(&config, 100);
        assert_eq!(reloaded.suspicion, 0.0);
        assert_eq!(reloaded.alert_state, AlertState::Patrol);
    }

    #[test]
    fn test_lost_is_strict() {
        let config = GuardConfig::new("TownGuards");
        let mut state = GuardRuntimeState::on_definition_changed(&config, 0);
        assert!(state.lost(0, 180));
        state.last_detection_tick = Some(100);
        assert!(!state.lost(280, 180));
        assert!(state.lost(281, 180));
    }
}
