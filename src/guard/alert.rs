//! Alert state machine
//!
//! Patrol <-> Chase with minimum hold times, and an unconditional jump to
//! Cooldown on detain. Cooldown releases back to Patrol on its own.
//!
//! Trigger modes:
//! - `warn`: warned and the target is not lost
//! - `see`: continuous detection for at least `required_see_ticks`
//! - `hard`: as `see`, and the latest sighting was inside the hard cone

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::guard::collaborators::WorldQuery;
use crate::guard::config::{AlertConfig, GuardConfig, TriggerMode};
use crate::guard::runtime::{AlertState, GuardRuntimeState};
use crate::guard::suspicion::reset_suspicion;

/// Does the trigger condition for `mode` currently hold?
pub fn trigger_holds(mode: TriggerMode, state: &GuardRuntimeState, alert: &AlertConfig, now: Tick) -> bool {
    let dwell = state.seen_duration_ticks >= alert.required_see_ticks;
    match mode {
        TriggerMode::Warn => state.warned && !state.lost(now, alert.lose_sight_ticks),
        TriggerMode::See => dwell,
        TriggerMode::Hard => dwell && state.last_in_hard_cone,
    }
}

/// Outcome of the friendly check for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendlyStatus {
    pub reputation: i32,
    pub wanted: i32,
    pub exempt: bool,
}

/// Evaluate the friendly exemption for a guard
///
/// Exempt when reputation meets the threshold and either the global
/// override is set or the target is not wanted.
pub fn friendly_status(config: &GuardConfig, sim: &SimulationConfig, world: &impl WorldQuery) -> FriendlyStatus {
    let reputation = world.reputation_or_zero(&config.authority, &config.rep_type);
    let wanted = world.wanted_or_zero(&config.authority, config.scope);
    let exempt = sim.ignore_if_friendly
        && reputation >= sim.friendly_rep_threshold
        && (sim.friendly_overrides_wanted || wanted <= 0);
    FriendlyStatus {
        reputation,
        wanted,
        exempt,
    }
}

/// Does the auto-detain override take precedence over the exemption?
///
/// True when the wanted level arms the override and the guard does not
/// respect friendliness; sensing then runs as for any other target.
pub fn auto_detain_overrides_friendly(config: &GuardConfig, wanted: i32) -> bool {
    wanted >= config.auto_detain.wanted_threshold && !config.auto_detain.respects_friendly
}

/// Force a friendly-exempt guard back to a calm state
pub fn apply_friendly_exemption(state: &mut GuardRuntimeState, now: Tick) {
    reset_suspicion(state);
    state.seen_duration_ticks = 0;
    if state.alert_state == AlertState::Chase {
        state.enter(AlertState::Patrol, now);
    }
}

/// Should the wanted-level override detain right now?
///
/// Bypasses suspicion entirely. The friendly exemption can only cancel it
/// when the guard is configured to respect friendliness.
pub fn auto_detain_fires(
    config: &GuardConfig,
    sim: &SimulationConfig,
    world: &impl WorldQuery,
    state: &GuardRuntimeState,
    now: Tick,
) -> bool {
    let wanted = world.wanted_or_zero(&config.authority, config.scope);
    if wanted < config.auto_detain.wanted_threshold {
        return false;
    }

    if !trigger_holds(config.auto_detain.trigger_mode, state, &config.alert, now) {
        return false;
    }

    let friendly_cancel =
        config.auto_detain.respects_friendly && friendly_status(config, sim, world).exempt;
    !friendly_cancel
}

/// Apply Patrol/Chase hysteresis for the current trigger value
///
/// Returns the new state when a transition happened.
pub fn update_alert_state(
    state: &mut GuardRuntimeState,
    alert: &AlertConfig,
    trigger: bool,
    now: Tick,
) -> Option<AlertState> {
    match state.alert_state {
        AlertState::Patrol if trigger && state.time_in_state(now) >= alert.patrol_hold_ticks => {
            state.enter(AlertState::Chase, now);
            Some(AlertState::Chase)
        }
        AlertState::Chase if !trigger && state.time_in_state(now) >= alert.chase_hold_ticks => {
            state.enter(AlertState::Patrol, now);
            Some(AlertState::Patrol)
        }
        _ => None,
    }
}

/// Unconditional jump to Cooldown after a detain
pub fn enter_cooldown(state: &mut GuardRuntimeState, alert: &AlertConfig, now: Tick) {
    reset_suspicion(state);
    state.seen_duration_ticks = 0;
    state.cooldown_until_tick = now + alert.cooldown_ticks;
    state.enter(AlertState::Cooldown, now);
}

/// Release an elapsed cooldown back to Patrol
///
/// Returns true while the guard is still inert.
pub fn hold_cooldown(state: &mut GuardRuntimeState, now: Tick) -> bool {
    if state.alert_state != AlertState::Cooldown {
        return false;
    }
    if now < state.cooldown_until_tick {
        return true;
    }
    state.enter(AlertState::Patrol, now);
    false
}
