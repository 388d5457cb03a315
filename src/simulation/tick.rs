//! Tick system - runs every guard's pipeline once per simulation tick
//!
//! Per guard, in order:
//! speed ramp -> enable gates -> friendly exemption -> cooldown gate ->
//! safe zones -> (scan ticks only) sense -> accumulate -> auto-detain ->
//! Patrol/Chase switch -> detain -> movement
//!
//! Guards are processed sequentially and share only read-only map state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{GuardId, Tick};
use crate::guard::alert::{
    apply_friendly_exemption, auto_detain_fires, auto_detain_overrides_friendly, enter_cooldown,
    friendly_status, hold_cooldown, trigger_holds, update_alert_state,
};
use crate::guard::collaborators::{GuardEffects, WorldQuery};
use crate::guard::escalation::{friendly_notice, on_detain, on_warn};
use crate::guard::movement::{chase_step, update_speed_ramp};
use crate::guard::patrol::roam;
use crate::guard::runtime::AlertState;
use crate::guard::sensing::{effective_vision, sense};
use crate::guard::suspicion::update_suspicion;
use crate::guard::Guard;
use crate::simulation::world::{GuardWorld, MapState};

/// Why a guard detained the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetainCause {
    /// Suspicion reached the detain threshold
    Suspicion,
    /// Wanted level reached the auto-detain threshold
    Wanted,
}

/// Events generated during a guard tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GuardEvent {
    StateChanged {
        guard: GuardId,
        tick: Tick,
        from: AlertState,
        to: AlertState,
    },
    Warned {
        guard: GuardId,
        tick: Tick,
        suspicion: f32,
    },
    Detained {
        guard: GuardId,
        tick: Tick,
        cause: DetainCause,
    },
    /// Sensing suppressed for a friendly target
    FriendlyIgnored {
        guard: GuardId,
        tick: Tick,
        reputation: i32,
    },
}

/// Advance every guard by one tick, then advance the world clock
pub fn run_guard_tick(
    world: &mut GuardWorld,
    sim: &SimulationConfig,
    effects: &mut impl GuardEffects,
) -> Vec<GuardEvent> {
    let mut events = Vec::new();
    let now = world.current_tick;

    let GuardWorld {
        map, guards, rng, ..
    } = world;
    for guard in guards.iter_mut() {
        update_guard(guard, map, rng, sim, effects, now, &mut events);
    }

    world.last_overlay = if sim.debug_overlay {
        Some(world.render_overlay(sim))
    } else {
        None
    };

    world.tick();
    events
}

fn update_guard(
    guard: &mut Guard,
    map: &MapState,
    rng: &mut impl Rng,
    sim: &SimulationConfig,
    effects: &mut impl GuardEffects,
    now: Tick,
    events: &mut Vec<GuardEvent>,
) {
    update_speed_ramp(guard);

    if !sim.enabled || !guard.state.active {
        return;
    }

    // Friendly targets are ignored every tick, but the guard keeps walking
    let friendly = friendly_status(&guard.config, sim, map);
    if friendly.exempt && !auto_detain_overrides_friendly(&guard.config, friendly.wanted) {
        let from = guard.state.alert_state;
        apply_friendly_exemption(&mut guard.state, now);
        push_transition(events, guard, from, now);
        events.push(GuardEvent::FriendlyIgnored {
            guard: guard.id,
            tick: now,
            reputation: friendly.reputation,
        });
        roam(guard, map, rng, now);
        friendly_notice(guard, sim, friendly.reputation, effects, now);
        return;
    }

    let from = guard.state.alert_state;
    let inert = hold_cooldown(&mut guard.state, now);
    push_transition(events, guard, from, now);
    if inert {
        return;
    }

    if target_in_safe_zone(guard, map, sim) {
        return;
    }

    if now % sim.scan_interval() == 0 && scan(guard, map, sim, effects, now, events) {
        return;
    }

    if guard.state.is_chasing() {
        chase_step(guard, map, now);
    } else {
        roam(guard, map, rng, now);
    }
}

/// Global safe flag, or the target stands in a safe region
///
/// A guard's own region list replaces the global one.
fn target_in_safe_zone(guard: &Guard, map: &MapState, sim: &SimulationConfig) -> bool {
    if sim.safe {
        return true;
    }
    let region = map.region_id(map.target().position);
    if region == 0 {
        return false;
    }
    let regions = if guard.config.safe_regions.is_empty() {
        &sim.safe_regions
    } else {
        &guard.config.safe_regions
    };
    regions.contains(&region)
}

/// Full sensing pass; returns true when the guard detained
fn scan(
    guard: &mut Guard,
    map: &MapState,
    sim: &SimulationConfig,
    effects: &mut impl GuardEffects,
    now: Tick,
    events: &mut Vec<GuardEvent>,
) -> bool {
    let vision = effective_vision(&guard.config, map, sim);
    let detection = sense(guard.position, guard.facing, &guard.config, &vision, map);
    let wanted = map.wanted_or_zero(&guard.config.authority, guard.config.scope);

    let crossings = update_suspicion(
        &mut guard.state,
        &guard.config.alert,
        &detection,
        wanted,
        vision.gain_multiplier,
        sim.decay_per_scan,
        now,
        sim.scan_interval(),
    );

    if crossings.warn {
        events.push(GuardEvent::Warned {
            guard: guard.id,
            tick: now,
            suspicion: guard.state.suspicion,
        });
        on_warn(guard, sim, wanted, effects, now);
    }

    if auto_detain_fires(&guard.config, sim, map, &guard.state, now) {
        detain(guard, sim, wanted, DetainCause::Wanted, effects, now, events);
        return true;
    }

    let alert = &guard.config.alert;
    let trigger = trigger_holds(alert.trigger_mode, &guard.state, alert, now);
    let from = guard.state.alert_state;
    if update_alert_state(&mut guard.state, alert, trigger, now).is_some() {
        push_transition(events, guard, from, now);
    }

    if crossings.detain {
        detain(guard, sim, wanted, DetainCause::Suspicion, effects, now, events);
        return true;
    }

    false
}

fn detain(
    guard: &mut Guard,
    sim: &SimulationConfig,
    wanted: i32,
    cause: DetainCause,
    effects: &mut impl GuardEffects,
    now: Tick,
    events: &mut Vec<GuardEvent>,
) {
    let from = guard.state.alert_state;
    enter_cooldown(&mut guard.state, &guard.config.alert, now);
    push_transition(events, guard, from, now);
    events.push(GuardEvent::Detained {
        guard: guard.id,
        tick: now,
        cause,
    });
    on_detain(guard, sim, wanted, effects, now);
}

fn push_transition(events: &mut Vec<GuardEvent>, guard: &Guard, from: AlertState, now: Tick) {
    if guard.state.alert_state != from {
        events.push(GuardEvent::StateChanged {
            guard: guard.id,
            tick: now,
            from,
            to: guard.state.alert_state,
        });
    }
}
