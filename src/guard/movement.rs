//! Tile stepping, chase pursuit and speed ramping
//!
//! Movement is axis-aligned: step along the axis with the larger delta,
//! fall back to the other axis when blocked. There is no pathfinding.

use crate::core::types::{Direction, Tick, TilePos};
use crate::guard::collaborators::WorldQuery;
use crate::guard::geometry::step_directions;
use crate::guard::runtime::GuardRuntimeState;
use crate::guard::Guard;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 6;
pub const MAX_FREQUENCY: u8 = 5;

/// Ticks one tile step takes at `speed` (speed 4 = 16 ticks)
pub fn ticks_per_step(speed: u8) -> Tick {
    256 >> speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Idle gap after each step for a move frequency (5 = no gap)
pub fn frequency_gap(frequency: u8) -> Tick {
    (MAX_FREQUENCY - frequency.clamp(1, MAX_FREQUENCY)) as Tick * 8
}

/// Is a previous step still animating?
pub fn is_moving(state: &GuardRuntimeState, now: Tick) -> bool {
    now < state.moving_until
}

/// Move `current_speed` one unit toward the speed the alert state wants
///
/// Runs every tick. With `ramp_ticks == 0` the speed snaps.
pub fn update_speed_ramp(guard: &mut Guard) {
    let movement = &guard.config.movement;
    let wanted = if guard.state.is_chasing() {
        movement.chase_speed
    } else {
        movement.patrol_speed
    }
    .clamp(MIN_SPEED, MAX_SPEED);

    let state = &mut guard.state;
    state.target_speed = wanted;

    if movement.ramp_ticks == 0 {
        state.current_speed = wanted;
        return;
    }
    if state.current_speed == wanted {
        return;
    }

    state.ramp_counter = state.ramp_counter.saturating_sub(1);
    if state.ramp_counter == 0 {
        let delta = (wanted as i32 - state.current_speed as i32).unsigned_abs().max(1) as Tick;
        state.ramp_counter = (movement.ramp_ticks / delta).max(1);
        if wanted > state.current_speed {
            state.current_speed += 1;
        } else {
            state.current_speed -= 1;
        }
    }
}

/// Attempt one step in `dir`
///
/// The guard turns to face `dir` even when the step is blocked. The
/// target's own tile counts as occupied.
pub fn try_step(guard: &mut Guard, dir: Direction, world: &impl WorldQuery) -> bool {
    guard.facing = dir;
    let dest = guard.position.step(dir);
    let passable = world.is_passable(guard.position, dir)
        && world.is_passable(dest, dir.reverse())
        && !world.is_occupied_by_target(dest);
    if passable {
        guard.position = dest;
    }
    passable
}

/// One step toward `target`, larger axis first
///
/// Returns true when the guard actually moved.
pub fn step_toward(guard: &mut Guard, target: TilePos, world: &impl WorldQuery) -> bool {
    let (primary, secondary) = step_directions(guard.position, target);
    let Some(primary) = primary else {
        return false;
    };
    if try_step(guard, primary, world) {
        return true;
    }
    match secondary {
        Some(secondary) if try_step(guard, secondary, world) => true,
        _ => {
            // Keep facing the preferred direction when fully blocked
            guard.facing = primary;
            false
        }
    }
}

/// Mark the guard busy for the duration of one step plus the frequency gap
pub fn begin_step(guard: &mut Guard, now: Tick) {
    let movement = &guard.config.movement;
    let frequency = if guard.state.is_chasing() && movement.use_chase_frequency {
        movement.chase_frequency
    } else {
        movement.patrol_frequency
    };
    guard.state.moving_until =
        now + ticks_per_step(guard.state.current_speed) + frequency_gap(frequency);
}

/// Step straight at the target's current tile
pub fn chase_step(guard: &mut Guard, world: &impl WorldQuery, now: Tick) {
    if is_moving(&guard.state, now) {
        return;
    }
    let target = world.target().position;
    if step_toward(guard, target, world) {
        begin_step(guard, now);
    }
}
