//! Suspicion accumulator
//!
//! Integrates detections into a bounded scalar and reports threshold
//! crossings. The caller owns what happens after a crossing.

use crate::core::types::Tick;
use crate::guard::config::AlertConfig;
use crate::guard::runtime::GuardRuntimeState;
use crate::guard::sensing::DetectionResult;

pub const SUSPICION_MIN: f32 = 0.0;
pub const SUSPICION_MAX: f32 = 100.0;

/// Base gain for a hard-cone sighting
pub const HARD_CONE_GAIN: f32 = 2.5;
/// Base gain for anything else (soft cone, hearing)
pub const SOFT_GAIN: f32 = 1.2;
/// Distances below this are treated as this
pub const MIN_GAIN_DISTANCE: f32 = 0.25;

/// Multiplier derived from the target's wanted level
///
/// Not wanted: 0.4. Wanted: 1 + wanted/50, capped at 3.
pub fn wanted_multiplier(wanted_level: i32) -> f32 {
    if wanted_level > 0 {
        1.0 + (wanted_level as f32 / 50.0).min(2.0)
    } else {
        0.4
    }
}

/// Suspicion gained from one positive detection
pub fn detection_gain(in_hard_cone: bool, distance: f32, wanted_level: i32, gain_multiplier: f32) -> f32 {
    let base = if in_hard_cone { HARD_CONE_GAIN } else { SOFT_GAIN };
    base * wanted_multiplier(wanted_level) * gain_multiplier / distance.max(MIN_GAIN_DISTANCE)
}

/// Threshold crossings raised by one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossings {
    /// Warn threshold crossed for the first time since the last reset
    pub warn: bool,
    /// Suspicion at or above the detain threshold
    pub detain: bool,
}

/// Fold one sensing result into the guard's suspicion
///
/// `dt` is the number of ticks this evaluation covers; it feeds the
/// continuous-detection dwell.
pub fn update_suspicion(
    state: &mut GuardRuntimeState,
    alert: &AlertConfig,
    detection: &DetectionResult,
    wanted_level: i32,
    gain_multiplier: f32,
    decay: f32,
    now: Tick,
    dt: Tick,
) -> Crossings {
    if detection.detected() {
        let gain = detection_gain(
            detection.in_hard_cone,
            detection.distance,
            wanted_level,
            gain_multiplier,
        );
        state.suspicion = (state.suspicion + gain).clamp(SUSPICION_MIN, SUSPICION_MAX);
        state.last_detection_tick = Some(now);
        state.seen_duration_ticks += dt;
        state.last_in_hard_cone = detection.saw_by_sight && detection.in_hard_cone;
    } else {
        state.suspicion = (state.suspicion - decay).clamp(SUSPICION_MIN, SUSPICION_MAX);
        state.seen_duration_ticks = 0;
        state.last_in_hard_cone = false;
    }

    let mut crossings = Crossings::default();

    if !state.warned && state.suspicion >= alert.warn_threshold {
        state.warned = true;
        crossings.warn = true;
    }

    if alert.reset_warn_on_lost && state.lost(now, alert.lose_sight_ticks) {
        state.warned = false;
    }

    crossings.detain = crossed_detain(state, alert);
    crossings
}

pub fn crossed_warn(state: &GuardRuntimeState) -> bool {
    state.warned
}

pub fn crossed_detain(state: &GuardRuntimeState, alert: &AlertConfig) -> bool {
    state.suspicion >= alert.detain_threshold
}

/// Zero suspicion and the warn latch (used on detain and friendly exemption)
pub fn reset_suspicion(state: &mut GuardRuntimeState) {
    state.suspicion = 0.0;
    state.warned = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::config::GuardConfig;

    fn fresh() -> (GuardRuntimeState, AlertConfig) {
        let config = GuardConfig::new("TownGuards");
        (
            GuardRuntimeState::on_definition_changed(&config, 0),
            config.alert.clone(),
        )
    }

    fn seen(distance: f32, hard: bool) -> DetectionResult {
        DetectionResult {
            saw_by_sight: true,
            heard_by_sound: false,
            in_hard_cone: hard,
            distance,
        }
    }

    #[test]
    fn test_wanted_multiplier() {
        assert_eq!(wanted_multiplier(0), 0.4);
        assert_eq!(wanted_multiplier(-5), 0.4);
        assert_eq!(wanted_multiplier(25), 1.5);
        assert_eq!(wanted_multiplier(100), 3.0);
        assert_eq!(wanted_multiplier(500), 3.0);
    }

    #[test]
    fn test_gain_formula() {
        assert_eq!(detection_gain(true, 3.0, 100, 1.0), 2.5);
        assert!((detection_gain(false, 1.0, 0, 1.0) - 0.48).abs() < 1e-6);
        // Distance floor
        assert_eq!(detection_gain(true, 0.0, 100, 1.0), 2.5 * 3.0 / 0.25);
    }

    #[test]
    fn test_clamped_to_max() {
        let (mut state, alert) = fresh();
        for tick in 0..50 {
            update_suspicion(&mut state, &alert, &seen(0.0, true), 100, 1.0, 1.5, tick, 1);
            assert!(state.suspicion <= SUSPICION_MAX);
        }
        assert_eq!(state.suspicion, SUSPICION_MAX);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let (mut state, alert) = fresh();
        state.suspicion = 1.0;
        update_suspicion(&mut state, &alert, &DetectionResult::default(), 0, 1.0, 1.5, 1, 1);
        assert_eq!(state.suspicion, 0.0);
    }

    #[test]
    fn test_warn_fires_once() {
        let (mut state, alert) = fresh();
        state.suspicion = 24.0;
        let first = update_suspicion(&mut state, &alert, &seen(1.0, true), 0, 1.0, 1.5, 10, 6);
        assert!(first.warn);
        let second = update_suspicion(&mut state, &alert, &seen(1.0, true), 0, 1.0, 1.5, 16, 6);
        assert!(!second.warn);
        assert!(crossed_warn(&state));
    }

    #[test]
    fn test_seen_duration_resets_without_detection() {
        let (mut state, alert) = fresh();
        update_suspicion(&mut state, &alert, &seen(2.0, true), 10, 1.0, 1.5, 6, 6);
        update_suspicion(&mut state, &alert, &seen(2.0, true), 10, 1.0, 1.5, 12, 6);
        assert_eq!(state.seen_duration_ticks, 12);
        update_suspicion(&mut state, &alert, &DetectionResult::default(), 10, 1.0, 1.5, 18, 6);
        assert_eq!(state.seen_duration_ticks, 0);
    }

    #[test]
    fn test_detain_crossing() {
        let (mut state, alert) = fresh();
        state.suspicion = 74.0;
        let c = update_suspicion(&mut state, &alert, &seen(1.0, true), 100, 1.0, 1.5, 1, 1);
        assert!(c.detain);
        reset_suspicion(&mut state);
        assert!(!crossed_detain(&state, &alert));
        assert!(!state.warned);
    }
}
