//! Simulation configuration with documented constants
//!
//! Global knobs shared by every guard. Per-guard tuning lives in
//! `guard::config::GuardConfig`; this struct only carries what the host
//! toggles map-wide. It is passed by reference into the tick function.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionId, GuardId, RegionId, SignalId, Tick};

/// Convert a duration in seconds to whole ticks (floored)
pub fn secs_to_ticks(secs: f32, ticks_per_second: u32) -> Tick {
    if secs <= 0.0 {
        return 0;
    }
    (secs * ticks_per_second as f32).floor() as Tick
}

/// Configuration for the guard simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === CORE ===
    /// Master switch for every guard's sensing pipeline
    ///
    /// Speed ramps keep running while disabled so guards settle to their
    /// patrol speed.
    pub enabled: bool,

    /// Ticks per simulated second (host frame rate)
    pub ticks_per_second: u32,

    /// Full sense/accumulate/transition pass runs only every N ticks
    ///
    /// Movement stepping is not throttled by this; it has its own cadence
    /// driven by move speed.
    pub scan_interval: Tick,

    /// Suspicion removed on each scan without detection
    pub decay_per_scan: f32,

    /// Draw vision cones in the debug overlay
    pub debug_overlay: bool,

    // === FRIENDLY EXEMPTION ===
    /// Guards ignore a target whose reputation meets the threshold
    pub ignore_if_friendly: bool,

    /// Minimum reputation (with the guard's authority) for the exemption
    pub friendly_rep_threshold: i32,

    /// Exemption applies even when the target is wanted
    ///
    /// When false, the exemption only applies with a wanted level <= 0.
    pub friendly_overrides_wanted: bool,

    /// Emit a throttled notification while a guard ignores a friend
    pub friendly_notice: bool,

    /// Minimum ticks between friendly notices from the same guard
    pub friendly_notice_cooldown: Tick,

    // === ESCALATION ===
    /// Animation cue requested on warn
    pub warn_signal: SignalId,

    /// Animation cue requested on detain
    pub detain_signal: SignalId,

    /// Global follow-up on warn (0 = none); a guard override wins
    pub warn_action: ActionId,

    /// Global follow-up on detain (0 = none); a guard override wins
    pub detain_action: ActionId,

    /// Global report/whistle follow-up on warn (0 = none)
    pub report_action: ActionId,

    /// Minimum ticks between two report follow-ups from the same guard
    pub report_cooldown: Tick,

    /// Suppress every notification
    pub mute_notifications: bool,

    // === STEALTH STATUS ===
    /// Fractional range change while the target has the stealth status
    ///
    /// -0.25 shrinks a 6 tile range by round(1.5) = 2 tiles.
    pub stealth_range_pct: f32,

    /// FOV change in degrees while the target has the stealth status
    pub stealth_fov_deg: f32,

    /// Fractional change applied to wanted-derived suspicion gain
    pub stealth_wanted_pct: f32,

    // === SAFE ZONES ===
    /// Map-wide safe flag: no guard reacts while set
    pub safe: bool,

    /// Regions where guards without their own list ignore the target
    pub safe_regions: Vec<RegionId>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ticks_per_second: 60,
            scan_interval: 6,
            decay_per_scan: 1.5,
            debug_overlay: false,

            ignore_if_friendly: true,
            friendly_rep_threshold: 50,
            friendly_overrides_wanted: false,
            friendly_notice: false,
            friendly_notice_cooldown: 120,

            warn_signal: 1,
            detain_signal: 2,
            warn_action: 0,
            detain_action: 0,
            report_action: 0,
            report_cooldown: 300,
            mute_notifications: false,

            stealth_range_pct: -0.25,
            stealth_fov_deg: -30.0,
            stealth_wanted_pct: -0.25,

            safe: false,
            safe_regions: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.ticks_per_second == 0 {
            return Err("ticks_per_second must be positive".into());
        }

        if self.scan_interval == 0 {
            return Err("scan_interval must be at least 1 tick".into());
        }

        if self.decay_per_scan < 0.0 {
            return Err(format!(
                "decay_per_scan ({}) must not be negative",
                self.decay_per_scan
            ));
        }

        if self.stealth_range_pct < -1.0 {
            return Err(format!(
                "stealth_range_pct ({}) would invert vision range",
                self.stealth_range_pct
            ));
        }

        Ok(())
    }

    /// Effective scan interval (never zero)
    pub fn scan_interval(&self) -> Tick {
        self.scan_interval.max(1)
    }

    /// Apply a host command that targets global state
    ///
    /// Returns false for guard-scoped commands, which the world handles.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::EnableAi => self.enabled = true,
            Command::DisableAi => self.enabled = false,
            Command::ToggleAi => self.enabled = !self.enabled,
            Command::SetDebugVision(on) => self.debug_overlay = *on,
            Command::StartGuard(_)
            | Command::StopGuard(_)
            | Command::StartPatrol(_)
            | Command::StopPatrol(_) => return false,
        }
        true
    }
}

/// Host-issued plugin commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    EnableAi,
    DisableAi,
    ToggleAi,
    SetDebugVision(bool),
    StartGuard(GuardId),
    StopGuard(GuardId),
    StartPatrol(GuardId),
    StopPatrol(GuardId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_scan_interval_rejected() {
        let config = SimulationConfig {
            scan_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.scan_interval(), 1);
    }

    #[test]
    fn test_secs_to_ticks_floors() {
        assert_eq!(secs_to_ticks(0.8, 60), 48);
        assert_eq!(secs_to_ticks(0.6, 60), 36);
        assert_eq!(secs_to_ticks(3.0, 60), 180);
        assert_eq!(secs_to_ticks(-1.0, 60), 0);
    }

    #[test]
    fn test_toggle_commands() {
        let mut config = SimulationConfig::default();
        assert!(config.apply(&Command::ToggleAi));
        assert!(!config.enabled);
        assert!(config.apply(&Command::EnableAi));
        assert!(config.enabled);
        assert!(config.apply(&Command::SetDebugVision(true)));
        assert!(config.debug_overlay);
        assert!(!config.apply(&Command::StopGuard(GuardId(3))));
    }
}
