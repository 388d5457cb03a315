//! Typed per-guard configuration
//!
//! Produced once by a loader (TOML or legacy tag notation). The sensing and
//! state-machine core only ever reads these values.

use serde::{Deserialize, Serialize};

use crate::core::error::{GuardError, Result};
use crate::core::types::{ActionId, RegionId, Scope, Tick, TilePos};

/// Policy deciding which detection signal escalates a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Warn threshold crossed and target not lost
    Warn,
    /// Continuous detection for the required dwell
    See,
    /// Continuous detection for the required dwell, last seen in the hard cone
    #[default]
    Hard,
}

impl std::str::FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(TriggerMode::Warn),
            "see" => Ok(TriggerMode::See),
            "hard" => Ok(TriggerMode::Hard),
            other => Err(format!("unknown trigger mode '{}'", other)),
        }
    }
}

/// Vision and hearing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Vision range in tiles
    pub range: f32,
    /// Hard cone, degrees
    pub hard_fov: f32,
    /// Soft cone, degrees (normally wider than the hard cone)
    pub soft_fov: f32,
    /// Walls block sight (stepped raycast)
    pub occlusion: bool,
    /// Hear a dashing target
    pub hearing: bool,
    /// Hearing range in tiles
    pub hear_range: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            range: 6.0,
            hard_fov: 80.0,
            soft_fov: 120.0,
            occlusion: false,
            hearing: false,
            hear_range: 4.0,
        }
    }
}

/// Movement speed and cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Patrol speed, 1..=6 (4 = normal walk)
    pub patrol_speed: u8,
    /// Chase speed, 1..=6
    pub chase_speed: u8,
    /// Patrol move frequency, 1..=5
    pub patrol_frequency: u8,
    /// Chase move frequency, 1..=5
    pub chase_frequency: u8,
    /// Use `chase_frequency` while chasing
    pub use_chase_frequency: bool,
    /// Ticks to ramp between patrol and chase speed (0 = snap)
    pub ramp_ticks: Tick,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 4,
            chase_speed: 5,
            patrol_frequency: 4,
            chase_frequency: 5,
            use_chase_frequency: false,
            ramp_ticks: 12,
        }
    }
}

/// Suspicion thresholds and the escalation trigger policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub warn_threshold: f32,
    pub detain_threshold: f32,
    pub trigger_mode: TriggerMode,
    /// Continuous detection required before `see`/`hard` triggers hold
    pub required_see_ticks: Tick,
    /// Clear `warned` once the target has been lost
    pub reset_warn_on_lost: bool,
    /// Detection absent for strictly longer than this means lost
    pub lose_sight_ticks: Tick,
    /// Minimum time in Patrol before Chase is allowed
    pub patrol_hold_ticks: Tick,
    /// Minimum time in Chase before returning to Patrol
    pub chase_hold_ticks: Tick,
    /// Inert window after a detain
    pub cooldown_ticks: Tick,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            warn_threshold: 25.0,
            detain_threshold: 75.0,
            trigger_mode: TriggerMode::Hard,
            required_see_ticks: 30,
            reset_warn_on_lost: true,
            lose_sight_ticks: 180,
            patrol_hold_ticks: 36,
            chase_hold_ticks: 48,
            cooldown_ticks: 120,
        }
    }
}

/// Detain directly on a high wanted level, bypassing suspicion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDetainConfig {
    pub wanted_threshold: i32,
    pub trigger_mode: TriggerMode,
    /// Let the friendly exemption cancel an auto-detain
    pub respects_friendly: bool,
}

impl Default for AutoDetainConfig {
    fn default() -> Self {
        Self {
            wanted_threshold: 50,
            trigger_mode: TriggerMode::See,
            respects_friendly: false,
        }
    }
}

/// Per-guard follow-up overrides and texts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub on_warn: Option<ActionId>,
    pub on_detain: Option<ActionId>,
    pub report: Option<ActionId>,
    /// Template with `{name}` and `{wanted}`
    pub warn_text: Option<String>,
    /// Template with `{name}` and `{wanted}`
    pub detain_text: Option<String>,
    /// Hand off to the detain flow on detain
    pub open_detain_flow: bool,
    /// Request an encounter when wanted reaches `hunt_threshold`
    pub allow_encounter: bool,
    pub hunt_threshold: i32,
    pub encounter_troop: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            on_warn: None,
            on_detain: None,
            report: None,
            warn_text: None,
            detain_text: None,
            open_detain_flow: true,
            allow_encounter: false,
            hunt_threshold: 150,
            encounter_troop: 1,
        }
    }
}

/// Rectangle in tile coordinates (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TileRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Same rectangle with corners ordered min..max
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn contains(&self, p: TilePos) -> bool {
        let r = self.normalized();
        p.x >= r.x1 && p.x <= r.x2 && p.y >= r.y1 && p.y <= r.y2
    }
}

/// Inclusive wait range in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaitRange {
    pub min: Tick,
    pub max: Tick,
}

impl WaitRange {
    pub fn new(min: Tick, max: Tick) -> Self {
        Self { min, max }
    }

    pub fn fixed(ticks: Tick) -> Self {
        Self { min: ticks, max: ticks }
    }
}

/// Patrol strategy definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PatrolSpec {
    /// Waypoint route; loops or ping-pongs
    Fixed {
        points: Vec<TilePos>,
        #[serde(default)]
        looping: bool,
        #[serde(default)]
        wait: Tick,
    },
    /// Wander within `radius` tiles of the guard's home tile
    RandomRadius {
        radius: u32,
        #[serde(default)]
        wait: WaitRange,
    },
    /// Wander inside a rectangle
    RandomRect {
        rect: TileRect,
        #[serde(default)]
        wait: WaitRange,
    },
    /// Stay in place
    #[default]
    None,
}

/// Facing pattern for idle scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPattern {
    /// Left, right
    #[default]
    Lr,
    /// Left, down, right, up
    Cross,
}

/// Idle look-around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleScanSpec {
    #[serde(default)]
    pub pattern: ScanPattern,
    /// Ticks between facing changes
    #[serde(default = "default_idle_period")]
    pub period: Tick,
}

fn default_idle_period() -> Tick {
    72
}

impl Default for IdleScanSpec {
    fn default() -> Self {
        Self {
            pattern: ScanPattern::Lr,
            period: default_idle_period(),
        }
    }
}

/// Complete guard definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Authority the guard enforces for (faction or location id)
    pub authority: String,
    #[serde(default)]
    pub scope: Scope,
    /// Reputation ledger consulted for the friendly exemption
    #[serde(default = "default_rep_type")]
    pub rep_type: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub auto_detain: AutoDetainConfig,
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub patrol: PatrolSpec,
    #[serde(default)]
    pub idle: Option<IdleScanSpec>,
    /// Overrides the global safe region list when non-empty
    #[serde(default)]
    pub safe_regions: Vec<RegionId>,
}

fn default_rep_type() -> String {
    "default".to_string()
}

fn default_active() -> bool {
    true
}

impl GuardConfig {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            scope: Scope::Faction,
            rep_type: default_rep_type(),
            active: true,
            vision: VisionConfig::default(),
            movement: MovementConfig::default(),
            alert: AlertConfig::default(),
            auto_detain: AutoDetainConfig::default(),
            escalation: EscalationConfig::default(),
            patrol: PatrolSpec::None,
            idle: None,
            safe_regions: Vec::new(),
        }
    }

    /// Check required fields; an invalid guard is kept inactive
    pub fn validate(&self) -> Result<()> {
        if self.authority.trim().is_empty() {
            return Err(GuardError::MissingField("authority"));
        }

        if let PatrolSpec::Fixed { points, .. } = &self.patrol {
            if points.is_empty() {
                return Err(GuardError::InvalidConfig(
                    "fixed patrol needs at least one waypoint".into(),
                ));
            }
        }

        if self.vision.range < 0.0 {
            return Err(GuardError::InvalidConfig(format!(
                "vision range {} is negative",
                self.vision.range
            )));
        }

        if self.alert.warn_threshold > self.alert.detain_threshold {
            return Err(GuardError::InvalidConfig(format!(
                "warn threshold {} exceeds detain threshold {}",
                self.alert.warn_threshold, self.alert.detain_threshold
            )));
        }

        Ok(())
    }
}
