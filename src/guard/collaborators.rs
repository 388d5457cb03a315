//! Boundary with the host's other systems
//!
//! Guards only ever read through `WorldQuery` and only ever request side
//! effects through `GuardEffects`. Neither trait is allowed to block.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionId, Direction, GuardId, RegionId, Scope, SignalId, TilePos};

/// Aggregated disguise adjustments against one authority/scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisguiseModifiers {
    /// Added to both FOV cones (degrees)
    pub fov_delta: f32,
    /// Added to vision range (tiles)
    pub range_delta: f32,
    /// Fractional change applied to wanted-derived suspicion gain
    pub wanted_pct: f32,
}

impl DisguiseModifiers {
    /// Sum of several equipped items
    pub fn combine(items: impl IntoIterator<Item = DisguiseModifiers>) -> Self {
        items.into_iter().fold(Self::default(), |acc, m| Self {
            fov_delta: acc.fov_delta + m.fov_delta,
            range_delta: acc.range_delta + m.range_delta,
            wanted_pct: acc.wanted_pct + m.wanted_pct,
        })
    }
}

/// The single tracked target (player avatar)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub position: TilePos,
    pub facing: Direction,
}

impl Target {
    pub fn new(position: TilePos) -> Self {
        Self {
            position,
            facing: Direction::Down,
        }
    }
}

/// Read-only queries against shared state
///
/// Registry lookups return `None` when the provider has no answer; callers
/// fall back to neutral values through the provided helpers.
pub trait WorldQuery {
    fn target(&self) -> Target;

    fn wanted_level(&self, authority: &str, scope: Scope) -> Option<i32>;

    fn reputation(&self, authority: &str, rep_type: &str) -> Option<i32>;

    fn is_passable(&self, tile: TilePos, dir: Direction) -> bool;

    fn is_target_dashing(&self) -> bool;

    fn equipped_disguise_modifiers(&self, authority: &str, scope: Scope) -> DisguiseModifiers;

    fn has_stealth_status(&self) -> bool;

    fn region_id(&self, tile: TilePos) -> RegionId;

    /// Is the tile currently occupied by the target?
    fn is_occupied_by_target(&self, tile: TilePos) -> bool {
        self.target().position == tile
    }

    /// Passable in any of the four directions
    fn is_open(&self, tile: TilePos) -> bool {
        Direction::ALL.iter().any(|&d| self.is_passable(tile, d))
    }

    fn wanted_or_zero(&self, authority: &str, scope: Scope) -> i32 {
        self.wanted_level(authority, scope).unwrap_or_else(|| {
            tracing::trace!("no wanted level for {}/{}, using 0", authority, scope.as_str());
            0
        })
    }

    fn reputation_or_zero(&self, authority: &str, rep_type: &str) -> i32 {
        self.reputation(authority, rep_type).unwrap_or_else(|| {
            tracing::trace!("no reputation for {}/{}, using 0", authority, rep_type);
            0
        })
    }
}

/// A user-facing text request: template plus substitution parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub params: Vec<(String, String)>,
}

impl Notification {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Substitute every `{key}` placeholder
    pub fn render(&self) -> String {
        self.params
            .iter()
            .fold(self.template.clone(), |text, (key, value)| {
                text.replace(&format!("{{{}}}", key), value)
            })
    }
}

/// Fire-and-forget side effect requests
pub trait GuardEffects {
    fn request_visual_signal(&mut self, guard: GuardId, signal: SignalId);

    fn request_notification(&mut self, notification: Notification);

    fn reserve_follow_up_action(&mut self, action: ActionId);

    fn invoke_detain_flow(&mut self, authority: &str, scope: Scope);

    /// Start a scripted encounter; hosts without encounters ignore it
    fn request_encounter(&mut self, _troop: u32) {}
}

/// One recorded side effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    VisualSignal { guard: GuardId, signal: SignalId },
    Notification { text: String },
    FollowUpAction { action: ActionId },
    DetainFlow { authority: String, scope: Scope },
    Encounter { troop: u32 },
}

/// `GuardEffects` sink that records every request in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectLog {
    pub effects: Vec<Effect>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn detain_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::DetainFlow { .. }))
            .count()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Notification { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl GuardEffects for EffectLog {
    fn request_visual_signal(&mut self, guard: GuardId, signal: SignalId) {
        self.effects.push(Effect::VisualSignal { guard, signal });
    }

    fn request_notification(&mut self, notification: Notification) {
        self.effects.push(Effect::Notification {
            text: notification.render(),
        });
    }

    fn reserve_follow_up_action(&mut self, action: ActionId) {
        self.effects.push(Effect::FollowUpAction { action });
    }

    fn invoke_detain_flow(&mut self, authority: &str, scope: Scope) {
        self.effects.push(Effect::DetainFlow {
            authority: authority.to_string(),
            scope,
        });
    }

    fn request_encounter(&mut self, troop: u32) {
        self.effects.push(Effect::Encounter { troop });
    }
}
