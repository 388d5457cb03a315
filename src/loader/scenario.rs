//! TOML scenario files
//!
//! A scenario describes a map, the target and its registry entries, global
//! simulation settings and the guards to place. Loads from
//! `data/scenarios/{name}.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{GuardError, Result};
use crate::core::types::{Direction, GuardId, Scope, Tick, TilePos};
use crate::guard::collaborators::{DisguiseModifiers, Target};
use crate::guard::config::GuardConfig;
use crate::guard::geometry::step_directions;
use crate::loader::tags::parse_guard_tags;
use crate::simulation::world::{GuardWorld, MapState};
use crate::spatial::grid::TileMap;

/// Map rows: `#` wall, `.` floor, digit = floor with that region id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSection {
    pub rows: Vec<String>,
}

/// Target start state and optional scripted walk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSection {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    pub dashing: bool,
    pub stealth: bool,
    /// Waypoints the scripted target walks through, in order
    pub path: Vec<TilePos>,
    /// Ticks between target steps along `path`
    pub step_every: Tick,
    /// Restart the path from the first waypoint when done
    pub looping: bool,
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            facing: Direction::Down,
            dashing: false,
            stealth: false,
            path: Vec::new(),
            step_every: 16,
            looping: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedEntry {
    pub authority: String,
    #[serde(default)]
    pub scope: Scope,
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationEntry {
    pub authority: String,
    #[serde(default = "default_rep_type")]
    pub rep_type: String,
    pub value: i32,
}

fn default_rep_type() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisguiseEntry {
    pub authority: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(flatten)]
    pub modifiers: DisguiseModifiers,
}

/// One guard placement: either an inline config or legacy tag text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardEntry {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub facing: Direction,
    #[serde(default)]
    pub config: Option<GuardConfig>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl GuardEntry {
    fn resolve(&self, ticks_per_second: u32) -> Result<GuardConfig> {
        match (&self.config, &self.tags) {
            (Some(config), None) => Ok(config.clone()),
            (None, Some(text)) => parse_guard_tags(text, ticks_per_second)?.ok_or_else(|| {
                GuardError::InvalidScenario(format!(
                    "guard at ({}, {}) has tags but no <guard:> block",
                    self.x, self.y
                ))
            }),
            (Some(_), Some(_)) => Err(GuardError::InvalidScenario(format!(
                "guard at ({}, {}) has both config and tags",
                self.x, self.y
            ))),
            (None, None) => Err(GuardError::InvalidScenario(format!(
                "guard at ({}, {}) has neither config nor tags",
                self.x, self.y
            ))),
        }
    }
}

/// Complete scenario definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    pub map: MapSection,
    #[serde(default)]
    pub target: TargetSection,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub wanted: Vec<WantedEntry>,
    #[serde(default)]
    pub reputation: Vec<ReputationEntry>,
    #[serde(default)]
    pub disguises: Vec<DisguiseEntry>,
    #[serde(default)]
    pub guards: Vec<GuardEntry>,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario
            .simulation
            .validate()
            .map_err(GuardError::InvalidConfig)?;
        if scenario.map.rows.is_empty() {
            return Err(GuardError::InvalidScenario("map has no rows".into()));
        }
        Ok(scenario)
    }

    /// Build the world; guards are spawned in file order (ids 1, 2, ...)
    pub fn build_world(&self) -> Result<GuardWorld> {
        let tiles = TileMap::from_rows(&self.map.rows);
        let start = TilePos::new(self.target.x, self.target.y);
        if !tiles.is_open(start) {
            return Err(GuardError::InvalidScenario(format!(
                "target starts on a closed tile ({}, {})",
                start.x, start.y
            )));
        }

        let mut map = MapState::new(
            tiles,
            Target {
                position: start,
                facing: self.target.facing,
            },
        );
        map.dashing = self.target.dashing;
        map.stealth = self.target.stealth;
        for entry in &self.wanted {
            map.set_wanted(&entry.authority, entry.scope, entry.level);
        }
        for entry in &self.reputation {
            map.set_reputation(&entry.authority, &entry.rep_type, entry.value);
        }
        for entry in &self.disguises {
            map.add_disguise(&entry.authority, entry.scope, entry.modifiers);
        }

        let mut world = GuardWorld::new(map, self.seed);
        for entry in &self.guards {
            let config = match entry.resolve(self.simulation.ticks_per_second) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("guard at ({}, {}) disabled: {}", entry.x, entry.y, e);
                    let mut config = GuardConfig::new("");
                    config.active = false;
                    config
                }
            };
            let id = world.spawn_guard(TilePos::new(entry.x, entry.y), config);
            if let Some(guard) = world.guard_mut(id) {
                guard.facing = entry.facing;
            }
        }

        tracing::info!(
            "scenario '{}': {} guards on {}x{} map",
            self.name,
            world.guards.len(),
            world.map.tiles.width(),
            world.map.tiles.height()
        );
        Ok(world)
    }

    /// Scripted target driver for this scenario
    pub fn target_script(&self) -> TargetScript {
        TargetScript {
            path: self.target.path.clone(),
            step_every: self.target.step_every.max(1),
            looping: self.target.looping,
            index: 0,
        }
    }
}

/// Walks the target through a fixed list of waypoints
#[derive(Debug, Clone)]
pub struct TargetScript {
    path: Vec<TilePos>,
    step_every: Tick,
    looping: bool,
    index: usize,
}

impl TargetScript {
    pub fn is_finished(&self) -> bool {
        self.index >= self.path.len()
    }

    /// Step the target toward the current waypoint on its cadence
    pub fn advance(&mut self, map: &mut MapState, now: Tick) {
        if self.path.is_empty() || now % self.step_every != 0 {
            return;
        }
        if self.is_finished() {
            if !self.looping {
                return;
            }
            self.index = 0;
        }

        let waypoint = self.path[self.index];
        if map.target.position == waypoint {
            self.index += 1;
            return;
        }

        let (primary, secondary) = step_directions(map.target.position, waypoint);
        let moved = primary.is_some_and(|d| map.move_target(d))
            || secondary.is_some_and(|d| map.move_target(d));
        if !moved {
            tracing::debug!(
                "scripted target blocked at ({}, {})",
                map.target.position.x,
                map.target.position.y
            );
        }
    }
}

/// Path of a named scenario under `data/scenarios`
pub fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from("data/scenarios").join(format!("{}.toml", name))
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let contents = fs::read_to_string(path.as_ref())?;
    Scenario::from_toml_str(&contents)
}

/// Load `data/scenarios/{name}.toml`
pub fn load_named_scenario(name: &str) -> Result<Scenario> {
    let mut scenario = load_scenario(scenario_path(name))?;
    if scenario.name.is_empty() {
        scenario.name = name.to_string();
    }
    Ok(scenario)
}

/// First guard id a built world assigns
pub const FIRST_GUARD_ID: GuardId = GuardId(1);
