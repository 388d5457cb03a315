//! Guard world - map, target, registries and all guard instances

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::{Command, SimulationConfig};
use crate::core::types::{Direction, GuardId, RegionId, Scope, Tick, TilePos};
use crate::guard::collaborators::{DisguiseModifiers, Target, WorldQuery};
use crate::guard::config::{GuardConfig, PatrolSpec};
use crate::guard::overlay::render_overlay;
use crate::guard::Guard;
use crate::spatial::grid::TileMap;

/// Shared read-only state every guard queries
///
/// In-memory stand-in for the host's target, passability and the
/// wanted/reputation/equipment registries.
#[derive(Debug, Clone)]
pub struct MapState {
    pub tiles: TileMap,
    pub target: Target,
    /// Target is moving fast enough to be heard
    pub dashing: bool,
    /// Target carries the designated stealth status
    pub stealth: bool,
    wanted: AHashMap<(String, Scope), i32>,
    reputation: AHashMap<(String, String), i32>,
    disguises: AHashMap<(String, Scope), Vec<DisguiseModifiers>>,
}

impl MapState {
    pub fn new(tiles: TileMap, target: Target) -> Self {
        Self {
            tiles,
            target,
            dashing: false,
            stealth: false,
            wanted: AHashMap::new(),
            reputation: AHashMap::new(),
            disguises: AHashMap::new(),
        }
    }

    /// Wall-free map with the target at the origin
    pub fn open(width: usize, height: usize) -> Self {
        Self::new(TileMap::new(width, height), Target::default())
    }

    pub fn set_wanted(&mut self, authority: &str, scope: Scope, level: i32) {
        self.wanted.insert((authority.to_string(), scope), level);
    }

    pub fn set_reputation(&mut self, authority: &str, rep_type: &str, value: i32) {
        self.reputation
            .insert((authority.to_string(), rep_type.to_string()), value);
    }

    /// Equip a disguise item that applies against `authority`/`scope`
    pub fn add_disguise(&mut self, authority: &str, scope: Scope, modifiers: DisguiseModifiers) {
        self.disguises
            .entry((authority.to_string(), scope))
            .or_default()
            .push(modifiers);
    }

    pub fn clear_disguises(&mut self) {
        self.disguises.clear();
    }

    /// Move the target one tile, turning it even when blocked
    pub fn move_target(&mut self, dir: Direction) -> bool {
        self.target.facing = dir;
        let from = self.target.position;
        let to = from.step(dir);
        let ok = self.tiles.is_passable(from, dir) && self.tiles.is_passable(to, dir.reverse());
        if ok {
            self.target.position = to;
        }
        ok
    }
}

impl WorldQuery for MapState {
    fn target(&self) -> Target {
        self.target
    }

    fn wanted_level(&self, authority: &str, scope: Scope) -> Option<i32> {
        self.wanted.get(&(authority.to_string(), scope)).copied()
    }

    fn reputation(&self, authority: &str, rep_type: &str) -> Option<i32> {
        self.reputation
            .get(&(authority.to_string(), rep_type.to_string()))
            .copied()
    }

    fn is_passable(&self, tile: TilePos, dir: Direction) -> bool {
        self.tiles.is_passable(tile, dir)
    }

    fn is_target_dashing(&self) -> bool {
        self.dashing
    }

    fn equipped_disguise_modifiers(&self, authority: &str, scope: Scope) -> DisguiseModifiers {
        self.disguises
            .get(&(authority.to_string(), scope))
            .map(|items| DisguiseModifiers::combine(items.iter().copied()))
            .unwrap_or_default()
    }

    fn has_stealth_status(&self) -> bool {
        self.stealth
    }

    fn region_id(&self, tile: TilePos) -> RegionId {
        self.tiles.region_id(tile)
    }
}

/// The complete guard simulation state
pub struct GuardWorld {
    pub current_tick: Tick,
    pub map: MapState,
    pub guards: Vec<Guard>,
    /// Seeded source for random wander
    pub rng: ChaCha8Rng,
    /// Debug vision overlay from the last tick, when enabled
    pub last_overlay: Option<String>,
    next_id: u32,
}

impl GuardWorld {
    pub fn new(map: MapState, seed: u64) -> Self {
        Self {
            current_tick: 0,
            map,
            guards: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_overlay: None,
            next_id: 1,
        }
    }

    /// Place a guard; an invalid definition yields an inactive guard
    pub fn spawn_guard(&mut self, position: TilePos, config: GuardConfig) -> GuardId {
        let id = GuardId(self.next_id);
        self.next_id += 1;
        tracing::debug!("spawn {} for '{}' at ({}, {})", id, config.authority, position.x, position.y);
        self.guards
            .push(Guard::new(id, position, config, self.current_tick));
        id
    }

    pub fn guard(&self, id: GuardId) -> Option<&Guard> {
        self.guards.iter().find(|g| g.id == id)
    }

    pub fn guard_mut(&mut self, id: GuardId) -> Option<&mut Guard> {
        self.guards.iter_mut().find(|g| g.id == id)
    }

    /// Reload a guard's definition; runtime state starts over
    pub fn redefine_guard(&mut self, id: GuardId, config: GuardConfig) -> bool {
        let now = self.current_tick;
        match self.guard_mut(id) {
            Some(guard) => {
                guard.redefine(config, now);
                true
            }
            None => false,
        }
    }

    /// Drop a guard together with its runtime state
    pub fn remove_guard(&mut self, id: GuardId) -> Option<Guard> {
        let index = self.guards.iter().position(|g| g.id == id)?;
        Some(self.guards.remove(index))
    }

    /// Apply a host command; returns false for an unknown guard id
    pub fn apply_command(&mut self, sim: &mut SimulationConfig, command: Command) -> bool {
        if sim.apply(&command) {
            tracing::debug!("applied {:?}", command);
            return true;
        }

        let id = match command {
            Command::StartGuard(id)
            | Command::StopGuard(id)
            | Command::StartPatrol(id)
            | Command::StopPatrol(id) => id,
            _ => return false,
        };

        let Some(guard) = self.guard_mut(id) else {
            tracing::warn!("{:?} names unknown {}", command, id);
            return false;
        };

        match command {
            Command::StartGuard(_) => guard.state.active = guard.config.validate().is_ok(),
            Command::StopGuard(_) => guard.state.active = false,
            Command::StartPatrol(_) => {
                guard.state.patrol_active = guard.config.patrol != PatrolSpec::None
            }
            Command::StopPatrol(_) => guard.state.patrol_active = false,
            _ => {}
        }
        tracing::debug!("applied {:?}", command);
        true
    }

    pub fn render_overlay(&self, sim: &SimulationConfig) -> String {
        render_overlay(&self.map.tiles, &self.guards, &self.map, sim)
    }

    pub fn tick(&mut self) {
        self.current_tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookups_default_to_none() {
        let map = MapState::open(4, 4);
        assert_eq!(map.wanted_level("TownGuards", Scope::Faction), None);
        assert_eq!(map.wanted_or_zero("TownGuards", Scope::Faction), 0);
        assert_eq!(map.reputation_or_zero("TownGuards", "default"), 0);
    }

    #[test]
    fn test_wanted_is_scoped() {
        let mut map = MapState::open(4, 4);
        map.set_wanted("TownGuards", Scope::Location, 30);
        assert_eq!(map.wanted_level("TownGuards", Scope::Location), Some(30));
        assert_eq!(map.wanted_level("TownGuards", Scope::Faction), None);
    }

    #[test]
    fn test_target_blocked_by_wall() {
        let mut map = MapState::new(TileMap::from_rows(&["..#", "..."]), Target::new(TilePos::new(1, 0)));
        assert!(!map.move_target(Direction::Right));
        assert_eq!(map.target.facing, Direction::Right);
        assert!(map.move_target(Direction::Down));
        assert_eq!(map.target.position, TilePos::new(1, 1));
    }

    #[test]
    fn test_guard_commands() {
        let mut world = GuardWorld::new(MapState::open(8, 8), 1);
        let mut sim = SimulationConfig::default();
        let mut config = GuardConfig::new("TownGuards");
        config.patrol = PatrolSpec::Fixed {
            points: vec![TilePos::new(1, 1), TilePos::new(5, 1)],
            looping: true,
            wait: 0,
        };
        let id = world.spawn_guard(TilePos::new(1, 1), config);

        assert!(world.apply_command(&mut sim, Command::StopPatrol(id)));
        assert!(!world.guard(id).map(|g| g.state.patrol_active).unwrap_or(true));
        assert!(world.apply_command(&mut sim, Command::StartPatrol(id)));
        assert!(world.guard(id).map(|g| g.state.patrol_active).unwrap_or(false));
        assert!(world.apply_command(&mut sim, Command::StopGuard(id)));
        assert!(!world.guard(id).map(|g| g.state.active).unwrap_or(true));
        assert!(!world.apply_command(&mut sim, Command::StartGuard(GuardId(99))));
        assert!(world.apply_command(&mut sim, Command::DisableAi));
        assert!(!sim.enabled);
    }

    #[test]
    fn test_redefine_and_remove() {
        let mut world = GuardWorld::new(MapState::open(8, 8), 1);
        let id = world.spawn_guard(TilePos::new(2, 2), GuardConfig::new("TownGuards"));
        assert!(world.redefine_guard(id, GuardConfig::new("")));
        assert!(!world.guard(id).map(|g| g.state.active).unwrap_or(true));
        assert!(world.remove_guard(id).is_some());
        assert!(world.guard(id).is_none());
    }
}
