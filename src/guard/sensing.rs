//! Sensing engine - can this guard perceive the target right now?
//!
//! Pure query over positions, configuration and collaborator state. The
//! static vision config is first adjusted by equipped disguises and the
//! target's stealth status.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{Direction, TilePos};
use crate::guard::collaborators::WorldQuery;
use crate::guard::config::GuardConfig;
use crate::guard::geometry::{clear_line, euclidean, tile_within_fov, within_range};

/// Outcome of one sensing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub saw_by_sight: bool,
    pub heard_by_sound: bool,
    /// Sighting fell inside the hard cone (not merely the soft cone)
    pub in_hard_cone: bool,
    /// Euclidean distance to the target in tiles
    pub distance: f32,
}

impl DetectionResult {
    pub fn detected(&self) -> bool {
        self.saw_by_sight || self.heard_by_sound
    }
}

/// Vision parameters after disguise and stealth adjustments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveVision {
    pub range: f32,
    pub hard_fov: f32,
    pub soft_fov: f32,
    /// Multiplier applied to wanted-derived suspicion gain
    pub gain_multiplier: f32,
}

/// Apply disguise and stealth modifiers to a guard's static vision
pub fn effective_vision(
    config: &GuardConfig,
    world: &impl WorldQuery,
    sim: &SimulationConfig,
) -> EffectiveVision {
    let disguise = world.equipped_disguise_modifiers(&config.authority, config.scope);

    let mut range = config.vision.range + disguise.range_delta;
    let mut hard_fov = config.vision.hard_fov + disguise.fov_delta;
    let mut soft_fov = config.vision.soft_fov + disguise.fov_delta;
    let mut gain_multiplier = 1.0 + disguise.wanted_pct;

    if world.has_stealth_status() {
        range += (range * sim.stealth_range_pct).round();
        hard_fov += sim.stealth_fov_deg;
        soft_fov += sim.stealth_fov_deg;
        gain_multiplier *= 1.0 + sim.stealth_wanted_pct;
    }

    EffectiveVision {
        range: range.max(0.0),
        hard_fov: hard_fov.clamp(0.0, 360.0),
        soft_fov: soft_fov.clamp(0.0, 360.0),
        gain_multiplier: gain_multiplier.max(0.0),
    }
}

/// Classify whether the guard at `position` facing `facing` detects the target
pub fn sense(
    position: TilePos,
    facing: Direction,
    config: &GuardConfig,
    vision: &EffectiveVision,
    world: &impl WorldQuery,
) -> DetectionResult {
    let target = world.target().position;
    let distance = euclidean(position, target);

    let mut result = DetectionResult {
        distance,
        ..Default::default()
    };

    if within_range(position, target, vision.range) {
        let in_hard = tile_within_fov(position, facing, target, vision.hard_fov);
        let in_soft = tile_within_fov(position, facing, target, vision.soft_fov);

        if in_hard || in_soft {
            let unobstructed =
                !config.vision.occlusion || clear_line(position, target, |t| world.is_open(t));
            if unobstructed {
                result.saw_by_sight = true;
                result.in_hard_cone = in_hard;
            }
        }
    }

    if config.vision.hearing
        && world.is_target_dashing()
        && within_range(position, target, config.vision.hear_range)
    {
        result.heard_by_sound = true;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::world::MapState;

    fn open_map() -> MapState {
        MapState::open(20, 20)
    }

    #[test]
    fn test_sees_target_straight_ahead() {
        let mut map = open_map();
        map.target.position = TilePos::new(5, 8);
        let config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        let result = sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map);
        assert!(result.saw_by_sight);
        assert!(result.in_hard_cone);
        assert!((result.distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_soft_cone_only() {
        let mut map = open_map();
        // 50 degrees off axis: outside 80 (half 40), inside 120 (half 60)
        map.target.position = TilePos::new(5 + 5, 5 + 4);
        let config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        let result = sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map);
        assert!(result.saw_by_sight);
        assert!(!result.in_hard_cone);
    }

    #[test]
    fn test_behind_guard_not_seen() {
        let mut map = open_map();
        map.target.position = TilePos::new(5, 2);
        let config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        let result = sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map);
        assert!(!result.detected());
    }

    #[test]
    fn test_occlusion_blocks_sight() {
        let mut map = open_map();
        map.tiles.set_wall(TilePos::new(5, 7));
        map.target.position = TilePos::new(5, 9);
        let mut config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        assert!(sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map).saw_by_sight);
        config.vision.occlusion = true;
        assert!(!sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map).saw_by_sight);
    }

    #[test]
    fn test_hearing_needs_dash() {
        let mut map = open_map();
        map.target.position = TilePos::new(5, 3);
        let mut config = GuardConfig::new("TownGuards");
        config.vision.hearing = true;
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        let quiet = sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map);
        assert!(!quiet.detected());

        map.dashing = true;
        let loud = sense(TilePos::new(5, 5), Direction::Down, &config, &vision, &map);
        assert!(loud.heard_by_sound);
        assert!(!loud.saw_by_sight);
    }

    #[test]
    fn test_disguise_and_stealth_shrink_vision() {
        let mut map = open_map();
        map.add_disguise(
            "TownGuards",
            crate::core::types::Scope::Faction,
            crate::guard::collaborators::DisguiseModifiers {
                fov_delta: -40.0,
                range_delta: -2.0,
                wanted_pct: -0.5,
            },
        );
        map.stealth = true;
        let config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());

        // 6 - 2 = 4, then 4 + round(4 * -0.25) = 3
        assert_eq!(vision.range, 3.0);
        assert_eq!(vision.hard_fov, 80.0 - 40.0 - 30.0);
        assert_eq!(vision.soft_fov, 120.0 - 40.0 - 30.0);
        assert!((vision.gain_multiplier - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_disguise_for_other_authority_ignored() {
        let mut map = open_map();
        map.add_disguise(
            "Harbor",
            crate::core::types::Scope::Faction,
            crate::guard::collaborators::DisguiseModifiers {
                fov_delta: -40.0,
                range_delta: -2.0,
                wanted_pct: 0.0,
            },
        );
        let config = GuardConfig::new("TownGuards");
        let vision = effective_vision(&config, &map, &SimulationConfig::default());
        assert_eq!(vision.range, 6.0);
    }
}
