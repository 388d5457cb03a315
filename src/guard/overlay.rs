//! Debug vision overlay
//!
//! Renders the map as text with every guard's cones drawn in. Glyphs:
//! `#` wall, `.` floor, `*` hard cone, `+` soft cone, `@` target, and the
//! guard itself as its facing arrow.

use crate::core::config::SimulationConfig;
use crate::core::types::TilePos;
use crate::guard::collaborators::WorldQuery;
use crate::guard::geometry::{clear_line, tile_within_fov, within_range};
use crate::guard::sensing::effective_vision;
use crate::guard::Guard;
use crate::spatial::grid::{Grid, TileMap};

/// What a single overlay cell shows, lowest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OverlayCell {
    #[default]
    Floor,
    Wall,
    SoftCone,
    HardCone,
    Target,
    Guard(char),
}

impl OverlayCell {
    pub fn glyph(&self) -> char {
        match self {
            OverlayCell::Floor => '.',
            OverlayCell::Wall => '#',
            OverlayCell::SoftCone => '+',
            OverlayCell::HardCone => '*',
            OverlayCell::Target => '@',
            OverlayCell::Guard(c) => *c,
        }
    }
}

fn paint(cells: &mut Grid<OverlayCell>, pos: TilePos, cell: OverlayCell) {
    if let Some(current) = cells.get_mut(pos) {
        if cell > *current {
            *current = cell;
        }
    }
}

/// Mark one guard's cones using its effective (disguise/stealth adjusted) vision
fn paint_cones(
    cells: &mut Grid<OverlayCell>,
    tiles: &TileMap,
    guard: &Guard,
    world: &impl WorldQuery,
    sim: &SimulationConfig,
) {
    let vision = effective_vision(&guard.config, world, sim);
    let reach = vision.range.ceil() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let pos = TilePos::new(guard.position.x + dx, guard.position.y + dy);
            if pos == guard.position || !tiles.is_open(pos) {
                continue;
            }
            if !within_range(guard.position, pos, vision.range) {
                continue;
            }
            if guard.config.vision.occlusion && !clear_line(guard.position, pos, |t| tiles.is_open(t)) {
                continue;
            }

            if tile_within_fov(guard.position, guard.facing, pos, vision.hard_fov) {
                paint(cells, pos, OverlayCell::HardCone);
            } else if tile_within_fov(guard.position, guard.facing, pos, vision.soft_fov) {
                paint(cells, pos, OverlayCell::SoftCone);
            }
        }
    }
}

/// Build the overlay grid for every active guard
pub fn build_overlay<'a>(
    tiles: &TileMap,
    guards: impl IntoIterator<Item = &'a Guard>,
    world: &impl WorldQuery,
    sim: &SimulationConfig,
) -> Grid<OverlayCell> {
    let mut cells = Grid::new(tiles.width(), tiles.height());
    for y in 0..tiles.height() as i32 {
        for x in 0..tiles.width() as i32 {
            let pos = TilePos::new(x, y);
            if !tiles.is_open(pos) {
                cells.set(pos, OverlayCell::Wall);
            }
        }
    }

    let guards: Vec<&Guard> = guards.into_iter().filter(|g| g.state.active).collect();
    for guard in &guards {
        paint_cones(&mut cells, tiles, guard, world, sim);
    }

    paint(&mut cells, world.target().position, OverlayCell::Target);
    for guard in &guards {
        paint(&mut cells, guard.position, OverlayCell::Guard(guard.facing.glyph()));
    }
    cells
}

/// Render the overlay as newline-separated rows
pub fn render_overlay<'a>(
    tiles: &TileMap,
    guards: impl IntoIterator<Item = &'a Guard>,
    world: &impl WorldQuery,
    sim: &SimulationConfig,
) -> String {
    let cells = build_overlay(tiles, guards, world, sim);
    let mut out = String::with_capacity((cells.width + 1) * cells.height);
    for y in 0..cells.height as i32 {
        for x in 0..cells.width as i32 {
            let cell = cells.get(TilePos::new(x, y)).copied().unwrap_or_default();
            out.push(cell.glyph());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Direction, GuardId};
    use crate::guard::config::GuardConfig;
    use crate::simulation::world::MapState;

    #[test]
    fn test_overlay_draws_cone_ahead() {
        let mut map = MapState::open(7, 7);
        map.target.position = TilePos::new(6, 6);
        let mut config = GuardConfig::new("TownGuards");
        config.vision.range = 2.0;
        let mut guard = Guard::new(GuardId(1), TilePos::new(3, 1), config, 0);
        guard.facing = Direction::Down;

        let text = render_overlay(&map.tiles, [&guard], &map, &SimulationConfig::default());
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1].chars().nth(3), Some('v'));
        assert_eq!(rows[2].chars().nth(3), Some('*'));
        assert_eq!(rows[3].chars().nth(3), Some('*'));
        // Behind the guard
        assert_eq!(rows[0].chars().nth(3), Some('.'));
        assert_eq!(rows[6].chars().nth(6), Some('@'));
    }

    #[test]
    fn test_overlay_marks_walls_and_skips_inactive() {
        let mut map = MapState::open(3, 3);
        map.tiles.set_wall(TilePos::new(0, 0));
        map.target.position = TilePos::new(2, 2);
        let mut guard = Guard::new(GuardId(1), TilePos::new(1, 1), GuardConfig::new("TownGuards"), 0);
        guard.state.active = false;

        let cells = build_overlay(&map.tiles, [&guard], &map, &SimulationConfig::default());
        assert_eq!(cells.get(TilePos::new(0, 0)), Some(&OverlayCell::Wall));
        assert_eq!(cells.get(TilePos::new(1, 1)), Some(&OverlayCell::Floor));
    }
}
