//! Distance, field-of-view and occlusion tests on the tile grid
//!
//! Pure functions of positions and orientation.

use crate::core::types::{Direction, TilePos, Vec2};

/// Slack added to range and cone comparisons so boundary tiles count
pub const GEOMETRY_EPSILON: f32 = 0.001;

/// Ray samples per tile along the longer axis
const RAY_SAMPLES_PER_TILE: f32 = 2.0;

pub fn euclidean(a: TilePos, b: TilePos) -> f32 {
    a.to_vec2().distance(&b.to_vec2())
}

pub fn chebyshev(a: TilePos, b: TilePos) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Inclusive range test: satisfied when either metric is within range
pub fn within_range(a: TilePos, b: TilePos, range: f32) -> bool {
    let limit = range + GEOMETRY_EPSILON;
    euclidean(a, b) <= limit || chebyshev(a, b) as f32 <= limit
}

/// Unsigned angle in degrees between two vectors, in [0, 180]
///
/// A zero-length vector on either side yields 0.
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let (la, lb) = (a.length(), b.length());
    if la < 1e-6 || lb < 1e-6 {
        return 0.0;
    }
    let cos = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Is `to_target` inside a cone of `fov_deg` centred on `facing`?
pub fn within_fov(facing: Vec2, to_target: Vec2, fov_deg: f32) -> bool {
    if fov_deg >= 360.0 {
        return true;
    }
    angle_between_deg(facing, to_target) <= fov_deg * 0.5 + GEOMETRY_EPSILON
}

/// Cone test from a guard standing on `from` facing `facing`
pub fn tile_within_fov(from: TilePos, facing: Direction, target: TilePos, fov_deg: f32) -> bool {
    within_fov(facing.vector(), target.to_vec2() - from.to_vec2(), fov_deg)
}

/// Round half up, matching how the host snaps sub-tile samples
fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Tiles sampled by a stepped ray from `from` to `to` (excluding `from`)
pub fn ray_samples(from: TilePos, to: TilePos) -> Vec<TilePos> {
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let steps = (dx.abs().max(dy.abs()) * RAY_SAMPLES_PER_TILE).ceil() as i32;

    (1..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            TilePos::new(
                round_half_up(from.x as f32 + dx * t),
                round_half_up(from.y as f32 + dy * t),
            )
        })
        .collect()
}

/// Straight-line occlusion test
///
/// `is_open` answers whether a tile is passable in any direction; a sample
/// landing on a tile with no passable direction blocks the ray.
pub fn clear_line(from: TilePos, to: TilePos, is_open: impl Fn(TilePos) -> bool) -> bool {
    ray_samples(from, to).into_iter().all(is_open)
}

/// Step direction toward `target`, larger-delta axis first
///
/// Returns the primary and (if any) secondary axis directions.
pub fn step_directions(from: TilePos, target: TilePos) -> (Option<Direction>, Option<Direction>) {
    let dx = target.x - from.x;
    let dy = target.y - from.y;

    let horizontal = match dx.signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };

    if dx.abs() >= dy.abs() {
        (horizontal.or(vertical), horizontal.and(vertical))
    } else {
        (vertical.or(horizontal), vertical.and(horizontal))
    }
}
