//! Tile grids for passability and region data

use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, RegionId, TilePos};

/// Generic 2D grid addressed by tile coordinates
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        self.index(pos).is_some()
    }

    #[inline]
    pub fn get(&self, pos: TilePos) -> Option<&T> {
        self.index(pos).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut T> {
        self.index(pos).map(move |i| &mut self.data[i])
    }

    #[inline]
    pub fn set(&mut self, pos: TilePos, value: T) {
        if let Some(i) = self.index(pos) {
            self.data[i] = value;
        }
    }
}

/// Per-tile passability, one bit per exit direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassFlags(u8);

impl PassFlags {
    pub const NONE: PassFlags = PassFlags(0);
    pub const ALL: PassFlags = PassFlags(0b1111);

    fn bit(dir: Direction) -> u8 {
        match dir {
            Direction::Down => 0b0001,
            Direction::Left => 0b0010,
            Direction::Right => 0b0100,
            Direction::Up => 0b1000,
        }
    }

    pub fn allows(&self, dir: Direction) -> bool {
        self.0 & Self::bit(dir) != 0
    }

    pub fn with(self, dir: Direction, passable: bool) -> Self {
        if passable {
            PassFlags(self.0 | Self::bit(dir))
        } else {
            PassFlags(self.0 & !Self::bit(dir))
        }
    }

    /// Passable in at least one direction (not a solid wall)
    pub fn any(&self) -> bool {
        self.0 != 0
    }
}

impl Default for PassFlags {
    fn default() -> Self {
        PassFlags::ALL
    }
}

/// Tile map: passability plus optional region ids
#[derive(Debug, Clone)]
pub struct TileMap {
    passability: Grid<PassFlags>,
    regions: Grid<RegionId>,
}

impl TileMap {
    /// Open map where every tile is passable in every direction
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            passability: Grid::new(width, height),
            regions: Grid::new(width, height),
        }
    }

    /// Build from ASCII rows: `#` wall, `.` floor, `0`-`9` floor with region id
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        let mut map = Self::new(width, height);

        for (y, row) in rows.iter().enumerate() {
            // Short rows are padded with walls
            let chars: Vec<char> = row.as_ref().chars().collect();
            for x in 0..width {
                let pos = TilePos::new(x as i32, y as i32);
                match chars.get(x) {
                    Some('#') | None => map.set_wall(pos),
                    Some(c) => {
                        if let Some(region) = c.to_digit(10) {
                            map.set_region(pos, region);
                        }
                    }
                }
            }
        }

        map
    }

    pub fn width(&self) -> usize {
        self.passability.width
    }

    pub fn height(&self) -> usize {
        self.passability.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        self.passability.in_bounds(pos)
    }

    pub fn set_wall(&mut self, pos: TilePos) {
        self.passability.set(pos, PassFlags::NONE);
    }

    pub fn set_flags(&mut self, pos: TilePos, flags: PassFlags) {
        self.passability.set(pos, flags);
    }

    pub fn set_region(&mut self, pos: TilePos, region: RegionId) {
        self.regions.set(pos, region);
    }

    /// Can something leave `pos` heading `dir`? Out of bounds is never passable.
    pub fn is_passable(&self, pos: TilePos, dir: Direction) -> bool {
        self.passability.get(pos).is_some_and(|f| f.allows(dir))
    }

    /// True for tiles that are not solid walls
    pub fn is_open(&self, pos: TilePos) -> bool {
        self.passability.get(pos).is_some_and(|f| f.any())
    }

    /// Region id at `pos`; 0 means no region
    pub fn region_id(&self, pos: TilePos) -> RegionId {
        self.regions.get(pos).copied().unwrap_or(0)
    }
}
