pub mod grid;

pub use grid::{Grid, PassFlags, TileMap};
