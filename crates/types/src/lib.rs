//! This crate implements geometry and tile types used across Sentinel.
//!
//! It is lightweight and without dependency on Bevy so it can be used by pure
//! geometric code (shapes, tile walks) and by tooling.
//!
//! World space is measured in tiles: tile `(x, y)` covers the half-open
//! square `[x, x + 1) x [y, y + 1)`. The Y axis points up.

pub mod codec;
pub mod collision;
pub mod orientation;
pub mod range;
pub mod rect;
pub mod tile;
pub mod vecord;

/// Edge length (in tiles) of a single square cell of the coarse entity index.
pub const CELL_SIZE: i32 = 20;
