//! Conversions between world space, tile coordinates and cell coordinates.

use glam::{IVec2, Vec2};

use crate::CELL_SIZE;

/// Returns coordinates of the tile containing a world-space point.
pub fn world_to_tile(point: Vec2) -> IVec2 {
    point.floor().as_ivec2()
}

/// Returns cell grid coordinates (origin tile divided by cell size) of the
/// cell containing a tile.
pub fn cell_of(tile: IVec2) -> IVec2 {
    IVec2::new(tile.x.div_euclid(CELL_SIZE), tile.y.div_euclid(CELL_SIZE))
}
