//! This crate keeps track of what occupies level tiles.
//!
//! The static level collision layer is merged with dynamic per-entity
//! collision overlays ([`EntityTiles`]) into a per-tile cache, see
//! [`TileRegistrationMgr`]. Entities are registered to a coarse grid of
//! cells (see [`se_types::CELL_SIZE`]) used by range queries. Entities with
//! [`TileFootprint`] are registered, moved and unregistered automatically by
//! systems added by [`TilesPluginGroup`].

mod cells;
mod entity_tiles;
mod grid;
mod level;
mod mgr;
mod raytrace;
mod segment;
mod systems;

use bevy::{app::PluginGroupBuilder, prelude::PluginGroup};
use systems::TilesPlugin;

pub use crate::{
    entity_tiles::EntityTiles,
    grid::FlatGrid,
    level::{AttributeLayer, LevelLayer, LevelParseError},
    mgr::{SolidSource, TileQuery, TileRegistrationMgr},
    raytrace::{RayHit, RayTracer},
    segment::TileWalk,
    systems::{SolidityChangedEvent, TileChangedEvent, TileFootprint},
};

pub struct TilesPluginGroup;

impl PluginGroup for TilesPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(TilesPlugin)
    }
}
