use bevy::prelude::Entity;
use glam::IVec2;
use se_types::{collision::CollisionType, rect::TileRect};

use crate::grid::FlatGrid;

/// Collision tiles injected by an entity on top of the static level, for
/// example the footprint of a moving platform or of a closed door.
///
/// The overlay is immutable. Moving it means unregistering the overlay and
/// registering a new one at the new place. The tile manager keeps only weak
/// references, the overlay is owned by its entity.
#[derive(Debug)]
pub struct EntityTiles {
    owner: Entity,
    origin: IVec2,
    tiles: FlatGrid<CollisionType>,
    active: bool,
}

impl EntityTiles {
    /// # Arguments
    ///
    /// * `owner` - entity the overlay belongs to.
    ///
    /// * `origin` - tile coordinates of the lower left overlay tile.
    ///
    /// * `tiles` - collision types of the overlay tiles.
    ///
    /// * `active` - whether the overlay is dynamic (moving or animated).
    ///   Physics may ask tile queries to disregard active overlays.
    pub fn new(
        owner: Entity,
        origin: IVec2,
        tiles: FlatGrid<CollisionType>,
        active: bool,
    ) -> Self {
        Self {
            owner,
            origin,
            tiles,
            active,
        }
    }

    /// Creates an overlay of `size` tiles of a single collision type.
    pub fn uniform(
        owner: Entity,
        origin: IVec2,
        size: IVec2,
        collision_type: CollisionType,
        active: bool,
    ) -> Self {
        Self::new(owner, origin, FlatGrid::new(size, collision_type), active)
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Tiles covered by the overlay.
    pub fn rect(&self) -> TileRect {
        TileRect::from_origin_size(self.origin, self.tiles.size())
    }

    /// Collision type of the overlay at a world tile position. It is `Air`
    /// outside of the overlay.
    pub fn collision_type(&self, pos: IVec2) -> CollisionType {
        self.tiles
            .get(pos - self.origin)
            .copied()
            .unwrap_or(CollisionType::Air)
    }
}
