//! Registry of everything occupying level tiles: entities (coarse, per
//! cell) and entity collision overlays (fine, per tile).

use std::sync::{Arc, Weak};

use ahash::AHashSet;
use bevy::prelude::*;
use se_core::entity::EntityAccess;
use se_types::{collision::CollisionType, rect::TileRect};

use crate::{
    cells::CellIndex, entity_tiles::EntityTiles, grid::FlatGrid, level::LevelLayer,
    segment::SegmentCandidates,
};

/// Single source of truth for "what occupies this tile" queries.
///
/// It merges static level collision with dynamic [`EntityTiles`] overlays
/// into a per-tile collision type cache and maintains a coarse cell index of
/// entities used by range queries.
///
/// Positions outside of the level are always solid and blocking. On the
/// other hand, unregistering an entity or an overlay which is not registered
/// is a programming error and panics.
#[derive(Resource, Default)]
pub struct TileRegistrationMgr {
    level: Option<Arc<dyn LevelLayer>>,
    cells: CellIndex,
    overlays: FlatGrid<Vec<Weak<EntityTiles>>>,
    cache: FlatGrid<CollisionType>,
    changed: Vec<IVec2>,
    solidity_changes: Vec<IVec2>,
}

/// Overlays to disregard during a live tile query.
#[derive(Clone, Copy, Default)]
pub struct TileQuery<'a> {
    /// A particular overlay to skip, usually the one of the querying entity.
    pub ignore_tiles: Option<&'a EntityTiles>,
    /// Skip overlays owned by any entity of this collision ancestor tree.
    pub ignore_ancestor: Option<Entity>,
    /// Skip all active (dynamic) overlays.
    pub ignore_active: bool,
}

impl<'a> TileQuery<'a> {
    pub fn is_empty(&self) -> bool {
        self.ignore_tiles.is_none() && self.ignore_ancestor.is_none() && !self.ignore_active
    }

    /// Identity of the query, usable as a cache key.
    pub(crate) fn key(&self) -> QueryKey {
        QueryKey {
            ignore_tiles: self
                .ignore_tiles
                .map(|tiles| tiles as *const EntityTiles as usize),
            ignore_ancestor: self.ignore_ancestor,
            ignore_active: self.ignore_active,
        }
    }

    fn skips<A: EntityAccess>(&self, tiles: &EntityTiles, entities: &A) -> bool {
        if self.ignore_active && tiles.is_active() {
            return true;
        }
        if let Some(ignored) = self.ignore_tiles {
            if std::ptr::eq(ignored, tiles) {
                return true;
            }
        }
        match self.ignore_ancestor {
            Some(ancestor) => entities.collision_ancestor(tiles.owner()) == Some(ancestor),
            None => false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct QueryKey {
    ignore_tiles: Option<usize>,
    ignore_ancestor: Option<Entity>,
    ignore_active: bool,
}

/// What made a tile solid.
#[derive(Clone, Debug)]
pub enum SolidSource {
    /// The static level or the level boundary.
    Level,
    EntityTiles(Arc<EntityTiles>),
}

impl TileRegistrationMgr {
    /// Sets the static collision layer of a newly loaded level.
    ///
    /// All registrations are dropped. Arrays are reallocated if the level
    /// size changed, see [`Self::handle_level_resized`].
    pub fn set_level_layer(&mut self, level: Arc<dyn LevelLayer>) {
        let resized = self.level_size() != level.size();
        self.level = Some(level);
        if resized {
            self.handle_level_resized();
        } else {
            self.reset();
        }
    }

    /// Reallocates all per-tile and per-cell arrays to the current level
    /// size. All registrations are lost.
    pub fn handle_level_resized(&mut self) {
        let size = self.level_size();
        info!("Allocating tile registrations for a level of {size} tiles.");

        self.cells = CellIndex::new(size);
        self.overlays = FlatGrid::from_fn(size, |_| Vec::new());
        self.cache = FlatGrid::new(size, CollisionType::Air);
        self.changed.clear();
        self.solidity_changes.clear();
        self.rebuild_cache();
    }

    /// Drops all registrations and pending notifications without
    /// reallocation. The cache falls back to the static level.
    pub fn reset(&mut self) {
        self.cells.clear();
        for overlays in self.overlays.iter_mut() {
            overlays.clear();
        }
        self.changed.clear();
        self.solidity_changes.clear();
        self.rebuild_cache();
    }

    /// Size of the level in tiles. It is zero if no level is loaded.
    pub fn level_size(&self) -> IVec2 {
        self.level.as_ref().map_or(IVec2::ZERO, |level| level.size())
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.cache.contains(pos)
    }

    /// Registers an entity in all cells overlapped by a tile rectangle.
    pub fn register_entity_handle(&mut self, rect: &TileRect, entity: Entity) {
        self.cells.register(rect, entity);
    }

    /// # Panics
    ///
    /// Panics if the entity was not registered with an equivalent rectangle.
    pub fn unregister_entity_handle(&mut self, rect: &TileRect, entity: Entity) {
        self.cells.unregister(rect, entity);
    }

    /// Moves an entity registration, touching only cells which are not
    /// overlapped by both rectangles.
    pub fn move_register_entity_handle(
        &mut self,
        prev: &TileRect,
        new: &TileRect,
        entity: Entity,
    ) {
        self.cells.move_register(prev, new, entity);
    }

    /// Returns entities registered in the cell containing a tile.
    pub fn entities_at(&self, tile: IVec2) -> impl Iterator<Item = Entity> + '_ {
        self.cells
            .entities_at(tile)
            .into_iter()
            .flat_map(|entities| entities.iter().copied())
    }

    pub fn has_entity_at(&self, tile: IVec2, entity: Entity) -> bool {
        self.cells
            .entities_at(tile)
            .map_or(false, |entities| entities.contains(&entity))
    }

    /// Returns all entities registered in cells overlapped (even partially)
    /// by a tile rectangle, sorted and without duplicates.
    pub fn entities_in_rect(&self, rect: &TileRect) -> Vec<Entity> {
        let mut entities = AHashSet::new();
        for cell in self.cells.cell_range(rect) {
            if let Some(cell_entities) = self.cells.cell(cell) {
                entities.extend(cell_entities.iter().copied());
            }
        }

        let mut entities: Vec<Entity> = entities.into_iter().collect();
        entities.sort_unstable();
        entities
    }

    /// Returns entities registered in cells crossed by a line segment. The
    /// entities are ordered by distance of their first crossed cell from
    /// `a`, without duplicates.
    pub fn entities_along_segment(&self, a: Vec2, b: Vec2) -> Vec<Entity> {
        let mut seen = AHashSet::new();
        let mut entities = Vec::new();
        for candidates in SegmentCandidates::new(&self.cells, a, b) {
            let start = entities.len();
            entities.extend(candidates.into_iter().filter(|&entity| seen.insert(entity)));
            entities[start..].sort_unstable();
        }
        entities
    }

    /// Registers a collision overlay over all its tiles.
    ///
    /// # Arguments
    ///
    /// * `tiles` - the overlay. Only a weak reference is kept.
    ///
    /// * `do_callbacks` - if true, entities around the overlay (one tile
    ///   margin) are notified during the next [`Self::update`].
    pub fn register_entity_tiles(&mut self, tiles: &Arc<EntityTiles>, do_callbacks: bool) {
        let rect = tiles.rect().clamp_to(self.level_size());
        for pos in rect.tiles() {
            self.overlays[pos].push(Arc::downgrade(tiles));
            self.refresh_tile(pos);
        }
        if do_callbacks {
            self.queue_changed(&tiles.rect());
        }
    }

    /// # Panics
    ///
    /// Panics if the overlay is not registered.
    pub fn unregister_entity_tiles(&mut self, tiles: &Arc<EntityTiles>, do_callbacks: bool) {
        let rect = tiles.rect().clamp_to(self.level_size());
        for pos in rect.tiles() {
            let overlays = &mut self.overlays[pos];
            let index = overlays
                .iter()
                .position(|overlay| std::ptr::eq(overlay.as_ptr(), Arc::as_ptr(tiles)))
                .unwrap_or_else(|| {
                    panic!(
                        "Entity tiles of {:?} are not registered at {pos}.",
                        tiles.owner()
                    )
                });
            overlays.remove(index);
            self.refresh_tile(pos);
        }
        if do_callbacks {
            self.queue_changed(&tiles.rect());
        }
    }

    /// Cached collision type of a tile. It is `Solid` outside of the level.
    pub fn collision_type(&self, pos: IVec2) -> CollisionType {
        self.cache.get(pos).copied().unwrap_or(CollisionType::Solid)
    }

    pub fn is_solid(&self, pos: IVec2) -> bool {
        self.collision_type(pos).is_solid()
    }

    pub fn is_light_blocking(&self, pos: IVec2) -> bool {
        self.collision_type(pos).is_light_blocking()
    }

    pub fn is_sound_blocking(&self, pos: IVec2) -> bool {
        self.collision_type(pos).is_sound_blocking()
    }

    /// Collision type of the static level alone.
    pub fn static_collision_type(&self, pos: IVec2) -> CollisionType {
        match self.level {
            Some(ref level) if level.contains(pos) => level.collision_type(pos),
            _ => CollisionType::Solid,
        }
    }

    /// Recomputes collision type of a tile from the static level and
    /// registered overlays, disregarding overlays excluded by the query.
    ///
    /// Solid static tiles win immediately, otherwise the first registered
    /// solid overlay wins, otherwise the static type is returned.
    pub fn collision_type_from_registered_tiles<A: EntityAccess>(
        &self,
        pos: IVec2,
        query: &TileQuery,
        entities: &A,
    ) -> CollisionType {
        match self.solid_source(pos, query, entities) {
            Some(SolidSource::EntityTiles(tiles)) => tiles.collision_type(pos),
            _ => self.static_collision_type(pos),
        }
    }

    /// Like [`Self::collision_type_from_registered_tiles`] but reports what
    /// made the tile solid. `None` means the tile is not solid.
    pub fn solid_source<A: EntityAccess>(
        &self,
        pos: IVec2,
        query: &TileQuery,
        entities: &A,
    ) -> Option<SolidSource> {
        if self.static_collision_type(pos).is_solid() {
            return Some(SolidSource::Level);
        }

        self.overlays
            .get(pos)
            .into_iter()
            .flatten()
            .filter_map(Weak::upgrade)
            .find(|tiles| {
                tiles.collision_type(pos).is_solid() && !query.skips(tiles, entities)
            })
            .map(SolidSource::EntityTiles)
    }

    /// Drains tiles changed since the last call and returns initialized
    /// entities registered around them, sorted and deduplicated. Each of the
    /// entities should be notified once.
    pub fn update<A: EntityAccess>(&mut self, entities: &A) -> Vec<Entity> {
        if self.changed.is_empty() {
            return Vec::new();
        }

        let mut changed = std::mem::take(&mut self.changed);
        changed.sort_unstable_by_key(|pos| (pos.y, pos.x));
        changed.dedup();

        let mut affected: Vec<Entity> = changed
            .iter()
            .flat_map(|&pos| self.entities_at(pos))
            .filter(|&entity| entities.is_initialized(entity))
            .collect();
        affected.sort_unstable();
        affected.dedup();

        trace!(
            "{} changed tiles affect {} entities.",
            changed.len(),
            affected.len()
        );
        // Keep the allocation.
        changed.clear();
        self.changed = changed;
        affected
    }

    /// Returns tiles whose solidity flipped since the last call.
    pub fn take_solidity_changes(&mut self) -> Vec<IVec2> {
        std::mem::take(&mut self.solidity_changes)
    }

    fn queue_changed(&mut self, rect: &TileRect) {
        let rect = rect.dilate(1).clamp_to(self.level_size());
        self.changed.extend(rect.tiles());
    }

    fn rebuild_cache(&mut self) {
        let size = self.cache.size();
        for pos in TileRect::from_origin_size(IVec2::ZERO, size).tiles() {
            self.cache[pos] = self.static_collision_type(pos);
        }
    }

    /// Recomputes the cached type of a tile: the highest priority solid
    /// overlay (the first registered on a tie), else the static type.
    fn refresh_tile(&mut self, pos: IVec2) {
        let mut merged: Option<CollisionType> = None;
        for tiles in self.overlays[pos].iter().filter_map(Weak::upgrade) {
            let collision_type = tiles.collision_type(pos);
            if let Some(priority) = collision_type.solid_priority() {
                if merged.and_then(CollisionType::solid_priority) < Some(priority) {
                    merged = Some(collision_type);
                }
            }
        }

        let merged = merged.unwrap_or_else(|| self.static_collision_type(pos));
        let previous = std::mem::replace(&mut self.cache[pos], merged);
        if previous.is_solid() != merged.is_solid() {
            self.solidity_changes.push(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use se_test_utils::TestEntities;

    use super::*;
    use crate::level::AttributeLayer;

    fn manager(rows: &[&str]) -> TileRegistrationMgr {
        let mut mgr = TileRegistrationMgr::default();
        mgr.set_level_layer(Arc::new(AttributeLayer::from_rows(rows).unwrap()));
        mgr
    }

    fn overlay(
        owner: u32,
        origin: (i32, i32),
        size: (i32, i32),
        collision_type: CollisionType,
    ) -> Arc<EntityTiles> {
        Arc::new(EntityTiles::uniform(
            Entity::from_raw(owner),
            IVec2::new(origin.0, origin.1),
            IVec2::new(size.0, size.1),
            collision_type,
            false,
        ))
    }

    #[test]
    fn test_static_and_outside() {
        let mgr = manager(&["..~", "#*."]);
        assert_eq!(mgr.collision_type(IVec2::new(0, 0)), CollisionType::Solid);
        assert_eq!(mgr.collision_type(IVec2::new(2, 1)), CollisionType::Water);
        assert!(mgr.is_sound_blocking(IVec2::new(2, 1)));
        assert!(!mgr.is_solid(IVec2::new(2, 1)));
        assert!(mgr.is_light_blocking(IVec2::new(1, 0)));

        for outside in [IVec2::new(-1, 0), IVec2::new(3, 0), IVec2::new(0, 2)] {
            assert_eq!(mgr.collision_type(outside), CollisionType::Solid);
            assert!(mgr.is_light_blocking(outside));
            assert!(mgr.is_sound_blocking(outside));
        }

        let unloaded = TileRegistrationMgr::default();
        assert!(unloaded.is_solid(IVec2::ZERO));
    }

    #[test]
    fn test_overlay_priorities() {
        let mut mgr = manager(&["....", "~..."]);
        let pos = IVec2::new(0, 0);

        let platform = overlay(1, (0, 0), (2, 1), CollisionType::Platform);
        let air = overlay(2, (0, 0), (1, 1), CollisionType::Air);
        let solid = overlay(3, (0, 0), (1, 1), CollisionType::Solid);
        let glass = overlay(4, (0, 0), (1, 1), CollisionType::Glass);

        mgr.register_entity_tiles(&air, false);
        assert_eq!(mgr.collision_type(pos), CollisionType::Water);
        assert!(mgr.take_solidity_changes().is_empty());

        mgr.register_entity_tiles(&platform, false);
        assert_eq!(mgr.collision_type(pos), CollisionType::Platform);
        assert_eq!(mgr.collision_type(IVec2::new(1, 0)), CollisionType::Platform);
        assert_eq!(
            mgr.take_solidity_changes(),
            vec![IVec2::new(0, 0), IVec2::new(1, 0)]
        );

        mgr.register_entity_tiles(&solid, false);
        mgr.register_entity_tiles(&glass, false);
        assert_eq!(mgr.collision_type(pos), CollisionType::Solid);
        assert!(mgr.take_solidity_changes().is_empty());

        mgr.unregister_entity_tiles(&solid, false);
        assert_eq!(mgr.collision_type(pos), CollisionType::Glass);
        mgr.unregister_entity_tiles(&glass, false);
        mgr.unregister_entity_tiles(&platform, false);
        assert_eq!(mgr.collision_type(pos), CollisionType::Water);
        assert_eq!(
            mgr.take_solidity_changes(),
            vec![IVec2::new(0, 0), IVec2::new(1, 0)]
        );
        mgr.unregister_entity_tiles(&air, false);
    }

    #[test]
    fn test_non_solid_overlays() {
        let mut mgr = manager(&["....", "#..."]);
        let water = overlay(1, (0, 0), (2, 2), CollisionType::Water);
        mgr.register_entity_tiles(&water, false);

        assert_eq!(mgr.collision_type(IVec2::new(1, 1)), CollisionType::Air);
        assert_eq!(mgr.collision_type(IVec2::new(0, 0)), CollisionType::Solid);
        assert!(mgr.take_solidity_changes().is_empty());
        mgr.unregister_entity_tiles(&water, false);
    }

    #[test]
    #[should_panic]
    fn test_unregister_absent_tiles() {
        let mut mgr = manager(&["...."]);
        mgr.unregister_entity_tiles(&overlay(1, (0, 0), (1, 1), CollisionType::Solid), false);
    }

    #[test]
    fn test_live_queries() {
        let mut mgr = manager(&["....", "#..."]);
        let mut entities = TestEntities::default();
        let carrier = entities.spawn(Vec2::new(5., 5.));
        let passenger = entities.spawn(Vec2::new(2., 2.));
        entities.set_collision_ancestor(passenger, carrier);

        let own = Arc::new(EntityTiles::uniform(
            passenger,
            IVec2::new(1, 0),
            IVec2::new(2, 1),
            CollisionType::Glass,
            true,
        ));
        let other = overlay(99, (2, 0), (1, 1), CollisionType::Platform);
        mgr.register_entity_tiles(&own, false);
        mgr.register_entity_tiles(&other, false);

        let none = TileQuery::default();
        assert!(none.is_empty());
        assert!(matches!(
            mgr.solid_source(IVec2::new(0, 0), &none, &entities),
            Some(SolidSource::Level)
        ));
        assert!(matches!(
            mgr.solid_source(IVec2::new(1, 0), &none, &entities),
            Some(SolidSource::EntityTiles(tiles)) if Arc::ptr_eq(&tiles, &own)
        ));
        assert!(mgr.solid_source(IVec2::new(3, 0), &none, &entities).is_none());

        let ignore_own = TileQuery {
            ignore_tiles: Some(own.as_ref()),
            ..Default::default()
        };
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(1, 0), &ignore_own, &entities),
            CollisionType::Air
        );
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(2, 0), &ignore_own, &entities),
            CollisionType::Platform
        );

        let ignore_tree = TileQuery {
            ignore_ancestor: Some(carrier),
            ..Default::default()
        };
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(1, 0), &ignore_tree, &entities),
            CollisionType::Air
        );

        let ignore_active = TileQuery {
            ignore_active: true,
            ..Default::default()
        };
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(2, 0), &ignore_active, &entities),
            CollisionType::Platform
        );
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(0, 0), &ignore_active, &entities),
            CollisionType::Solid
        );
        assert_eq!(
            mgr.collision_type_from_registered_tiles(IVec2::new(9, 0), &ignore_active, &entities),
            CollisionType::Solid
        );
    }

    #[test]
    fn test_update_notifications() {
        let mut mgr = manager(&[".........."; 10]);
        let mut entities = TestEntities::default();
        let near = entities.spawn(Vec2::new(1., 1.));
        let uninitialized = entities.spawn(Vec2::new(1., 1.));
        entities.set_initialized(uninitialized, false);

        mgr.register_entity_handle(&TileRect::from_tile(IVec2::new(1, 1)), near);
        mgr.register_entity_handle(&TileRect::from_tile(IVec2::new(1, 1)), uninitialized);

        let door = overlay(50, (3, 3), (1, 2), CollisionType::Solid);
        mgr.register_entity_tiles(&door, false);
        assert!(mgr.update(&entities).is_empty());

        mgr.unregister_entity_tiles(&door, true);
        mgr.register_entity_tiles(&door, true);
        // Both changes touch the same cell, notified once.
        assert_eq!(mgr.update(&entities), vec![near]);
        assert!(mgr.update(&entities).is_empty());
    }

    #[test]
    fn test_reset_idempotent() {
        let mut mgr = manager(&["#...", "...."]);
        let entity = Entity::from_raw(7);
        mgr.register_entity_handle(&TileRect::from_tile(IVec2::new(2, 0)), entity);
        let tiles = overlay(7, (1, 0), (1, 1), CollisionType::Solid);
        mgr.register_entity_tiles(&tiles, true);

        mgr.reset();
        let snapshot = |mgr: &TileRegistrationMgr| {
            TileRect::from_origin_size(IVec2::ZERO, mgr.level_size())
                .tiles()
                .map(|pos| (mgr.collision_type(pos), mgr.entities_at(pos).count()))
                .collect::<Vec<_>>()
        };
        let once = snapshot(&mgr);
        mgr.reset();
        assert_eq!(snapshot(&mgr), once);
        assert_eq!(mgr.collision_type(IVec2::new(1, 0)), CollisionType::Air);
        assert_eq!(mgr.collision_type(IVec2::new(0, 1)), CollisionType::Solid);
        assert_eq!(mgr.entities_at(IVec2::new(2, 0)).count(), 0);
        assert!(mgr.update(&TestEntities::default()).is_empty());
    }

    #[test]
    fn test_level_resize() {
        let mut mgr = manager(&["..", ".."]);
        let entity = Entity::from_raw(1);
        mgr.register_entity_handle(&TileRect::from_tile(IVec2::ZERO), entity);

        mgr.set_level_layer(Arc::new(AttributeLayer::new(IVec2::new(45, 10))));
        assert_eq!(mgr.level_size(), IVec2::new(45, 10));
        assert!(!mgr.has_entity_at(IVec2::ZERO, entity));
        assert!(!mgr.is_solid(IVec2::new(44, 9)));
        assert!(mgr.is_solid(IVec2::new(45, 9)));

        mgr.register_entity_handle(&TileRect::from_tile(IVec2::new(44, 9)), entity);
        assert!(mgr.has_entity_at(IVec2::new(40, 0), entity));
        assert_eq!(
            mgr.entities_in_rect(&TileRect::new(IVec2::new(30, 0), IVec2::new(60, 5))),
            vec![entity]
        );
        assert_eq!(
            mgr.entities_along_segment(Vec2::new(0.5, 0.5), Vec2::new(44.5, 0.5)),
            vec![entity]
        );
        assert!(mgr
            .entities_along_segment(Vec2::new(0.5, 0.5), Vec2::new(19.5, 9.5))
            .is_empty());
    }
}
