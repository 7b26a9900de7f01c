use ahash::AHashMap;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_types::{rect::WorldRect, vecord::Vec2Ord};

use crate::{
    mgr::{QueryKey, TileQuery, TileRegistrationMgr},
    segment::TileWalk,
};

/// Line of sight checks through the tile grid. Light blocking tiles stop the
/// ray.
///
/// Results are cached by end points and query until [`Self::reset`] is called, which
/// is expected to happen once per tick.
#[derive(Default)]
pub struct RayTracer {
    cache: AHashMap<(Vec2Ord, Vec2Ord, QueryKey), RayHit>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    blocked: bool,
    point: Vec2,
}

impl RayHit {
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// The point where the ray entered the first blocking tile, or the ray
    /// end if it is not blocked.
    pub fn point(&self) -> Vec2 {
        self.point
    }
}

impl RayTracer {
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Traces a ray from `from` to `to`.
    ///
    /// With an empty `query`, the cached tile collision types are used.
    /// Otherwise, collision types are recomputed from registered overlays
    /// with the overlays excluded by the query left out.
    pub fn trace<A: EntityAccess>(
        &mut self,
        from: Vec2,
        to: Vec2,
        tiles: &TileRegistrationMgr,
        query: &TileQuery,
        entities: &A,
    ) -> RayHit {
        *self
            .cache
            .entry((Vec2Ord(from), Vec2Ord(to), query.key()))
            .or_insert_with(|| trace_uncached(from, to, tiles, query, entities))
    }

    pub fn is_clear<A: EntityAccess>(
        &mut self,
        from: Vec2,
        to: Vec2,
        tiles: &TileRegistrationMgr,
        query: &TileQuery,
        entities: &A,
    ) -> bool {
        !self.trace(from, to, tiles, query, entities).is_blocked()
    }
}

fn trace_uncached<A: EntityAccess>(
    from: Vec2,
    to: Vec2,
    tiles: &TileRegistrationMgr,
    query: &TileQuery,
    entities: &A,
) -> RayHit {
    for tile in TileWalk::new(from, to) {
        let blocking = if query.is_empty() {
            tiles.is_light_blocking(tile)
        } else {
            tiles
                .collision_type_from_registered_tiles(tile, query, entities)
                .is_light_blocking()
        };

        if blocking {
            let bounds = WorldRect::new(tile.as_vec2(), tile.as_vec2() + Vec2::ONE);
            let factor = bounds.clip_segment(from, to).map_or(0., |(start, _)| start);
            return RayHit {
                blocked: true,
                point: from + factor * (to - from),
            };
        }
    }

    RayHit {
        blocked: false,
        point: to,
    }
}
