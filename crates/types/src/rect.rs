use glam::{IVec2, Vec2};

use crate::range::TileRange;

/// Rectangle of tiles. Both `min` and `max` are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    min: IVec2,
    max: IVec2,
}

impl TileRect {
    /// # Arguments
    ///
    /// * `min` - inclusive lower left tile.
    ///
    /// * `max` - inclusive upper right tile.
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle covering `size` tiles starting at `origin`.
    pub fn from_origin_size(origin: IVec2, size: IVec2) -> Self {
        Self::new(origin, origin + size - IVec2::ONE)
    }

    /// Creates a rectangle containing a single tile.
    pub fn from_tile(tile: IVec2) -> Self {
        Self::new(tile, tile)
    }

    pub fn min(&self) -> IVec2 {
        self.min
    }

    pub fn max(&self) -> IVec2 {
        self.max
    }

    /// Number of tiles along each axis (zero for empty rectangles).
    pub fn size(&self) -> IVec2 {
        (self.max - self.min + IVec2::ONE).max(IVec2::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        tile.cmpge(self.min).all() && tile.cmple(self.max).all()
    }

    /// Returns intersecting rectangle. The result might be empty.
    pub fn intersection(&self, other: &TileRect) -> TileRect {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Returns the rectangle grown by `amount` tiles in every direction.
    pub fn dilate(&self, amount: i32) -> TileRect {
        Self::new(self.min - IVec2::splat(amount), self.max + IVec2::splat(amount))
    }

    /// Returns the part of the rectangle inside of `[0, size)`.
    pub fn clamp_to(&self, size: IVec2) -> TileRect {
        self.intersection(&Self::new(IVec2::ZERO, size - IVec2::ONE))
    }

    /// Iterates over all tiles of the rectangle row-by-row.
    pub fn tiles(&self) -> TileRange {
        TileRange::new(self.min, self.max)
    }
}

/// World-space axis-aligned rectangle. Both bounds are inclusive, thus
/// rectangles touching by an edge or a corner intersect.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldRect {
    min: Vec2,
    max: Vec2,
}

impl WorldRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.cmple(max).all());
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = 0.5 * size;
        Self::new(center - half, center + half)
    }

    /// Minimum rectangle containing all the given points.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty.
    pub fn from_points(points: &[Vec2]) -> Self {
        let first = *points.first().expect("Cannot bound an empty point set.");
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Self::new(min, max)
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn center(&self) -> Vec2 {
        0.5 * (self.min + self.max)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns true if `other` lies completely inside of this rectangle.
    pub fn contains_rect(&self, other: &WorldRect) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Point of the rectangle closest to `point`.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Corner of the rectangle farthest from `point`.
    pub fn farthest_point(&self, point: Vec2) -> Vec2 {
        let center = self.center();
        Vec2::new(
            if point.x < center.x {
                self.max.x
            } else {
                self.min.x
            },
            if point.y < center.y {
                self.max.y
            } else {
                self.min.y
            },
        )
    }

    /// Clips line segment `a` -> `b` by the rectangle and returns the
    /// parameters (`0` at `a`, `1` at `b`) of the clipped part, or `None` if
    /// the segment misses the rectangle.
    pub fn clip_segment(&self, a: Vec2, b: Vec2) -> Option<(f32, f32)> {
        let dir = b - a;
        let mut start = 0f32;
        let mut stop = 1f32;

        for axis in 0..2 {
            if dir[axis] == 0. {
                if a[axis] < self.min[axis] || a[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1. / dir[axis];
            let mut near = (self.min[axis] - a[axis]) * inv;
            let mut far = (self.max[axis] - a[axis]) * inv;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            start = start.max(near);
            stop = stop.min(far);
            if start > stop {
                return None;
            }
        }

        Some((start, stop))
    }

    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        self.clip_segment(a, b).is_some()
    }

    /// Minimum tile rectangle covering the world rectangle.
    ///
    /// Tiles are assumed to be topologically closed. In other words, both
    /// touching and intersecting tiles are included.
    pub fn to_tile_rect(&self) -> TileRect {
        TileRect::new(
            self.min.floor().as_ivec2(),
            self.max.floor().as_ivec2(),
        )
    }
}
