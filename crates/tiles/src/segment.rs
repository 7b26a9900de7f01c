//! Tools for walking a square grid along a line segment.

use ahash::AHashSet;
use bevy::prelude::Entity;
use glam::{IVec2, Vec2};
use se_types::CELL_SIZE;

use crate::cells::CellIndex;

/// An iterator over sets of entities from cells intersecting a given line
/// segment.
///
/// This iterator yields non-empty sets. Each yielded set contains all entities
/// from a cell which have not yet been present in the previously visited
/// cell. Entities are registered over rectangles of cells, rectangles are
/// convex, therefore the yielded sets are disjoint.
///
/// The cells (and thus the yielded sets) are iterated by increasing distance
/// from the segment start.
pub(crate) struct SegmentCandidates<'a> {
    cells: &'a CellIndex,
    walk: GridWalk,
    encountered: Option<&'a AHashSet<Entity>>,
}

impl<'a> SegmentCandidates<'a> {
    pub(crate) fn new(cells: &'a CellIndex, a: Vec2, b: Vec2) -> Self {
        Self {
            cells,
            walk: GridWalk::new(a, b, CELL_SIZE as f32),
            encountered: None,
        }
    }
}

impl<'a> Iterator for SegmentCandidates<'a> {
    type Item = AHashSet<Entity>;

    fn next(&mut self) -> Option<AHashSet<Entity>> {
        loop {
            let cell = self.walk.next()?;
            match self.cells.cell(cell) {
                Some(entities) if !entities.is_empty() => {
                    let new_entities: AHashSet<Entity> = match self.encountered {
                        Some(encountered) => entities.difference(encountered).cloned().collect(),
                        None => entities.clone(),
                    };
                    self.encountered = Some(entities);
                    if !new_entities.is_empty() {
                        return Some(new_entities);
                    }
                }
                _ => self.encountered = None,
            }
        }
    }
}

/// Iterator over coordinates of tiles intersecting a line segment, ordered
/// from the segment start.
pub struct TileWalk(GridWalk);

impl TileWalk {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self(GridWalk::new(a, b, 1.))
    }
}

impl Iterator for TileWalk {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        self.0.next()
    }
}

/// Walks a square grid of `size` sized squares along a line segment.
struct GridWalk {
    size: f32,
    point: Vec2,
    stop: Vec2,
    last: IVec2,
    finished: bool,
}

impl GridWalk {
    fn new(a: Vec2, b: Vec2, size: f32) -> Self {
        let mut point = a;
        if point != b {
            // First square might be duplicated if direction is negative along
            // any axis. The following code fixes the issue.
            let next_point = Self::next_point(point, b, size);
            if (next_point / size).floor() == (point / size).floor() {
                point = next_point;
            }
        }

        Self {
            size,
            point,
            stop: b,
            last: (b / size).floor().as_ivec2(),
            finished: false,
        }
    }

    fn next_point(point: Vec2, stop: Vec2, size: f32) -> Vec2 {
        let dir = stop - point;
        debug_assert!(dir != Vec2::ZERO);

        let current = point / size;
        let next_x = size
            * if dir.x >= 0. {
                current.x.floor() + 1.
            } else {
                current.x.ceil() - 1.
            };
        let next_y = size
            * if dir.y >= 0. {
                current.y.floor() + 1.
            } else {
                current.y.ceil() - 1.
            };

        let factor_x = if dir.x == 0. {
            f32::INFINITY
        } else {
            (next_x - point.x) / dir.x
        };
        let factor_y = if dir.y == 0. {
            f32::INFINITY
        } else {
            (next_y - point.y) / dir.y
        };

        if factor_x < factor_y {
            if factor_x >= 1. {
                // Avoid rounding issues near the target point.
                stop
            } else {
                Vec2::new(next_x, point.y + factor_x * dir.y)
            }
        } else if factor_y >= 1. {
            stop
        } else {
            Vec2::new(point.x + factor_y * dir.x, next_y)
        }
    }
}

impl Iterator for GridWalk {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.finished {
            return None;
        }

        let current = (self.point / self.size).floor().as_ivec2();
        if current == self.last {
            self.finished = true;
        } else {
            self.point = Self::next_point(self.point, self.stop, self.size);
        }
        Some(current)
    }
}
