//! Coarse spatial index: a grid of cells, each holding the set of entities
//! registered over any of its tiles.

use ahash::AHashSet;
use bevy::prelude::Entity;
use glam::IVec2;
use se_types::{range::TileRange, rect::TileRect, tile::cell_of, CELL_SIZE};

use crate::grid::FlatGrid;

#[derive(Default)]
pub(crate) struct CellIndex {
    cells: FlatGrid<AHashSet<Entity>>,
}

impl CellIndex {
    /// Creates an index covering a level of `level_size` tiles.
    ///
    /// One extra cell is allocated along each axis so that shapes and
    /// entities overflowing the upper level boundary still have a cell to
    /// live in.
    pub(crate) fn new(level_size: IVec2) -> Self {
        let cells = level_size / CELL_SIZE + IVec2::ONE;
        Self {
            cells: FlatGrid::from_fn(cells, |_| AHashSet::new()),
        }
    }

    /// Removes all registrations, keeps the allocation.
    pub(crate) fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
    }

    pub(crate) fn size(&self) -> IVec2 {
        self.cells.size()
    }

    /// Inserts the entity to all cells overlapped, fully or partially, by
    /// the tile rectangle.
    pub(crate) fn register(&mut self, rect: &TileRect, entity: Entity) {
        for cell in self.cell_range(rect) {
            let inserted = self.cells[cell].insert(entity);
            debug_assert!(
                inserted,
                "Entity {entity:?} registered twice in cell {cell}."
            );
        }
    }

    /// Removes the entity from all cells overlapped by the tile rectangle.
    ///
    /// # Panics
    ///
    /// Panics if the entity is missing in any of the cells, which means that
    /// the rectangle differs from the one used during registration.
    pub(crate) fn unregister(&mut self, rect: &TileRect, entity: Entity) {
        for cell in self.cell_range(rect) {
            self.remove_from_cell(entity, cell);
        }
    }

    /// Moves the entity registration from `prev` to `new`. Cells overlapped
    /// by both rectangles are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not registered over `prev`.
    pub(crate) fn move_register(&mut self, prev: &TileRect, new: &TileRect, entity: Entity) {
        let old_cells = self.cell_range(prev);
        let new_cells = self.cell_range(new);

        // Most of the time entities move within a single cell range.
        if old_cells == new_cells {
            return;
        }

        let intersection = old_cells.intersection(&new_cells);
        for cell in old_cells {
            if intersection.excludes(cell) {
                self.remove_from_cell(entity, cell);
            }
        }
        for cell in new_cells {
            if intersection.excludes(cell) {
                let inserted = self.cells[cell].insert(entity);
                debug_assert!(inserted);
            }
        }
    }

    /// Returns entities registered in the cell containing a tile.
    pub(crate) fn entities_at(&self, tile: IVec2) -> Option<&AHashSet<Entity>> {
        self.cells.get(cell_of(tile))
    }

    /// Returns entities registered in the cell with the given cell
    /// coordinates.
    pub(crate) fn cell(&self, cell: IVec2) -> Option<&AHashSet<Entity>> {
        self.cells.get(cell)
    }

    /// Returns cell coordinates of all existing cells overlapped by a tile
    /// rectangle.
    pub(crate) fn cell_range(&self, rect: &TileRect) -> TileRange {
        if rect.is_empty() {
            return TileRange::empty();
        }
        let max = self.cells.size() - IVec2::ONE;
        let start = cell_of(rect.min()).clamp(IVec2::ZERO, max.max(IVec2::ZERO));
        let end = cell_of(rect.max()).min(max);
        if end.cmplt(IVec2::ZERO).any() {
            return TileRange::empty();
        }
        TileRange::new(start, end)
    }

    fn remove_from_cell(&mut self, entity: Entity, cell: IVec2) {
        let removed = self.cells[cell].remove(&entity);
        assert!(
            removed,
            "Entity {entity:?} is not registered in cell {cell}, registration and \
             unregistration rectangles differ."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min: (i32, i32), max: (i32, i32)) -> TileRect {
        TileRect::new(IVec2::new(min.0, min.1), IVec2::new(max.0, max.1))
    }

    fn occupied(index: &CellIndex) -> Vec<IVec2> {
        TileRange::new(IVec2::ZERO, index.size() - IVec2::ONE)
            .filter(|&cell| !index.cell(cell).unwrap().is_empty())
            .collect()
    }

    #[test]
    fn test_move_register() {
        let mut index = CellIndex::new(IVec2::new(100, 60));
        assert_eq!(index.size(), IVec2::new(6, 4));

        let entity = Entity::from_raw(3);
        index.register(&rect((0, 0), (5, 5)), entity);
        assert_eq!(occupied(&index), vec![IVec2::ZERO]);
        assert!(index.entities_at(IVec2::new(19, 19)).unwrap().contains(&entity));

        index.move_register(&rect((0, 0), (5, 5)), &rect((25, 0), (30, 5)), entity);
        assert_eq!(occupied(&index), vec![IVec2::new(1, 0)]);
        assert!(index.entities_at(IVec2::new(20, 0)).unwrap().contains(&entity));
        assert!(!index.entities_at(IVec2::new(0, 0)).unwrap().contains(&entity));

        index.move_register(&rect((25, 0), (30, 5)), &rect((15, 0), (30, 5)), entity);
        assert_eq!(occupied(&index), vec![IVec2::ZERO, IVec2::new(1, 0)]);

        index.unregister(&rect((15, 0), (30, 5)), entity);
        assert!(occupied(&index).is_empty());
    }

    #[test]
    fn test_overflow_clamped() {
        let mut index = CellIndex::new(IVec2::new(40, 40));
        let entity = Entity::from_raw(1);
        // Overflows the level on both sides; lands in the padding cells.
        index.register(&rect((-10, 35), (70, 45)), entity);
        assert_eq!(
            occupied(&index),
            vec![
                IVec2::new(0, 1),
                IVec2::new(1, 1),
                IVec2::new(2, 1),
                IVec2::new(0, 2),
                IVec2::new(1, 2),
                IVec2::new(2, 2)
            ]
        );
        index.unregister(&rect((-10, 35), (70, 45)), entity);
        assert!(occupied(&index).is_empty());

        index.register(&rect((-30, -30), (-21, -21)), entity);
        assert!(occupied(&index).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_unmatched_unregister() {
        let mut index = CellIndex::new(IVec2::new(40, 40));
        let entity = Entity::from_raw(1);
        index.register(&rect((0, 0), (5, 5)), entity);
        index.unregister(&rect((25, 0), (30, 5)), entity);
    }
}
