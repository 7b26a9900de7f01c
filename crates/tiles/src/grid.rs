//! Dense rectangular containers addressed by 2D integer coordinates.

use std::ops::{Index, IndexMut};

use glam::IVec2;

/// Rectangular grid of values stored in a flat, row-major array.
///
/// Coordinates are in `[0, size)` on both axes. Accessors returning `Option`
/// are bounds checked, indexing panics outside of the grid.
#[derive(Clone, Debug)]
pub struct FlatGrid<T> {
    size: IVec2,
    items: Vec<T>,
}

impl<T> FlatGrid<T> {
    /// Creates a grid with each item initialized by `init`.
    ///
    /// # Panics
    ///
    /// Panics if any of the dimensions is negative.
    pub fn from_fn<F>(size: IVec2, mut init: F) -> Self
    where
        F: FnMut(IVec2) -> T,
    {
        assert!(
            size.cmpge(IVec2::ZERO).all(),
            "Grid size must be non-negative, got {size}."
        );

        let mut items = Vec::with_capacity((size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                items.push(init(IVec2::new(x, y)));
            }
        }
        Self { size, items }
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.cmpge(IVec2::ZERO).all() && pos.cmplt(self.size).all()
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.index_of(pos).map(|index| &self.items[index])
    }

    pub fn get_mut(&mut self, pos: IVec2) -> Option<&mut T> {
        self.index_of(pos).map(|index| &mut self.items[index])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    fn index_of(&self, pos: IVec2) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.x + pos.y * self.size.x) as usize)
        } else {
            None
        }
    }
}

impl<T: Clone> FlatGrid<T> {
    pub fn new(size: IVec2, value: T) -> Self {
        Self::from_fn(size, |_| value.clone())
    }
}

impl<T> Default for FlatGrid<T> {
    fn default() -> Self {
        Self {
            size: IVec2::ZERO,
            items: Vec::new(),
        }
    }
}

impl<T> Index<IVec2> for FlatGrid<T> {
    type Output = T;

    fn index(&self, pos: IVec2) -> &T {
        match self.index_of(pos) {
            Some(index) => &self.items[index],
            None => panic!("Position {pos} is outside of grid of size {}.", self.size),
        }
    }
}

impl<T> IndexMut<IVec2> for FlatGrid<T> {
    fn index_mut(&mut self, pos: IVec2) -> &mut T {
        match self.index_of(pos) {
            Some(index) => &mut self.items[index],
            None => panic!("Position {pos} is outside of grid of size {}.", self.size),
        }
    }
}
