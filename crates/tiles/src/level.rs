use glam::IVec2;
use se_types::collision::CollisionType;
use thiserror::Error;

use crate::grid::FlatGrid;

/// Static collision data of a loaded level.
pub trait LevelLayer: Send + Sync {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn size(&self) -> IVec2 {
        IVec2::new(self.width(), self.height())
    }

    fn contains(&self, pos: IVec2) -> bool {
        pos.cmpge(IVec2::ZERO).all() && pos.cmplt(self.size()).all()
    }

    /// Collision type of a tile inside of the level.
    fn collision_type(&self, pos: IVec2) -> CollisionType;
}

/// In-memory [`LevelLayer`] holding one collision type per tile.
#[derive(Clone, Debug)]
pub struct AttributeLayer {
    tiles: FlatGrid<CollisionType>,
}

impl AttributeLayer {
    /// Creates a level full of air.
    pub fn new(size: IVec2) -> Self {
        Self {
            tiles: FlatGrid::new(size, CollisionType::Air),
        }
    }

    /// Parses an ASCII level map. The first row is the top of the level.
    ///
    /// See [`CollisionType::from_map_char`] for the character set.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelParseError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if width == 0 {
            return Err(LevelParseError::Empty);
        }

        let mut layer = Self::new(IVec2::new(width as i32, height as i32));
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(LevelParseError::UnevenRow {
                    row: row_index,
                    expected: width,
                });
            }

            let y = (height - 1 - row_index) as i32;
            for (x, c) in row.chars().enumerate() {
                let collision_type = CollisionType::from_map_char(c).ok_or(
                    LevelParseError::UnknownTile {
                        character: c,
                        row: row_index,
                        column: x,
                    },
                )?;
                layer.set(IVec2::new(x as i32, y), collision_type);
            }
        }
        Ok(layer)
    }

    /// # Panics
    ///
    /// Panics if the position is outside of the level.
    pub fn set(&mut self, pos: IVec2, collision_type: CollisionType) {
        self.tiles[pos] = collision_type;
    }
}

impl LevelLayer for AttributeLayer {
    fn width(&self) -> i32 {
        self.tiles.size().x
    }

    fn height(&self) -> i32 {
        self.tiles.size().y
    }

    fn collision_type(&self, pos: IVec2) -> CollisionType {
        self.tiles.get(pos).copied().unwrap_or(CollisionType::Solid)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelParseError {
    #[error("the level map is empty")]
    Empty,
    #[error("row {row} does not have expected width of {expected} tiles")]
    UnevenRow { row: usize, expected: usize },
    #[error("unknown tile {character:?} at row {row}, column {column}")]
    UnknownTile {
        character: char,
        row: usize,
        column: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let layer = AttributeLayer::from_rows(&["#..", "#~g"]).unwrap();
        assert_eq!(layer.size(), IVec2::new(3, 2));
        assert_eq!(layer.collision_type(IVec2::new(0, 1)), CollisionType::Solid);
        assert_eq!(layer.collision_type(IVec2::new(1, 1)), CollisionType::Air);
        assert_eq!(layer.collision_type(IVec2::new(1, 0)), CollisionType::Water);
        assert_eq!(layer.collision_type(IVec2::new(2, 0)), CollisionType::Glass);
        assert!(layer.contains(IVec2::new(2, 1)));
        assert!(!layer.contains(IVec2::new(3, 1)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            AttributeLayer::from_rows::<&str>(&[]).unwrap_err(),
            LevelParseError::Empty
        );
        assert_eq!(
            AttributeLayer::from_rows(&["##", "#"]).unwrap_err(),
            LevelParseError::UnevenRow {
                row: 1,
                expected: 2
            }
        );
        assert_eq!(
            AttributeLayer::from_rows(&["#x"]).unwrap_err(),
            LevelParseError::UnknownTile {
                character: 'x',
                row: 0,
                column: 1
            }
        );
    }
}
