use glam::IVec2;

/// Iterable rectangular range of integer coordinates (tiles or cells).
///
/// The coordinates are iterated row-by-row, for example: (1, 1) -> (2, 1) ->
/// (1, 2) -> (2, 2).
#[derive(Clone, Debug)]
pub struct TileRange {
    a: IVec2,
    b: IVec2,
    x: i32,
    y: i32,
    exhausted: bool,
}

impl TileRange {
    /// # Arguments
    ///
    /// * `a` - inclusive range start.
    ///
    /// * `b` - inclusive range end.
    pub fn new(a: IVec2, b: IVec2) -> Self {
        Self {
            a,
            b,
            x: a.x,
            y: a.y,
            exhausted: a.cmpgt(b).any(),
        }
    }

    /// Returns an empty range.
    pub fn empty() -> Self {
        Self::new(IVec2::ONE, IVec2::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.a.cmpgt(self.b).any()
    }

    /// Returns true if the given point is not contained in the range.
    pub fn excludes(&self, point: IVec2) -> bool {
        self.a.cmpgt(point).any() || self.b.cmplt(point).any()
    }

    /// Returns intersecting range. The result might be empty.
    pub fn intersection(&self, other: &TileRange) -> TileRange {
        Self::new(self.a.max(other.a), self.b.min(other.b))
    }
}

impl PartialEq for TileRange {
    fn eq(&self, other: &Self) -> bool {
        (self.is_empty() && other.is_empty()) || (self.a == other.a && self.b == other.b)
    }
}

impl Eq for TileRange {}

impl Iterator for TileRange {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.exhausted {
            return None;
        }

        let next = Some(IVec2::new(self.x, self.y));
        if self.x == self.b.x {
            if self.y == self.b.y {
                self.exhausted = true;
            } else {
                self.x = self.a.x;
                self.y += 1;
            }
        } else {
            self.x += 1;
        }
        next
    }
}
