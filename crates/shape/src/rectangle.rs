use bevy::prelude::Entity;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_types::rect::WorldRect;

/// Rectangle centered at the shape position, rotated with its owner and
/// re-bounded to an axis aligned rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxShape {
    width: f32,
    height: f32,
    use_intersects: bool,
    position: Vec2,
    rect: WorldRect,
}

impl BoxShape {
    /// # Arguments
    ///
    /// * `use_intersects` - if true, other shapes and rectangles are in range
    ///   when they intersect the box. Otherwise, they must lie completely
    ///   inside of it.
    pub fn new(width: f32, height: f32, use_intersects: bool) -> Self {
        assert!(
            width >= 0. && height >= 0.,
            "Invalid box size: {width}x{height}"
        );
        Self {
            width,
            height,
            use_intersects,
            position: Vec2::ZERO,
            rect: WorldRect::from_center_size(Vec2::ZERO, Vec2::new(width, height)),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn use_intersects(&self) -> bool {
        self.use_intersects
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// World-space rectangle of the box. It is the bounding rectangle of the
    /// shape as well.
    pub fn rect(&self) -> WorldRect {
        self.rect
    }

    pub(crate) fn update_transform<A: EntityAccess>(
        &mut self,
        owner: Option<Entity>,
        position: Vec2,
        entities: &A,
    ) {
        let local = WorldRect::from_center_size(Vec2::ZERO, Vec2::new(self.width, self.height));
        let oriented = match owner {
            Some(owner) => entities.apply_orientation_to_rect(owner, &local),
            None => local,
        };
        self.position = position;
        self.rect = oriented.translated(position);
    }

    pub(crate) fn restore(&mut self, position: Vec2, rect: WorldRect) {
        self.position = position;
        self.rect = rect;
    }

    pub fn intersects_point(&self, point: Vec2) -> bool {
        self.rect.contains_point(point)
    }

    pub fn intersects_rect(&self, rect: &WorldRect) -> bool {
        if self.use_intersects {
            self.rect.intersects(rect)
        } else {
            self.rect.contains_rect(rect)
        }
    }
}
