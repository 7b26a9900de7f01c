use bevy::prelude::Entity;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_tiles::TileRegistrationMgr;
use se_types::rect::WorldRect;

use crate::{
    circle::CircleShape, cone::ConeShape, ray::RayContext, ray::RayShape, rectangle::BoxShape,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ShapeKind {
    Circle = 0,
    Box = 1,
    Cone = 2,
    Ray = 3,
}

impl ShapeKind {
    pub const ALL: [Self; 4] = [Self::Circle, Self::Box, Self::Cone, Self::Ray];

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(CircleShape),
    Box(BoxShape),
    Cone(ConeShape),
    Ray(RayShape),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle(_) => ShapeKind::Circle,
            Self::Box(_) => ShapeKind::Box,
            Self::Cone(_) => ShapeKind::Cone,
            Self::Ray(_) => ShapeKind::Ray,
        }
    }

    /// World-space position of the shape: the center of a circle or a box,
    /// the apex of a cone or the start of a ray.
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Circle(circle) => circle.position(),
            Self::Box(shape) => shape.position(),
            Self::Cone(cone) => cone.position(),
            Self::Ray(ray) => ray.start(),
        }
    }

    /// World-space axis aligned bounding rectangle.
    pub fn bounding(&self) -> WorldRect {
        match self {
            Self::Circle(circle) => circle.bounding(),
            Self::Box(shape) => shape.rect(),
            Self::Cone(cone) => cone.bounding(),
            Self::Ray(ray) => ray.bounding(),
        }
    }

    /// Moves the shape to `position` and applies facing of its owner.
    ///
    /// Rays are traced through the tile grid when `ray` is given, otherwise
    /// they end unobstructed. Other kinds ignore `ray`.
    pub fn update_transform<A: EntityAccess>(
        &mut self,
        owner: Option<Entity>,
        position: Vec2,
        entities: &A,
        ray: Option<RayContext>,
    ) {
        match self {
            Self::Circle(circle) => circle.update_transform(position),
            Self::Box(shape) => shape.update_transform(owner, position, entities),
            Self::Cone(cone) => cone.update_transform(owner, position, entities),
            Self::Ray(shape) => shape.update_transform(owner, position, entities, ray),
        }
    }

    pub fn intersects_point(&self, point: Vec2) -> bool {
        match self {
            Self::Circle(circle) => circle.intersects_point(point),
            Self::Box(shape) => shape.intersects_point(point),
            Self::Cone(cone) => cone.intersects_point(point),
            Self::Ray(ray) => ray.intersects_point(point),
        }
    }

    pub fn intersects_rect(&self, rect: &WorldRect) -> bool {
        match self {
            Self::Circle(circle) => circle.intersects_rect(rect),
            Self::Box(shape) => shape.intersects_rect(rect),
            Self::Cone(cone) => cone.intersects_rect(rect),
            Self::Ray(ray) => ray.intersects_rect(rect),
        }
    }

    /// Tests two shapes against each other. Returns `None` for pairs without
    /// a test: cone and cone, cone and ray, ray and ray.
    ///
    /// A box in "contains" mode requires the other shape (its bounding
    /// rectangle, or both ends of a ray) to lie inside of it, no matter
    /// which side of the pair it is.
    pub fn try_intersects(&self, other: &Shape) -> Option<bool> {
        let result = match (self, other) {
            (Self::Circle(a), Self::Circle(b)) => a.intersects_circle(b),
            (Self::Box(a), Self::Box(b)) => a.intersects_rect(&b.rect()),
            (Self::Box(a), Self::Circle(b)) => {
                if a.use_intersects() {
                    b.intersects_rect(&a.rect())
                } else {
                    a.rect().contains_rect(&b.bounding())
                }
            }
            (Self::Box(a), Self::Cone(b)) => {
                if a.use_intersects() {
                    b.intersects_rect(&a.rect())
                } else {
                    a.rect().contains_rect(&b.bounding())
                }
            }
            (Self::Box(a), Self::Ray(b)) => {
                if a.use_intersects() {
                    b.intersects_rect(&a.rect())
                } else {
                    a.intersects_point(b.start()) && a.intersects_point(b.hit())
                }
            }
            (Self::Cone(a), Self::Circle(b)) => a.intersects_circle(b),
            (Self::Ray(a), Self::Circle(b)) => a.intersects_circle(b),
            (Self::Circle(_) | Self::Cone(_) | Self::Ray(_), Self::Box(_))
            | (Self::Circle(_), Self::Cone(_) | Self::Ray(_)) => {
                return other.try_intersects(self)
            }
            (Self::Cone(_) | Self::Ray(_), Self::Cone(_) | Self::Ray(_)) => return None,
        };
        Some(result)
    }

    /// # Panics
    ///
    /// Panics for pairs without a test, see [`Self::try_intersects`].
    pub fn intersects(&self, other: &Shape) -> bool {
        match self.try_intersects(other) {
            Some(result) => result,
            None => unimplemented!(
                "Intersection of {:?} and {:?} shapes is not implemented.",
                self.kind(),
                other.kind()
            ),
        }
    }

    /// Returns entities whose center lies within the shape.
    ///
    /// Candidates come from the cells overlapped by the bounding rectangle
    /// (or crossed by a ray), thus only entities registered in `tiles` are
    /// found.
    pub fn entities_with_center_in_range<A: EntityAccess>(
        &self,
        tiles: &TileRegistrationMgr,
        entities: &A,
    ) -> Vec<Entity> {
        self.candidates(tiles)
            .into_iter()
            .filter(|&entity| {
                entities
                    .center_position(entity)
                    .map_or(false, |center| self.intersects_point(center))
            })
            .collect()
    }

    /// Returns entities whose world-space touch rectangle is in range of the
    /// shape. Entities without a touch shape are never in range.
    pub fn entities_with_world_rect_in_range<A: EntityAccess>(
        &self,
        tiles: &TileRegistrationMgr,
        entities: &A,
    ) -> Vec<Entity> {
        self.candidates(tiles)
            .into_iter()
            .filter(|&entity| {
                entities
                    .touch_rect(entity)
                    .map_or(false, |rect| self.intersects_rect(&rect))
            })
            .collect()
    }

    fn candidates(&self, tiles: &TileRegistrationMgr) -> Vec<Entity> {
        match self {
            Self::Ray(ray) => tiles.entities_along_segment(ray.start(), ray.hit()),
            _ => tiles.entities_in_rect(&self.bounding().to_tile_rect()),
        }
    }
}

impl From<CircleShape> for Shape {
    fn from(shape: CircleShape) -> Self {
        Self::Circle(shape)
    }
}

impl From<BoxShape> for Shape {
    fn from(shape: BoxShape) -> Self {
        Self::Box(shape)
    }
}

impl From<ConeShape> for Shape {
    fn from(shape: ConeShape) -> Self {
        Self::Cone(shape)
    }
}

impl From<RayShape> for Shape {
    fn from(shape: RayShape) -> Self {
        Self::Ray(shape)
    }
}
