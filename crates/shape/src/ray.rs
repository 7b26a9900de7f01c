use bevy::prelude::Entity;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_tiles::{RayTracer, TileQuery, TileRegistrationMgr};
use se_types::rect::WorldRect;

use crate::circle::{segment_distance_sq, CircleShape};

/// Ray tracing facilities of the sensor owning a ray shape.
pub struct RayContext<'a> {
    pub tracer: &'a mut RayTracer,
    pub tiles: &'a TileRegistrationMgr,
    pub query: TileQuery<'a>,
}

/// Line segment from the shape position towards an end point, cut short at
/// the first light blocking tile.
#[derive(Clone, Debug, PartialEq)]
pub struct RayShape {
    offset_end: Vec2,
    target: Option<Entity>,
    start: Vec2,
    end: Vec2,
    hit: Vec2,
}

impl RayShape {
    /// # Arguments
    ///
    /// * `offset_end` - ray end relative to the start, in owner local space.
    pub fn new(offset_end: Vec2) -> Self {
        Self {
            offset_end,
            target: None,
            start: Vec2::ZERO,
            end: offset_end,
            hit: offset_end,
        }
    }

    /// Aims the ray at an entity. While the entity exists, its center is the
    /// ray end and the end offset is not used.
    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn offset_end(&self) -> Vec2 {
        self.offset_end
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    /// End of the unobstructed part of the ray.
    pub fn hit(&self) -> Vec2 {
        self.hit
    }

    pub fn bounding(&self) -> WorldRect {
        WorldRect::from_points(&[self.start, self.hit])
    }

    pub(crate) fn update_transform<A: EntityAccess>(
        &mut self,
        owner: Option<Entity>,
        position: Vec2,
        entities: &A,
        context: Option<RayContext>,
    ) {
        self.start = position;
        self.end = match self.target.and_then(|target| entities.center_position(target)) {
            Some(end) => end,
            None => {
                let offset = match owner {
                    Some(owner) => entities.apply_orientation_to_vector(owner, self.offset_end),
                    None => self.offset_end,
                };
                position + offset
            }
        };
        self.hit = match context {
            Some(context) => context
                .tracer
                .trace(self.start, self.end, context.tiles, &context.query, entities)
                .point(),
            None => self.end,
        };
    }

    pub(crate) fn restore(&mut self, start: Vec2, end: Vec2, hit: Vec2) {
        self.start = start;
        self.end = end;
        self.hit = hit;
    }

    /// Tests whether the ray crosses the unit square centered at `point`.
    pub fn intersects_point(&self, point: Vec2) -> bool {
        WorldRect::from_center_size(point, Vec2::ONE).intersects_segment(self.start, self.hit)
    }

    pub fn intersects_rect(&self, rect: &WorldRect) -> bool {
        rect.intersects_segment(self.start, self.hit)
    }

    pub fn intersects_circle(&self, circle: &CircleShape) -> bool {
        let center = circle.position();
        if segment_distance_sq(center, self.start, self.hit) > circle.max_radius_sq() {
            return false;
        }
        let farthest = center
            .distance_squared(self.start)
            .max(center.distance_squared(self.hit));
        farthest >= circle.min_radius_sq()
    }
}

#[cfg(test)]
mod tests {
    use std::{f32::consts::PI, sync::Arc};

    use approx::assert_abs_diff_eq;
    use se_test_utils::TestEntities;
    use se_tiles::AttributeLayer;
    use se_types::orientation::Orientation;

    use super::*;

    #[test]
    fn test_straight() {
        let mut entities = TestEntities::default();
        let owner = entities.spawn(Vec2::new(2., 2.));
        entities.set_orientation(owner, Orientation::new(PI, false));

        let mut ray = RayShape::new(Vec2::new(0., 3.));
        ray.update_transform(Some(owner), Vec2::new(2., 2.), &entities, None);
        assert_eq!(ray.start(), Vec2::new(2., 2.));
        assert_abs_diff_eq!(ray.end().x, 2., epsilon = 1e-5);
        assert_abs_diff_eq!(ray.end().y, -1., epsilon = 1e-5);
        assert_eq!(ray.hit(), ray.end());

        assert!(ray.intersects_point(Vec2::new(2.4, 0.)));
        assert!(!ray.intersects_point(Vec2::new(3., 0.)));
        assert!(!ray.intersects_point(Vec2::new(2., 3.)));
    }

    #[test]
    fn test_target() {
        let mut entities = TestEntities::default();
        let owner = entities.spawn(Vec2::ZERO);
        let target = entities.spawn(Vec2::new(-4., 4.));

        let mut ray = RayShape::new(Vec2::new(1., 0.));
        ray.set_target(Some(target));
        ray.update_transform(Some(owner), Vec2::ZERO, &entities, None);
        assert_eq!(ray.end(), Vec2::new(-4., 4.));

        entities.despawn(target);
        ray.update_transform(Some(owner), Vec2::ZERO, &entities, None);
        assert_eq!(ray.end(), Vec2::new(1., 0.));
    }

    #[test]
    fn test_traced() {
        let level = AttributeLayer::from_rows(&["....", "..#.", "...."]).unwrap();
        let mut tiles = TileRegistrationMgr::default();
        tiles.set_level_layer(Arc::new(level));
        let mut tracer = RayTracer::default();
        let entities = TestEntities::default();

        let mut ray = RayShape::new(Vec2::new(3., 0.));
        ray.update_transform(
            None,
            Vec2::new(0.5, 1.5),
            &entities,
            Some(RayContext {
                tracer: &mut tracer,
                tiles: &tiles,
                query: TileQuery::default(),
            }),
        );
        assert_eq!(ray.end(), Vec2::new(3.5, 1.5));
        assert_eq!(ray.hit(), Vec2::new(2., 1.5));
        assert!(ray.intersects_rect(&WorldRect::new(
            Vec2::new(1.5, 0.),
            Vec2::new(1.8, 2.)
        )));
        assert!(!ray.intersects_rect(&WorldRect::new(
            Vec2::new(2.5, 0.),
            Vec2::new(3., 2.)
        )));
    }

    #[test]
    fn test_circle() {
        let ray = RayShape::new(Vec2::new(4., 0.));
        let mut circle = CircleShape::new(0., 1.);
        circle.update_transform(Vec2::new(2., 1.));
        assert!(ray.intersects_circle(&circle));
        circle.update_transform(Vec2::new(2., 1.1));
        assert!(!ray.intersects_circle(&circle));

        let mut ring = CircleShape::new(10., 11.);
        ring.update_transform(Vec2::new(2., 0.));
        assert!(!ray.intersects_circle(&ring));
    }
}
