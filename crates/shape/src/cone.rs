use std::f32::consts::TAU;

use bevy::prelude::Entity;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_types::{
    orientation::{normalize_angle, vector_angle},
    rect::WorldRect,
};

use crate::circle::{segment_distance_sq, CircleShape};

/// Circular sector (optionally cut by an inner radius).
///
/// The sector is centered around `angle` given in owner local space and
/// spreads `spread / 2` to each side. After a transform update, the angular
/// window is `[start, end]` where `start` lies in `[0, 2 * pi)` and `end` may
/// exceed `2 * pi`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConeShape {
    circle: CircleShape,
    angle: f32,
    spread: f32,
    start: f32,
    end: f32,
}

impl ConeShape {
    /// # Panics
    ///
    /// Panics if `spread` is not in `(0, 2 * pi]`.
    pub fn new(min_radius: f32, max_radius: f32, angle: f32, spread: f32) -> Self {
        assert!(
            spread > 0. && spread <= TAU,
            "Cone spread must be in (0, 2 * pi], got {spread}"
        );
        let mut cone = Self {
            circle: CircleShape::new(min_radius, max_radius),
            angle,
            spread,
            start: 0.,
            end: 0.,
        };
        cone.set_window(normalize_angle(angle));
        cone
    }

    pub fn circle(&self) -> &CircleShape {
        &self.circle
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn spread(&self) -> f32 {
        self.spread
    }

    pub fn start_angle(&self) -> f32 {
        self.start
    }

    pub fn end_angle(&self) -> f32 {
        self.end
    }

    pub fn position(&self) -> Vec2 {
        self.circle.position()
    }

    pub fn bounding(&self) -> WorldRect {
        self.circle.bounding()
    }

    pub(crate) fn update_transform<A: EntityAccess>(
        &mut self,
        owner: Option<Entity>,
        position: Vec2,
        entities: &A,
    ) {
        self.circle.update_transform(position);
        let center = match owner {
            Some(owner) => entities.apply_orientation_to_angle(owner, self.angle),
            None => normalize_angle(self.angle),
        };
        self.set_window(center);
    }

    pub(crate) fn restore(&mut self, position: Vec2, start: f32, end: f32) {
        self.circle.update_transform(position);
        self.start = start;
        self.end = end;
    }

    fn set_window(&mut self, center: f32) {
        self.start = normalize_angle(center - 0.5 * self.spread);
        self.end = self.start + self.spread;
    }

    /// Returns true if direction from the apex to `point` lies within the
    /// angular window. The apex itself is within.
    pub fn in_spread(&self, point: Vec2) -> bool {
        let vector = point - self.position();
        if vector == Vec2::ZERO {
            return true;
        }

        let angle = vector_angle(vector);
        if self.end > TAU {
            angle >= self.start || angle <= self.end - TAU
        } else {
            self.start <= angle && angle <= self.end
        }
    }

    pub fn intersects_point(&self, point: Vec2) -> bool {
        self.circle.intersects_point(point) && self.in_spread(point)
    }

    /// The rectangle must pass the circle test and either contain the apex,
    /// have a corner within the angular window or cross one of the edges of
    /// the sector (its two sides and its axis).
    pub fn intersects_rect(&self, rect: &WorldRect) -> bool {
        if !self.circle.intersects_rect(rect) {
            return false;
        }

        rect.contains_point(self.position())
            || rect.corners().into_iter().any(|corner| self.in_spread(corner))
            || self
                .edges()
                .into_iter()
                .any(|(a, b)| rect.intersects_segment(a, b))
    }

    pub fn intersects_circle(&self, other: &CircleShape) -> bool {
        if !self.circle.intersects_circle(other) {
            return false;
        }

        self.in_spread(other.position())
            || self.edges().into_iter().any(|(a, b)| {
                segment_distance_sq(other.position(), a, b) <= other.max_radius_sq()
            })
    }

    fn edges(&self) -> [(Vec2, Vec2); 3] {
        let apex = self.position();
        let radius = self.circle.max_radius();
        let edge = |angle: f32| (apex, apex + radius * Vec2::new(angle.sin(), angle.cos()));
        [
            edge(self.start),
            edge(self.start + 0.5 * self.spread),
            edge(self.end),
        ]
    }
}
