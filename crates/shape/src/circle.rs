use glam::Vec2;
use se_types::rect::WorldRect;

/// A circle or, with non-zero minimum radius, an annulus.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleShape {
    min_radius: f32,
    max_radius: f32,
    min_radius_sq: f32,
    max_radius_sq: f32,
    position: Vec2,
    bounding: WorldRect,
}

impl CircleShape {
    /// # Panics
    ///
    /// Panics if the radii are not finite or if `0 <= min_radius <=
    /// max_radius` does not hold.
    pub fn new(min_radius: f32, max_radius: f32) -> Self {
        assert!(min_radius.is_finite() && max_radius.is_finite());
        assert!(
            0. <= min_radius && min_radius <= max_radius,
            "Invalid circle radii: {min_radius} and {max_radius}"
        );

        let mut circle = Self {
            min_radius,
            max_radius,
            min_radius_sq: min_radius * min_radius,
            max_radius_sq: max_radius * max_radius,
            position: Vec2::ZERO,
            bounding: WorldRect::default(),
        };
        circle.update_transform(Vec2::ZERO);
        circle
    }

    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn bounding(&self) -> WorldRect {
        self.bounding
    }

    pub(crate) fn update_transform(&mut self, position: Vec2) {
        self.position = position;
        self.bounding = WorldRect::from_center_size(position, Vec2::splat(2. * self.max_radius));
    }

    pub fn intersects_point(&self, point: Vec2) -> bool {
        let distance_sq = self.position.distance_squared(point);
        self.min_radius_sq <= distance_sq && distance_sq <= self.max_radius_sq
    }

    /// Tests the circle against an axis aligned rectangle.
    ///
    /// For an annulus, the farthest corner of the rectangle has to lie
    /// outside of the inner circle.
    pub fn intersects_rect(&self, rect: &WorldRect) -> bool {
        let closest = rect.closest_point(self.position);
        if self.position.distance_squared(closest) > self.max_radius_sq {
            return false;
        }
        if self.min_radius_sq <= 0. {
            return true;
        }
        let farthest = rect.farthest_point(self.position);
        self.position.distance_squared(farthest) >= self.min_radius_sq
    }

    /// Two rings intersect if their centers are not too far apart and
    /// neither lies completely inside of the hole of the other.
    pub fn intersects_circle(&self, other: &CircleShape) -> bool {
        let distance = self.position.distance(other.position);
        distance <= self.max_radius + other.max_radius
            && distance + other.max_radius >= self.min_radius
            && distance + self.max_radius >= other.min_radius
    }

    pub(crate) fn max_radius_sq(&self) -> f32 {
        self.max_radius_sq
    }

    pub(crate) fn min_radius_sq(&self) -> f32 {
        self.min_radius_sq
    }
}

/// Squared distance of a point from the line segment `a` -> `b`.
pub(crate) fn segment_distance_sq(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let dir = b - a;
    let length_sq = dir.length_squared();
    if length_sq == 0. {
        return point.distance_squared(a);
    }
    let t = ((point - a).dot(dir) / length_sq).clamp(0., 1.);
    point.distance_squared(a + t * dir)
}
