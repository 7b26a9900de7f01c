use std::f32::consts::TAU;

use glam::Vec2;

use crate::rect::WorldRect;

/// Facing of an entity: horizontal mirroring followed by a clockwise
/// rotation.
///
/// Angles follow the engine convention: radians measured clockwise from the
/// up direction (`+Y`), so that `atan2(x, y)` of a vector gives its angle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Orientation {
    angle: f32,
    flip_x: bool,
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        angle: 0.,
        flip_x: false,
    };

    pub fn new(angle: f32, flip_x: bool) -> Self {
        Self {
            angle: normalize_angle(angle),
            flip_x,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    /// Transforms an entity-local vector to world-space orientation.
    pub fn apply_to_vector(&self, vector: Vec2) -> Vec2 {
        let vector = if self.flip_x {
            Vec2::new(-vector.x, vector.y)
        } else {
            vector
        };
        let (sin, cos) = self.angle.sin_cos();
        Vec2::new(
            vector.x * cos + vector.y * sin,
            -vector.x * sin + vector.y * cos,
        )
    }

    /// Transforms an entity-local angle to world-space. The result is in
    /// `[0, 2 * pi)`.
    pub fn apply_to_angle(&self, angle: f32) -> f32 {
        let angle = if self.flip_x { -angle } else { angle };
        normalize_angle(angle + self.angle)
    }

    /// Transforms an entity-local rectangle (relative to the entity center) to
    /// a world-space oriented, axis-aligned rectangle still relative to the
    /// entity center.
    pub fn apply_to_rect(&self, rect: &WorldRect) -> WorldRect {
        let corners = rect.corners().map(|corner| self.apply_to_vector(corner));
        WorldRect::from_points(&corners)
    }
}

/// Normalizes an angle to `[0, 2 * pi)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let normalized = angle.rem_euclid(TAU);
    // rem_euclid might round up to TAU for tiny negative inputs.
    if normalized >= TAU {
        0.
    } else {
        normalized
    }
}

/// Angle of a vector in the engine convention (clockwise from up), in
/// `[0, 2 * pi)`.
pub fn vector_angle(vector: Vec2) -> f32 {
    normalize_angle(vector.x.atan2(vector.y))
}
