//! Entity components consumed by the spatial query engine and the
//! [`EntityAccess`] view over them.

use bevy::{ecs::system::SystemParam, prelude::*};
use glam::Vec2;
use se_types::{orientation::Orientation, rect::WorldRect};

/// Facing of an entity. Entities without this component are not rotated.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Facing(pub Orientation);

/// Which kinds of sensors may detect the entity. Entities without this
/// component are undetectable.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detectable {
    pub sight: bool,
    pub touch: bool,
    /// Detection by sight requires the entity to be lit.
    pub light: bool,
}

impl Detectable {
    pub const ALL: Self = Self {
        sight: true,
        touch: true,
        light: true,
    };

    pub const NONE: Self = Self {
        sight: false,
        touch: false,
        light: false,
    };
}

/// Entity-local points checked by sight sensors for line of sight. At least
/// one is required for an entity to be seen.
#[derive(Component, Clone, Debug, Default)]
pub struct SightPoints(pub Vec<Vec2>);

/// Entity-local touch rectangle, relative to the entity center and before
/// the facing is applied.
#[derive(Component, Clone, Copy, Debug)]
pub struct TouchShape(pub WorldRect);

/// The entity is paused. Sensors of suspended entities do not detect.
#[derive(Component)]
pub struct Suspended;

/// The entity is far from any point of interest and excluded from detection
/// work.
#[derive(Component)]
pub struct PositionCulled;

/// Marks entities whose setup is complete. Uninitialized entities are never
/// sensed nor notified about tile changes.
#[derive(Component)]
pub struct Initialized;

#[derive(Component)]
pub struct InLight;

/// Root of the chain of "standing on / carried by" relationships of the
/// entity. Entities without it are their own ancestor.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionAncestor(pub Entity);

/// Name of the script object receiving callbacks of this entity.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct EntityScript(pub String);

/// Read-only access to the entity state the spatial query engine depends on.
///
/// All methods take stale or unknown handles gracefully: they return `None`,
/// `false` or empty values.
pub trait EntityAccess {
    fn exists(&self, entity: Entity) -> bool;

    /// World-space position of the entity center.
    fn center_position(&self, entity: Entity) -> Option<Vec2>;

    fn orientation(&self, entity: Entity) -> Orientation;

    fn local_touch_shape(&self, entity: Entity) -> Option<WorldRect>;

    fn is_suspended(&self, entity: Entity) -> bool;

    fn is_position_culled(&self, entity: Entity) -> bool;

    fn is_initialized(&self, entity: Entity) -> bool;

    fn detectable(&self, entity: Entity) -> Detectable;

    fn is_in_light(&self, entity: Entity) -> bool;

    fn sight_points(&self, entity: Entity) -> &[Vec2];

    /// Returns the cached collision ancestor of an existing entity, the
    /// entity itself if it has none.
    fn collision_ancestor(&self, entity: Entity) -> Option<Entity>;

    fn script(&self, entity: Entity) -> Option<&str>;

    fn apply_orientation_to_vector(&self, entity: Entity, vector: Vec2) -> Vec2 {
        self.orientation(entity).apply_to_vector(vector)
    }

    fn apply_orientation_to_angle(&self, entity: Entity, angle: f32) -> f32 {
        self.orientation(entity).apply_to_angle(angle)
    }

    fn apply_orientation_to_rect(&self, entity: Entity, rect: &WorldRect) -> WorldRect {
        self.orientation(entity).apply_to_rect(rect)
    }

    /// World-space touch rectangle of the entity.
    fn touch_rect(&self, entity: Entity) -> Option<WorldRect> {
        let center = self.center_position(entity)?;
        let local = self.local_touch_shape(entity)?;
        Some(
            self.apply_orientation_to_rect(entity, &local)
                .translated(center),
        )
    }
}

type EntityData = (
    &'static Transform,
    Option<&'static Facing>,
    Option<&'static Detectable>,
    Option<&'static SightPoints>,
    Option<&'static TouchShape>,
    Option<&'static CollisionAncestor>,
    Option<&'static EntityScript>,
    Option<&'static Suspended>,
    Option<&'static PositionCulled>,
    Option<&'static Initialized>,
    Option<&'static InLight>,
);

/// [`EntityAccess`] backed by the ECS world. Only entities with a
/// [`Transform`] exist from its point of view.
#[derive(SystemParam)]
pub struct EntityQuery<'w, 's> {
    entities: Query<'w, 's, EntityData>,
}

impl<'w, 's> EntityAccess for EntityQuery<'w, 's> {
    fn exists(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    fn center_position(&self, entity: Entity) -> Option<Vec2> {
        self.entities
            .get(entity)
            .ok()
            .map(|(transform, ..)| transform.translation.truncate())
    }

    fn orientation(&self, entity: Entity) -> Orientation {
        self.entities
            .get(entity)
            .ok()
            .and_then(|data| data.1)
            .map_or(Orientation::IDENTITY, |facing| facing.0)
    }

    fn local_touch_shape(&self, entity: Entity) -> Option<WorldRect> {
        self.entities
            .get(entity)
            .ok()
            .and_then(|data| data.4)
            .map(|shape| shape.0)
    }

    fn is_suspended(&self, entity: Entity) -> bool {
        matches!(self.entities.get(entity), Ok(data) if data.7.is_some())
    }

    fn is_position_culled(&self, entity: Entity) -> bool {
        matches!(self.entities.get(entity), Ok(data) if data.8.is_some())
    }

    fn is_initialized(&self, entity: Entity) -> bool {
        matches!(self.entities.get(entity), Ok(data) if data.9.is_some())
    }

    fn detectable(&self, entity: Entity) -> Detectable {
        self.entities
            .get(entity)
            .ok()
            .and_then(|data| data.2)
            .copied()
            .unwrap_or(Detectable::NONE)
    }

    fn is_in_light(&self, entity: Entity) -> bool {
        matches!(self.entities.get(entity), Ok(data) if data.10.is_some())
    }

    fn sight_points(&self, entity: Entity) -> &[Vec2] {
        match self.entities.get(entity) {
            Ok((_, _, _, Some(points), ..)) => points.0.as_slice(),
            _ => &[],
        }
    }

    fn collision_ancestor(&self, entity: Entity) -> Option<Entity> {
        self.entities
            .get(entity)
            .ok()
            .map(|data| data.5.map_or(entity, |ancestor| ancestor.0))
    }

    fn script(&self, entity: Entity) -> Option<&str> {
        self.entities
            .get(entity)
            .ok()
            .and_then(|data| data.6)
            .map(|script| script.0.as_str())
    }
}
