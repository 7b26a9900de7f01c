use ahash::AHashMap;
use bevy::prelude::Entity;
use glam::Vec2;
use se_core::entity::{Detectable, EntityAccess};
use se_types::{orientation::Orientation, rect::WorldRect};

struct TestEntity {
    center: Vec2,
    orientation: Orientation,
    touch_shape: Option<WorldRect>,
    suspended: bool,
    position_culled: bool,
    initialized: bool,
    detectable: Detectable,
    in_light: bool,
    sight_points: Vec<Vec2>,
    collision_ancestor: Option<Entity>,
    script: Option<String>,
}

/// In-memory [`EntityAccess`] implementation.
///
/// Spawned entities are initialized, detectable by everything, lit, have a
/// single sight point at their center and no touch shape.
#[derive(Default)]
pub struct TestEntities {
    next: u32,
    entities: AHashMap<Entity, TestEntity>,
}

impl TestEntities {
    pub fn spawn(&mut self, center: Vec2) -> Entity {
        let entity = Entity::from_raw(self.next);
        self.next += 1;
        self.entities.insert(
            entity,
            TestEntity {
                center,
                orientation: Orientation::IDENTITY,
                touch_shape: None,
                suspended: false,
                position_culled: false,
                initialized: true,
                detectable: Detectable::ALL,
                in_light: true,
                sight_points: vec![Vec2::ZERO],
                collision_ancestor: None,
                script: None,
            },
        );
        entity
    }

    pub fn despawn(&mut self, entity: Entity) {
        self.entities.remove(&entity);
    }

    pub fn set_center(&mut self, entity: Entity, center: Vec2) {
        self.get_mut(entity).center = center;
    }

    pub fn set_orientation(&mut self, entity: Entity, orientation: Orientation) {
        self.get_mut(entity).orientation = orientation;
    }

    pub fn set_touch_shape(&mut self, entity: Entity, shape: WorldRect) {
        self.get_mut(entity).touch_shape = Some(shape);
    }

    pub fn set_suspended(&mut self, entity: Entity, suspended: bool) {
        self.get_mut(entity).suspended = suspended;
    }

    pub fn set_position_culled(&mut self, entity: Entity, culled: bool) {
        self.get_mut(entity).position_culled = culled;
    }

    pub fn set_initialized(&mut self, entity: Entity, initialized: bool) {
        self.get_mut(entity).initialized = initialized;
    }

    pub fn set_detectable(&mut self, entity: Entity, detectable: Detectable) {
        self.get_mut(entity).detectable = detectable;
    }

    pub fn set_in_light(&mut self, entity: Entity, in_light: bool) {
        self.get_mut(entity).in_light = in_light;
    }

    pub fn set_sight_points(&mut self, entity: Entity, points: Vec<Vec2>) {
        self.get_mut(entity).sight_points = points;
    }

    pub fn set_collision_ancestor(&mut self, entity: Entity, ancestor: Entity) {
        self.get_mut(entity).collision_ancestor = Some(ancestor);
    }

    pub fn set_script(&mut self, entity: Entity, script: &str) {
        self.get_mut(entity).script = Some(script.to_owned());
    }

    fn get(&self, entity: Entity) -> Option<&TestEntity> {
        self.entities.get(&entity)
    }

    fn get_mut(&mut self, entity: Entity) -> &mut TestEntity {
        self.entities
            .get_mut(&entity)
            .expect("Test entity does not exist.")
    }
}

impl EntityAccess for TestEntities {
    fn exists(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    fn center_position(&self, entity: Entity) -> Option<Vec2> {
        self.get(entity).map(|e| e.center)
    }

    fn orientation(&self, entity: Entity) -> Orientation {
        self.get(entity).map_or(Orientation::IDENTITY, |e| e.orientation)
    }

    fn local_touch_shape(&self, entity: Entity) -> Option<WorldRect> {
        self.get(entity).and_then(|e| e.touch_shape)
    }

    fn is_suspended(&self, entity: Entity) -> bool {
        self.get(entity).map_or(false, |e| e.suspended)
    }

    fn is_position_culled(&self, entity: Entity) -> bool {
        self.get(entity).map_or(false, |e| e.position_culled)
    }

    fn is_initialized(&self, entity: Entity) -> bool {
        self.get(entity).map_or(false, |e| e.initialized)
    }

    fn detectable(&self, entity: Entity) -> Detectable {
        self.get(entity).map_or(Detectable::NONE, |e| e.detectable)
    }

    fn is_in_light(&self, entity: Entity) -> bool {
        self.get(entity).map_or(false, |e| e.in_light)
    }

    fn sight_points(&self, entity: Entity) -> &[Vec2] {
        self.get(entity).map_or(&[], |e| e.sight_points.as_slice())
    }

    fn collision_ancestor(&self, entity: Entity) -> Option<Entity> {
        self.get(entity)
            .map(|e| e.collision_ancestor.unwrap_or(entity))
    }

    fn script(&self, entity: Entity) -> Option<&str> {
        self.get(entity).and_then(|e| e.script.as_deref())
    }
}
