use bevy::prelude::*;
use glam::Vec2;
use se_core::entity::EntityAccess;
use se_script::{ScriptCall, ScriptCalls};
use se_shape::{RayContext, Shape};
use se_tiles::{RayTracer, TileQuery, TileRegistrationMgr};
use thiserror::Error;

use crate::{
    delay::DelayedEntities,
    filter::{FilterCache, SensorFilterIndex},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorType {
    /// Detects entity centers, subject to line of sight and lighting.
    Sight = 0,
    /// Detects entity touch rectangles. Requires a shape.
    Touch = 1,
}

impl SensorType {
    pub const ALL: [Self; 2] = [Self::Sight, Self::Touch];

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// Where the sensor is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SensorPosition {
    /// Offset from the source center, in source local space.
    Source(Vec2),
    World(Vec2),
}

/// Names of functions of the source entity script. Empty names are not
/// called.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorCallbacks {
    /// Called with the sensor and the entered entity.
    pub on_enter: String,
    /// Called with the sensor and the exited entity.
    pub on_exit: String,
    /// Called with the sensor and a candidate entity. It must return a
    /// boolean, the candidate is ignored unless it is true.
    pub on_filter: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorFlags {
    /// Sight sensors detect entities which are not lit.
    pub enabled_in_darkness: bool,
    /// Line of sight is not blocked by tiles of the source collision
    /// ancestor tree.
    pub ignore_own_collision: bool,
    /// Line of sight is not blocked by active entity tiles.
    pub ignore_active_collision: bool,
    /// Entered and exited entities are reported nearest first instead of in
    /// entity order.
    pub distance_sort: bool,
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    #[error("a touch sensor requires a shape")]
    MissingShape,
    #[error("detection delay must be a non-negative finite number, got {0}")]
    InvalidDelay(f32),
}

/// Sensor configuration.
#[derive(Clone, Debug)]
pub struct SensorParams {
    pub sensor_type: SensorType,
    pub source: Entity,
    /// A fixed target. Other entities are not detected when set.
    pub target: Option<Entity>,
    pub shape: Option<Shape>,
    pub position: SensorPosition,
    /// Seconds of continuous detection before an entity is reported as
    /// entered.
    pub delay: f32,
    /// Start of line of sight rays relative to the sensor position, in
    /// source local space.
    pub ray_trace_offset: Vec2,
    pub callbacks: SensorCallbacks,
    pub flags: SensorFlags,
    pub enabled: bool,
}

impl SensorParams {
    /// Creates parameters of an enabled sensor located at the source
    /// center, without a shape, a target or a delay.
    pub fn new(sensor_type: SensorType, source: Entity) -> Self {
        Self {
            sensor_type,
            source,
            target: None,
            shape: None,
            position: SensorPosition::Source(Vec2::ZERO),
            delay: 0.,
            ray_trace_offset: Vec2::ZERO,
            callbacks: SensorCallbacks::default(),
            flags: SensorFlags::default(),
            enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Detection {
    /// Nothing was detected and nothing is to be reported.
    Skipped,
    /// The sensor or its source is suspended, all sensed entities exit.
    Suspended,
    Done,
}

/// Detector of entities in range of a shape or of a single fixed target.
///
/// Each tick consists of two phases which are expected to run for all
/// sensors in turn: [`Self::update`] detects candidates and
/// [`Self::update_callbacks`] filters them, reports changes to the source
/// entity script and updates the set of sensed entities.
#[derive(Component)]
pub struct Sensor {
    pub(crate) entity: Entity,
    pub(crate) sensor_type: SensorType,
    pub(crate) source: Entity,
    pub(crate) target: Option<Entity>,
    pub(crate) shape: Option<Shape>,
    pub(crate) position: SensorPosition,
    pub(crate) enabled: bool,
    pub(crate) suspended: bool,
    pub(crate) delay: f32,
    pub(crate) ray_trace_offset: Vec2,
    pub(crate) callbacks: SensorCallbacks,
    pub(crate) flags: SensorFlags,
    /// Script object of the source, kept for notifications after the
    /// source is gone.
    pub(crate) script: Option<String>,
    pub(crate) world_position: Vec2,
    /// Sorted and without duplicates.
    pub(crate) sensed: Vec<Entity>,
    pub(crate) delayed: DelayedEntities,
    pub(crate) current: Vec<Entity>,
    pub(crate) detection: Detection,
    pub(crate) filters: FilterCache,
    pub(crate) tracer: RayTracer,
}

impl Sensor {
    /// # Arguments
    ///
    /// * `entity` - the entity the sensor is attached to. It identifies the
    ///   sensor in script calls.
    pub fn new(entity: Entity, params: SensorParams) -> Result<Self, SensorError> {
        validate_shape(params.sensor_type, params.shape.as_ref())?;
        validate_delay(params.delay)?;

        Ok(Self {
            entity,
            sensor_type: params.sensor_type,
            source: params.source,
            target: params.target,
            shape: params.shape,
            position: params.position,
            enabled: params.enabled,
            suspended: false,
            delay: params.delay,
            ray_trace_offset: params.ray_trace_offset,
            callbacks: params.callbacks,
            flags: params.flags,
            script: None,
            world_position: Vec2::ZERO,
            sensed: Vec::new(),
            delayed: DelayedEntities::default(),
            current: Vec::new(),
            detection: Detection::Skipped,
            filters: FilterCache::default(),
            tracer: RayTracer::default(),
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn source(&self) -> Entity {
        self.source
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn position(&self) -> SensorPosition {
        self.position
    }

    /// World position of the sensor as of the last detection.
    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn ray_trace_offset(&self) -> Vec2 {
        self.ray_trace_offset
    }

    pub fn callbacks(&self) -> &SensorCallbacks {
        &self.callbacks
    }

    pub fn flags(&self) -> SensorFlags {
        self.flags
    }

    /// Currently sensed entities, sorted and without duplicates.
    pub fn sensed_entities(&self) -> &[Entity] {
        self.sensed.as_slice()
    }

    pub fn delayed_entities(&self) -> &DelayedEntities {
        &self.delayed
    }

    /// Replaces the shape. The sensor is kept intact if the shape is not
    /// valid for the sensor type.
    pub fn set_shape(&mut self, shape: Option<Shape>) -> Result<(), SensorError> {
        validate_shape(self.sensor_type, shape.as_ref())?;
        self.shape = shape;
        Ok(())
    }

    /// Changes the detection delay. Pending delayed entities restart their
    /// wait.
    pub fn set_delay(&mut self, delay: f32) -> Result<(), SensorError> {
        validate_delay(delay)?;
        if self.delay != delay {
            self.delayed.clear();
        }
        self.delay = delay;
        Ok(())
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }

    pub fn set_position(&mut self, position: SensorPosition) {
        self.position = position;
    }

    pub fn set_callbacks(&mut self, callbacks: SensorCallbacks) {
        self.callbacks = callbacks;
    }

    pub fn set_flags(&mut self, flags: SensorFlags) {
        self.flags = flags;
    }

    /// A suspended sensor does not detect and all its sensed entities exit
    /// during the next tick.
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Disabling the sensor immediately exits all sensed entities (the exit
    /// callbacks are queued) and releases all filter verdicts.
    pub fn set_enabled<S: ScriptCalls>(
        &mut self,
        enabled: bool,
        scripts: &mut S,
        index: &mut SensorFilterIndex,
    ) {
        if self.enabled && !enabled {
            self.remove_all_sensed_entities(false, scripts, index);
        }
        self.enabled = enabled;
    }

    /// Detects candidate entities of this tick.
    ///
    /// Nothing is detected while the sensor is disabled or while the source
    /// is gone, suspended or position culled.
    pub fn update<A: EntityAccess, S: ScriptCalls>(
        &mut self,
        tiles: &TileRegistrationMgr,
        entities: &A,
        scripts: &S,
        index: &mut SensorFilterIndex,
    ) {
        self.current.clear();
        self.tracer.reset();
        self.detection = Detection::Skipped;

        if !self.enabled
            || !entities.exists(self.source)
            || entities.is_position_culled(self.source)
        {
            return;
        }
        if self.suspended || entities.is_suspended(self.source) {
            self.detection = Detection::Suspended;
            return;
        }
        let Some(position) = self.compute_position(entities) else {
            return;
        };

        self.world_position = position;
        self.refresh_script(entities);
        self.detection = Detection::Done;

        let query = self.tile_query(entities);
        if let Some(shape) = self.shape.as_mut() {
            shape.update_transform(
                Some(self.source),
                position,
                entities,
                Some(RayContext {
                    tracer: &mut self.tracer,
                    tiles,
                    query,
                }),
            );
        }

        match self.target {
            Some(target) => {
                if self.is_detectable(target, entities)
                    && self.is_in_range(target, entities)
                    && self.filter_result(target, scripts, index)
                {
                    self.current.push(target);
                }
            }
            None => {
                if let Some(shape) = self.shape.as_ref() {
                    let candidates = match self.sensor_type {
                        SensorType::Sight => shape.entities_with_center_in_range(tiles, entities),
                        SensorType::Touch => {
                            shape.entities_with_world_rect_in_range(tiles, entities)
                        }
                    };
                    self.current = candidates
                        .into_iter()
                        .filter(|&candidate| self.is_detectable(candidate, entities))
                        .collect();
                }
            }
        }
    }

    /// Filters candidates detected by [`Self::update`], notifies the source
    /// script about entered and exited entities and updates the sensed set.
    ///
    /// Enter callbacks are issued before exit callbacks. Both are queued.
    ///
    /// # Arguments
    ///
    /// * `game_time` - current game time in seconds, used for the detection
    ///   delay.
    pub fn update_callbacks<A: EntityAccess, S: ScriptCalls>(
        &mut self,
        game_time: f64,
        tiles: &TileRegistrationMgr,
        entities: &A,
        scripts: &mut S,
        index: &mut SensorFilterIndex,
    ) {
        match self.detection {
            Detection::Skipped => return,
            Detection::Suspended => {
                self.remove_all_sensed_entities(false, scripts, index);
                return;
            }
            Detection::Done => (),
        }

        let mut current = std::mem::take(&mut self.current);
        self.filter_sensed_entities(&mut current, tiles, entities, scripts, index);
        current.sort_unstable();
        current.dedup();

        let mut entered = difference(&current, &self.sensed);
        let mut exited = difference(&self.sensed, &current);

        if self.delay > 0. {
            self.delayed.retain_detected(&current);
            let delay = f64::from(self.delay);
            let delayed = &mut self.delayed;
            entered.retain(|&entity| delayed.poll(entity, game_time, delay));
            // Entities still waiting are not sensed yet.
            let sensed = &self.sensed;
            current.retain(|entity| {
                sensed.binary_search(entity).is_ok() || entered.binary_search(entity).is_ok()
            });
        }

        if self.flags.distance_sort {
            self.sort_by_distance(&mut entered, entities);
            self.sort_by_distance(&mut exited, entities);
        }

        for &entity in &entered {
            debug!("Sensor {:?} detected {:?}.", self.entity, entity);
            self.notify(&self.callbacks.on_enter, entity, scripts, false);
        }
        for &entity in &exited {
            debug!("Sensor {:?} lost {:?}.", self.entity, entity);
            self.notify(&self.callbacks.on_exit, entity, scripts, false);
        }

        self.sensed = current;
        self.remove_unused_filters(index);
    }

    /// Returns true if any sight point of the target is visible from the
    /// ray trace position of the sensor. The points are tried in order.
    ///
    /// # Panics
    ///
    /// Panics if the target has no sight points.
    pub fn is_target_visible<A: EntityAccess>(
        &mut self,
        target: Entity,
        tiles: &TileRegistrationMgr,
        entities: &A,
    ) -> bool {
        let Some(center) = entities.center_position(target) else {
            return false;
        };
        let points = entities.sight_points(target);
        assert!(
            !points.is_empty(),
            "Entity {target:?} is sight detectable but has no sight points."
        );

        let from = self.world_position
            + entities.apply_orientation_to_vector(self.source, self.ray_trace_offset);
        let query = self.tile_query(entities);
        points.iter().any(|&point| {
            let to = center + entities.apply_orientation_to_vector(target, point);
            self.tracer.is_clear(from, to, tiles, &query, entities)
        })
    }

    /// Exits all sensed entities and releases all filter verdicts.
    ///
    /// # Arguments
    ///
    /// * `synchronous` - if true, exit callbacks are delivered before this
    ///   method returns, otherwise they are queued.
    pub fn remove_all_sensed_entities<S: ScriptCalls>(
        &mut self,
        synchronous: bool,
        scripts: &mut S,
        index: &mut SensorFilterIndex,
    ) {
        let sensed = std::mem::take(&mut self.sensed);
        for entity in sensed {
            debug!("Sensor {:?} released {:?}.", self.entity, entity);
            self.notify(&self.callbacks.on_exit, entity, scripts, synchronous);
        }

        self.current.clear();
        self.delayed.clear();
        for target in self.filters.drain() {
            index.unregister(target, self.entity);
        }
    }

    /// Drops filter verdicts about targets which were not candidates since
    /// the previous call.
    pub fn remove_unused_filters(&mut self, index: &mut SensorFilterIndex) {
        for target in self.filters.sweep() {
            index.unregister(target, self.entity);
        }
    }

    /// Drops the filter verdict about a target. The caller is responsible
    /// for removal of the relation from [`SensorFilterIndex`].
    pub fn forget_target(&mut self, target: Entity) -> bool {
        self.filters.remove(target)
    }

    /// Synchronously exits all sensed entities. The sensor is meant to be
    /// dropped afterwards.
    pub fn destroy<S: ScriptCalls>(&mut self, scripts: &mut S, index: &mut SensorFilterIndex) {
        self.remove_all_sensed_entities(true, scripts, index);
    }

    fn filter_sensed_entities<A: EntityAccess, S: ScriptCalls>(
        &mut self,
        candidates: &mut Vec<Entity>,
        tiles: &TileRegistrationMgr,
        entities: &A,
        scripts: &S,
        index: &mut SensorFilterIndex,
    ) {
        candidates.retain(|&candidate| {
            if candidate == self.source || candidate == self.entity {
                return false;
            }
            if !entities.is_initialized(candidate) {
                return false;
            }
            if !self.filter_result(candidate, scripts, index) {
                return false;
            }
            match self.sensor_type {
                SensorType::Sight => self.is_target_visible(candidate, tiles, entities),
                SensorType::Touch => true,
            }
        });
    }

    /// Returns the cached filter verdict about a target, evaluating the
    /// filter callback if there is none.
    fn filter_result<S: ScriptCalls>(
        &mut self,
        target: Entity,
        scripts: &S,
        index: &mut SensorFilterIndex,
    ) -> bool {
        if let Some(passed) = self.filters.get(target) {
            return passed;
        }

        let passed = match self.script.as_deref() {
            Some(object) if !self.callbacks.on_filter.is_empty() => {
                scripts.filter(ScriptCall::new(
                    object,
                    self.callbacks.on_filter.as_str(),
                    vec![self.entity.into(), target.into()],
                ))
            }
            _ => true,
        };
        self.filters.insert(target, passed);
        index.register(target, self.entity);
        passed
    }

    fn is_detectable<A: EntityAccess>(&self, target: Entity, entities: &A) -> bool {
        let detectable = entities.detectable(target);
        match self.sensor_type {
            SensorType::Sight => {
                detectable.sight
                    && (self.flags.enabled_in_darkness
                        || !detectable.light
                        || entities.is_in_light(target))
            }
            SensorType::Touch => detectable.touch,
        }
    }

    fn is_in_range<A: EntityAccess>(&self, target: Entity, entities: &A) -> bool {
        let Some(shape) = self.shape.as_ref() else {
            return entities.exists(target);
        };
        match self.sensor_type {
            SensorType::Sight => entities
                .center_position(target)
                .map_or(false, |center| shape.intersects_point(center)),
            SensorType::Touch => entities
                .touch_rect(target)
                .map_or(false, |rect| shape.intersects_rect(&rect)),
        }
    }

    fn compute_position<A: EntityAccess>(&self, entities: &A) -> Option<Vec2> {
        match self.position {
            SensorPosition::Source(offset) => entities
                .center_position(self.source)
                .map(|center| center + entities.apply_orientation_to_vector(self.source, offset)),
            SensorPosition::World(position) => Some(position),
        }
    }

    fn refresh_script<A: EntityAccess>(&mut self, entities: &A) {
        let script = entities.script(self.source);
        if self.script.as_deref() != script {
            self.script = script.map(str::to_owned);
        }
    }

    fn tile_query<A: EntityAccess>(&self, entities: &A) -> TileQuery<'static> {
        TileQuery {
            ignore_tiles: None,
            ignore_ancestor: if self.flags.ignore_own_collision {
                entities.collision_ancestor(self.source)
            } else {
                None
            },
            ignore_active: self.flags.ignore_active_collision,
        }
    }

    fn sort_by_distance<A: EntityAccess>(&self, targets: &mut [Entity], entities: &A) {
        let distance = |target: Entity| {
            entities
                .center_position(target)
                .map_or(f32::INFINITY, |center| {
                    center.distance_squared(self.world_position)
                })
        };
        targets.sort_by(|&a, &b| distance(a).total_cmp(&distance(b)));
    }

    fn notify<S: ScriptCalls>(
        &self,
        function: &str,
        target: Entity,
        scripts: &mut S,
        synchronous: bool,
    ) {
        if function.is_empty() {
            return;
        }
        let Some(object) = self.script.as_deref() else {
            return;
        };

        let call = ScriptCall::new(object, function, vec![self.entity.into(), target.into()]);
        if synchronous {
            scripts.call_now(call);
        } else {
            scripts.queue(call);
        }
    }
}

fn validate_shape(sensor_type: SensorType, shape: Option<&Shape>) -> Result<(), SensorError> {
    match (sensor_type, shape) {
        (SensorType::Touch, None) => Err(SensorError::MissingShape),
        _ => Ok(()),
    }
}

fn validate_delay(delay: f32) -> Result<(), SensorError> {
    if delay.is_finite() && delay >= 0. {
        Ok(())
    } else {
        Err(SensorError::InvalidDelay(delay))
    }
}

/// Returns items of sorted `a` which are not in sorted `b`.
fn difference(a: &[Entity], b: &[Entity]) -> Vec<Entity> {
    a.iter()
        .copied()
        .filter(|entity| b.binary_search(entity).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{f32::consts::FRAC_PI_2, sync::Arc};

    use se_core::entity::Detectable;
    use se_shape::{BoxShape, CircleShape};
    use se_test_utils::{scatter_points, RecordingScripts, TestEntities};
    use se_tiles::AttributeLayer;
    use se_script::ScriptArg;
    use se_types::{
        collision::CollisionType,
        orientation::Orientation,
        rect::{TileRect, WorldRect},
        tile::world_to_tile,
    };

    use super::*;

    const CENTER: Vec2 = Vec2::new(20., 20.);

    struct Fixture {
        tiles: TileRegistrationMgr,
        entities: TestEntities,
        scripts: RecordingScripts,
        index: SensorFilterIndex,
        source: Entity,
        sensor: Entity,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_layer(AttributeLayer::new(IVec2::new(40, 40)))
        }

        fn with_layer(layer: AttributeLayer) -> Self {
            let mut tiles = TileRegistrationMgr::default();
            tiles.set_level_layer(Arc::new(layer));
            let mut entities = TestEntities::default();
            let source = entities.spawn(CENTER);
            entities.set_script(source, "guard");
            let sensor = entities.spawn(Vec2::ZERO);

            let mut fixture = Self {
                tiles,
                entities,
                scripts: RecordingScripts::default(),
                index: SensorFilterIndex::default(),
                source,
                sensor,
            };
            fixture.register(source);
            fixture
        }

        fn params(&self, max_radius: f32) -> SensorParams {
            let mut params = SensorParams::new(SensorType::Sight, self.source);
            params.shape = Some(CircleShape::new(0., max_radius).into());
            params.callbacks = SensorCallbacks {
                on_enter: "on_enter".to_owned(),
                on_exit: "on_exit".to_owned(),
                on_filter: "on_filter".to_owned(),
            };
            params
        }

        fn sensor(&self, params: SensorParams) -> Sensor {
            Sensor::new(self.sensor, params).unwrap()
        }

        fn footprint(&self, entity: Entity) -> TileRect {
            match self.entities.touch_rect(entity) {
                Some(rect) => rect.to_tile_rect(),
                None => TileRect::from_tile(world_to_tile(
                    self.entities.center_position(entity).unwrap(),
                )),
            }
        }

        fn register(&mut self, entity: Entity) {
            let rect = self.footprint(entity);
            self.tiles.register_entity_handle(&rect, entity);
        }

        fn spawn_target(&mut self, position: Vec2) -> Entity {
            let entity = self.entities.spawn(position);
            self.register(entity);
            entity
        }

        fn move_target(&mut self, entity: Entity, position: Vec2) {
            let old = self.footprint(entity);
            self.entities.set_center(entity, position);
            let new = self.footprint(entity);
            self.tiles.move_register_entity_handle(&old, &new, entity);
        }

        fn despawn_target(&mut self, entity: Entity) {
            let rect = self.footprint(entity);
            self.tiles.unregister_entity_handle(&rect, entity);
            self.entities.despawn(entity);
        }

        fn tick(&mut self, sensor: &mut Sensor, game_time: f64) {
            sensor.update(&self.tiles, &self.entities, &self.scripts, &mut self.index);
            sensor.update_callbacks(
                game_time,
                &self.tiles,
                &self.entities,
                &mut self.scripts,
                &mut self.index,
            );
        }

        fn entered(&mut self) -> Vec<Entity> {
            self.scripts.take_entities("on_enter", 1)
        }

        fn exited(&mut self) -> Vec<Entity> {
            self.scripts.take_entities("on_exit", 1)
        }
    }

    #[test]
    fn test_enter_exit() {
        let mut fixture = Fixture::new();
        let a = fixture.spawn_target(Vec2::new(22., 20.));
        let b = fixture.spawn_target(Vec2::new(24., 20.));
        let c = fixture.spawn_target(Vec2::new(35., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));

        fixture.tick(&mut sensor, 0.);
        assert_eq!(sensor.sensed_entities(), &[a, b]);
        assert_eq!(fixture.entered(), vec![a, b]);
        assert!(fixture.exited().is_empty());

        fixture.move_target(a, Vec2::new(35., 21.));
        fixture.move_target(c, Vec2::new(26., 20.));
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(sensor.sensed_entities(), &[b, c]);

        let functions: Vec<&str> = fixture
            .scripts
            .queued()
            .iter()
            .map(|call| call.function())
            .collect();
        assert_eq!(functions, vec!["on_enter", "on_exit"]);
        assert_eq!(fixture.entered(), vec![c]);
        assert_eq!(fixture.exited(), vec![a]);

        // Nothing changes, nothing is reported.
        fixture.tick(&mut sensor, 0.2);
        assert!(fixture.scripts.queued().is_empty());
    }

    #[test]
    fn test_sensed_entities_sorted() {
        let mut fixture = Fixture::new();
        let targets: Vec<(Entity, Vec2)> = scatter_points(7, 200, 40.)
            .into_iter()
            .map(|point| (fixture.spawn_target(point), point))
            .collect();
        let mut sensor = fixture.sensor(fixture.params(15.));

        fixture.tick(&mut sensor, 0.);
        let sensed = sensor.sensed_entities();
        assert!(!sensed.is_empty());
        assert!(sensed.windows(2).all(|pair| pair[0] < pair[1]));
        for (entity, point) in targets {
            let distance = point.distance(CENTER);
            if distance < 14.99 {
                assert!(sensed.contains(&entity));
            } else if distance > 15.01 {
                assert!(!sensed.contains(&entity));
            }
        }
    }

    #[test]
    fn test_delay() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut params = fixture.params(8.);
        params.delay = 2.;
        let mut sensor = fixture.sensor(params);

        fixture.tick(&mut sensor, 10.);
        assert!(sensor.sensed_entities().is_empty());
        assert!(!sensor.delayed_entities().is_empty());
        fixture.tick(&mut sensor, 11.9);
        assert!(fixture.entered().is_empty());
        fixture.tick(&mut sensor, 12.);
        assert_eq!(fixture.entered(), vec![target]);
        assert_eq!(sensor.sensed_entities(), &[target]);

        fixture.move_target(target, Vec2::new(35., 20.));
        fixture.tick(&mut sensor, 12.5);
        assert_eq!(fixture.exited(), vec![target]);
        assert!(sensor.delayed_entities().is_empty());
    }

    #[test]
    fn test_delay_change() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut params = fixture.params(8.);
        params.delay = 2.;
        let mut sensor = fixture.sensor(params);

        fixture.tick(&mut sensor, 0.);
        assert!(!sensor.delayed_entities().is_empty());
        sensor.set_delay(0.).unwrap();
        assert!(sensor.delayed_entities().is_empty());
        sensor.set_delay(2.).unwrap();

        // The wait restarts instead of using the stale deadline.
        fixture.tick(&mut sensor, 2.5);
        assert!(fixture.entered().is_empty());
        fixture.tick(&mut sensor, 4.4);
        assert!(fixture.entered().is_empty());
        fixture.tick(&mut sensor, 4.5);
        assert_eq!(fixture.entered(), vec![target]);
    }

    #[test]
    fn test_position_culled_source() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![target]);

        // Culled sources keep their sensed entities.
        fixture.entities.set_position_culled(fixture.source, true);
        fixture.move_target(target, Vec2::new(35., 20.));
        fixture.tick(&mut sensor, 0.1);
        assert!(fixture.exited().is_empty());
        assert_eq!(sensor.sensed_entities(), &[target]);

        fixture.entities.set_position_culled(fixture.source, false);
        fixture.tick(&mut sensor, 0.2);
        assert_eq!(fixture.exited(), vec![target]);
    }

    #[test]
    fn test_suspended() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![target]);

        sensor.set_suspended(true);
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.exited(), vec![target]);
        assert!(sensor.sensed_entities().is_empty());
        assert!(fixture.index.is_empty());

        sensor.set_suspended(false);
        fixture.tick(&mut sensor, 0.2);
        assert_eq!(fixture.entered(), vec![target]);

        fixture.entities.set_suspended(fixture.source, true);
        fixture.tick(&mut sensor, 0.3);
        assert_eq!(fixture.exited(), vec![target]);
    }

    #[test]
    fn test_disable() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![target]);
        assert!(!fixture.index.is_empty());

        sensor.set_enabled(false, &mut fixture.scripts, &mut fixture.index);
        assert!(!sensor.is_enabled());
        assert_eq!(fixture.exited(), vec![target]);
        assert!(sensor.sensed_entities().is_empty());
        assert!(fixture.index.is_empty());

        fixture.tick(&mut sensor, 0.1);
        assert!(fixture.entered().is_empty());

        sensor.set_enabled(true, &mut fixture.scripts, &mut fixture.index);
        fixture.tick(&mut sensor, 0.2);
        assert_eq!(fixture.entered(), vec![target]);
    }

    #[test]
    fn test_validation() {
        let fixture = Fixture::new();
        let params = SensorParams::new(SensorType::Touch, fixture.source);
        assert_eq!(
            Sensor::new(fixture.sensor, params).err(),
            Some(SensorError::MissingShape)
        );

        let mut params = SensorParams::new(SensorType::Touch, fixture.source);
        params.shape = Some(BoxShape::new(2., 2., true).into());
        let mut sensor = fixture.sensor(params);
        assert_eq!(sensor.set_shape(None), Err(SensorError::MissingShape));
        assert!(sensor.shape().is_some());

        assert_eq!(sensor.set_delay(-1.), Err(SensorError::InvalidDelay(-1.)));
        assert_eq!(sensor.delay(), 0.);
        assert!(sensor.set_delay(0.5).is_ok());
        assert_eq!(sensor.delay(), 0.5);

        let mut sight = fixture.sensor(SensorParams::new(SensorType::Sight, fixture.source));
        assert!(sight.set_shape(None).is_ok());
    }

    #[test]
    fn test_filter() {
        let mut fixture = Fixture::new();
        let a = fixture.spawn_target(Vec2::new(22., 20.));
        let b = fixture.spawn_target(Vec2::new(24., 20.));
        fixture.scripts.reject(b);
        let mut sensor = fixture.sensor(fixture.params(8.));

        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![a]);
        assert_eq!(fixture.scripts.filter_count(), 2);

        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.scripts.filter_count(), 2);
        assert_eq!(fixture.index.sensors(b).collect::<Vec<_>>(), vec![fixture.sensor]);

        fixture.move_target(b, Vec2::new(35., 20.));
        fixture.tick(&mut sensor, 0.2);
        assert_eq!(fixture.index.sensors(b).count(), 0);
        assert_eq!(fixture.index.sensors(a).collect::<Vec<_>>(), vec![fixture.sensor]);

        fixture.scripts.accept(b);
        fixture.move_target(b, Vec2::new(24., 20.));
        fixture.tick(&mut sensor, 0.3);
        assert_eq!(fixture.entered(), vec![b]);
        assert_eq!(fixture.scripts.filter_count(), 3);
    }

    #[test]
    fn test_forget_target() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(22., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![target]);

        assert_eq!(fixture.index.remove_target(target), vec![fixture.sensor]);
        assert!(sensor.forget_target(target));
        assert!(!sensor.forget_target(target));
        fixture.despawn_target(target);

        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.exited(), vec![target]);
        assert!(fixture.index.is_empty());
    }

    #[test]
    fn test_line_of_sight() {
        let mut layer = AttributeLayer::new(IVec2::new(40, 40));
        for y in 15..25 {
            layer.set(IVec2::new(25, y), CollisionType::Solid);
        }
        let mut fixture = Fixture::with_layer(layer);
        let target = fixture.spawn_target(Vec2::new(28., 20.));
        let mut sensor = fixture.sensor(fixture.params(10.));

        fixture.tick(&mut sensor, 0.);
        assert!(fixture.entered().is_empty());
        assert!(!sensor.is_target_visible(target, &fixture.tiles, &fixture.entities));

        // The second point peeks over the wall.
        fixture
            .entities
            .set_sight_points(target, vec![Vec2::ZERO, Vec2::new(0., 10.)]);
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.entered(), vec![target]);
    }

    #[test]
    fn test_light() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        fixture.entities.set_in_light(target, false);
        let mut sensor = fixture.sensor(fixture.params(8.));

        fixture.tick(&mut sensor, 0.);
        assert!(fixture.entered().is_empty());

        sensor.set_flags(SensorFlags {
            enabled_in_darkness: true,
            ..SensorFlags::default()
        });
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.entered(), vec![target]);

        sensor.set_flags(SensorFlags::default());
        fixture.entities.set_detectable(
            target,
            Detectable {
                light: false,
                ..Detectable::ALL
            },
        );
        fixture.tick(&mut sensor, 0.2);
        assert!(fixture.exited().is_empty());

        fixture.entities.set_detectable(
            target,
            Detectable {
                sight: false,
                ..Detectable::ALL
            },
        );
        fixture.tick(&mut sensor, 0.3);
        assert_eq!(fixture.exited(), vec![target]);
    }

    #[test]
    fn test_fixed_target() {
        let mut fixture = Fixture::new();
        let a = fixture.spawn_target(Vec2::new(22., 20.));
        let b = fixture.spawn_target(Vec2::new(24., 20.));
        let mut params = fixture.params(8.);
        params.target = Some(b);
        let mut sensor = fixture.sensor(params);

        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![b]);
        fixture.move_target(b, Vec2::new(35., 20.));
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(fixture.exited(), vec![b]);

        // Without a shape, the target is sensed wherever it is.
        let mut params = SensorParams::new(SensorType::Sight, fixture.source);
        params.target = Some(a);
        params.callbacks.on_enter = "on_enter".to_owned();
        let mut unbounded = Sensor::new(fixture.entities.spawn(Vec2::ZERO), params).unwrap();
        fixture.move_target(a, Vec2::new(38., 38.));
        fixture.tick(&mut unbounded, 0.2);
        assert_eq!(unbounded.sensed_entities(), &[a]);
        assert_eq!(fixture.entered(), vec![a]);
    }

    #[test]
    fn test_fixed_target_not_detectable() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(22., 20.));
        fixture.entities.set_detectable(target, Detectable::NONE);
        let gone = fixture.spawn_target(Vec2::new(24., 20.));
        fixture.despawn_target(gone);

        for fixed in [target, gone] {
            let mut params = fixture.params(8.);
            params.target = Some(fixed);
            let mut sensor = fixture.sensor(params);
            fixture.tick(&mut sensor, 0.);
            assert!(sensor.sensed_entities().is_empty());
        }
        assert_eq!(fixture.scripts.filter_count(), 0);
        assert!(fixture.index.is_empty());
    }

    #[test]
    fn test_touch() {
        let mut fixture = Fixture::new();
        let touching = fixture.entities.spawn(Vec2::new(26., 20.));
        fixture.entities.set_touch_shape(
            touching,
            WorldRect::from_center_size(Vec2::ZERO, Vec2::splat(4.)),
        );
        fixture.register(touching);
        let untouchable = fixture.entities.spawn(Vec2::new(22., 20.));
        fixture.entities.set_touch_shape(
            untouchable,
            WorldRect::from_center_size(Vec2::ZERO, Vec2::splat(2.)),
        );
        fixture.entities.set_detectable(
            untouchable,
            Detectable {
                touch: false,
                ..Detectable::ALL
            },
        );
        fixture.register(untouchable);

        let mut params = fixture.params(5.);
        params.sensor_type = SensorType::Touch;
        let mut sensor = fixture.sensor(params);
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![touching]);
    }

    #[test]
    fn test_position() {
        let mut fixture = Fixture::new();
        fixture
            .entities
            .set_orientation(fixture.source, Orientation::new(FRAC_PI_2, false));
        let mut params = fixture.params(1.);
        params.position = SensorPosition::Source(Vec2::new(0., 5.));
        let mut sensor = fixture.sensor(params);
        fixture.tick(&mut sensor, 0.);
        assert!(sensor
            .world_position()
            .abs_diff_eq(Vec2::new(25., 20.), 1e-4));

        sensor.set_position(SensorPosition::World(Vec2::new(3., 4.)));
        fixture.tick(&mut sensor, 0.1);
        assert_eq!(sensor.world_position(), Vec2::new(3., 4.));
    }

    #[test]
    fn test_destroy() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![target]);

        sensor.destroy(&mut fixture.scripts, &mut fixture.index);
        assert!(fixture.scripts.queued().is_empty());
        let delivered = fixture.scripts.take_delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].function(), "on_exit");
        assert_eq!(
            delivered[0].args(),
            [ScriptArg::Entity(fixture.sensor), ScriptArg::Entity(target)].as_slice()
        );
        assert!(fixture.index.is_empty());
    }

    #[test]
    fn test_destroy_after_enter() {
        let mut fixture = Fixture::new();
        let target = fixture.spawn_target(Vec2::new(23., 20.));
        let mut sensor = fixture.sensor(fixture.params(8.));

        // The enter call is still queued when the sensor is destroyed.
        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.scripts.queued().len(), 1);
        sensor.destroy(&mut fixture.scripts, &mut fixture.index);

        assert!(fixture.scripts.queued().is_empty());
        let delivered = fixture.scripts.take_delivered();
        let functions: Vec<&str> = delivered.iter().map(|call| call.function()).collect();
        assert_eq!(functions, vec!["on_enter", "on_exit"]);
        assert!(delivered
            .iter()
            .all(|call| call.args()[1] == ScriptArg::Entity(target)));
        assert!(sensor.sensed_entities().is_empty());
    }

    #[test]
    fn test_distance_sort() {
        let mut fixture = Fixture::new();
        let far = fixture.spawn_target(Vec2::new(27., 20.));
        let near = fixture.spawn_target(Vec2::new(21., 20.));
        let middle = fixture.spawn_target(Vec2::new(20., 24.));
        let mut sensor = fixture.sensor(fixture.params(8.));
        sensor.set_flags(SensorFlags {
            distance_sort: true,
            ..SensorFlags::default()
        });

        fixture.tick(&mut sensor, 0.);
        assert_eq!(fixture.entered(), vec![near, middle, far]);
        assert_eq!(sensor.sensed_entities(), &[far, near, middle]);
    }
}
