use std::marker::PhantomData;

use bevy::prelude::*;
use se_core::{
    clock::GameClock,
    entity::{Detectable, EntityAccess, EntityQuery},
    schedule::TickSet,
    state::AppState,
};
use se_script::ScriptCalls;
use se_tiles::TileRegistrationMgr;

use crate::{filter::SensorFilterIndex, sensor::Sensor};

/// Runs all [`Sensor`] components each tick and notifies scripts through
/// resource `S`.
pub struct SensorPlugin<S> {
    _m: PhantomData<fn() -> S>,
}

impl<S> Default for SensorPlugin<S> {
    fn default() -> Self {
        Self { _m: PhantomData }
    }
}

impl<S> Plugin for SensorPlugin<S>
where
    S: ScriptCalls + Resource,
{
    fn build(&self, app: &mut App) {
        app.init_resource::<SensorFilterIndex>()
            .add_event::<DestroySensorEvent>()
            .add_systems(
                Update,
                (forget_removed, detect::<S>)
                    .chain()
                    .in_set(TickSet::Detection)
                    .run_if(in_state(AppState::InLevel))
                    .run_if(resource_exists::<S>()),
            )
            .add_systems(
                Update,
                (dispatch::<S>, destroy::<S>)
                    .chain()
                    .in_set(TickSet::Callbacks)
                    .run_if(in_state(AppState::InLevel))
                    .run_if(resource_exists::<S>()),
            );
    }
}

/// Send this event to destroy a sensor. All its sensed entities exit
/// synchronously and the sensor entity is despawned at the end of the tick.
///
/// Sensors whose source entity is gone are destroyed the same way.
#[derive(Event)]
pub struct DestroySensorEvent(Entity);

impl DestroySensorEvent {
    pub fn new(sensor: Entity) -> Self {
        Self(sensor)
    }

    pub fn sensor(&self) -> Entity {
        self.0
    }
}

fn forget_removed(
    mut index: ResMut<SensorFilterIndex>,
    mut sensors: Query<&mut Sensor>,
    mut removed_sensors: RemovedComponents<Sensor>,
    mut removed_targets: RemovedComponents<Detectable>,
) {
    for sensor in removed_sensors.iter() {
        index.remove_sensor(sensor);
    }

    for target in removed_targets.iter() {
        for sensor in index.remove_target(target) {
            if let Ok(mut sensor) = sensors.get_mut(sensor) {
                sensor.forget_target(target);
            }
        }
    }
}

fn detect<S: ScriptCalls + Resource>(
    mut sensors: Query<&mut Sensor>,
    tiles: Res<TileRegistrationMgr>,
    entities: EntityQuery,
    scripts: Res<S>,
    mut index: ResMut<SensorFilterIndex>,
) {
    for mut sensor in sensors.iter_mut() {
        sensor.update(&tiles, &entities, &*scripts, &mut index);
    }
}

fn dispatch<S: ScriptCalls + Resource>(
    mut sensors: Query<&mut Sensor>,
    clock: Res<GameClock>,
    tiles: Res<TileRegistrationMgr>,
    entities: EntityQuery,
    mut scripts: ResMut<S>,
    mut index: ResMut<SensorFilterIndex>,
) {
    let game_time = clock.elapsed();
    for mut sensor in sensors.iter_mut() {
        sensor.update_callbacks(game_time, &tiles, &entities, &mut *scripts, &mut index);
    }
}

fn destroy<S: ScriptCalls + Resource>(
    mut commands: Commands,
    mut events: EventReader<DestroySensorEvent>,
    mut sensors: Query<(Entity, &mut Sensor)>,
    entities: EntityQuery,
    mut scripts: ResMut<S>,
    mut index: ResMut<SensorFilterIndex>,
) {
    let mut doomed: Vec<Entity> = events.iter().map(DestroySensorEvent::sensor).collect();
    doomed.extend(
        sensors
            .iter()
            .filter(|(_, sensor)| !entities.exists(sensor.source()))
            .map(|(entity, _)| entity),
    );
    doomed.sort_unstable();
    doomed.dedup();

    for entity in doomed {
        let Ok((_, mut sensor)) = sensors.get_mut(entity) else {
            continue;
        };
        info!("Destroying sensor {:?}.", entity);
        sensor.destroy(&mut *scripts, &mut index);
        commands.entity(entity).despawn();
    }
}
