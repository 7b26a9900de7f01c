//! Demo level: a guard watches a corridor with a sight cone while an intruder
//! patrols the corridor, disappearing behind a pillar.

use std::{f32::consts::FRAC_PI_2, sync::Arc};

use bevy::prelude::*;
use se_core::{
    clock::GameClock,
    entity::{Detectable, EntityScript, Facing, InLight, Initialized, SightPoints},
    log_full_error,
    schedule::TickSet,
    state::AppState,
};
use se_sensor::{Sensor, SensorCallbacks, SensorParams, SensorType};
use se_shape::ConeShape;
use se_tiles::{AttributeLayer, TileFootprint, TileRegistrationMgr};
use se_types::orientation::Orientation;

/// The first row is the top of the level.
const LEVEL: [&str; 16] = [
    "................................",
    "................................",
    "................................",
    "................................",
    "......................#.........",
    "......................#.........",
    "......................#.........",
    "......................#.........",
    "................................",
    "................................",
    "................................",
    "................................",
    "................................",
    "................................",
    "................................",
    "################################",
];

/// Built-in entity scripts used when no script file is configured.
pub(crate) const GUARD_SCRIPT: &str = include_str!("../demos/guard.lua");

pub(crate) struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup).add_systems(
            Update,
            patrol
                .in_set(TickSet::Movement)
                .run_if(in_state(AppState::InLevel)),
        );
    }
}

/// Moves the entity back and forth between two points.
#[derive(Component)]
struct Patrol {
    from: Vec2,
    to: Vec2,
    /// Units per second.
    speed: f32,
}

fn setup(
    mut commands: Commands,
    mut tiles: ResMut<TileRegistrationMgr>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let layer = match AttributeLayer::from_rows(&LEVEL) {
        Ok(layer) => layer,
        Err(error) => {
            log_full_error!(error, "Invalid demo level");
            return;
        }
    };
    tiles.set_level_layer(Arc::new(layer));

    let guard = commands
        .spawn((
            Transform::from_xyz(6., 10., 0.),
            // Looking right.
            Facing(Orientation::new(FRAC_PI_2, false)),
            EntityScript("guard".to_owned()),
            Initialized,
            TileFootprint::default(),
        ))
        .id();

    let intruder = commands
        .spawn((
            Transform::from_xyz(4., 10., 0.),
            Patrol {
                from: Vec2::new(4., 10.),
                to: Vec2::new(30., 10.),
                speed: 4.,
            },
            Detectable::ALL,
            SightPoints(vec![Vec2::ZERO]),
            InLight,
            Initialized,
            TileFootprint::default(),
        ))
        .id();
    info!("Guard {:?} watches intruder {:?}.", guard, intruder);

    let sensor = commands.spawn_empty().id();
    let mut params = SensorParams::new(SensorType::Sight, guard);
    params.shape = Some(ConeShape::new(0.5, 20., 0., FRAC_PI_2).into());
    params.delay = 0.25;
    params.callbacks = SensorCallbacks {
        on_enter: "on_enter".to_owned(),
        on_exit: "on_exit".to_owned(),
        on_filter: "on_filter".to_owned(),
    };
    match Sensor::new(sensor, params) {
        Ok(component) => {
            commands.entity(sensor).insert(component);
        }
        Err(error) => {
            log_full_error!(error, "Invalid demo sensor");
            commands.entity(sensor).despawn();
        }
    }

    next_state.set(AppState::InLevel);
}

fn patrol(clock: Res<GameClock>, mut patrols: Query<(&mut Transform, &mut Patrol)>) {
    let step = clock.step() as f32;
    for (mut transform, mut patrol) in patrols.iter_mut() {
        let position = transform.translation.truncate();
        let remaining = patrol.to - position;
        let distance = patrol.speed * step;

        let position = if remaining.length() <= distance {
            let turn = patrol.to;
            patrol.to = patrol.from;
            patrol.from = turn;
            turn
        } else {
            position + remaining.normalize() * distance
        };
        transform.translation = position.extend(transform.translation.z);
    }
}
