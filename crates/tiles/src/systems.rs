//! Systems keeping the tile registrations in sync with the ECS world.

use ahash::AHashMap;
use bevy::prelude::*;
use se_core::{
    entity::{EntityAccess, EntityQuery, Facing, TouchShape},
    schedule::TickSet,
    state::AppState,
};
use se_types::{rect::TileRect, tile::world_to_tile};

use crate::mgr::TileRegistrationMgr;

type ChangedFootprints<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static TileFootprint),
    Or<(
        Changed<TileFootprint>,
        Changed<Transform>,
        Changed<TouchShape>,
        Changed<Facing>,
    )>,
>;

/// Bevy plugin which registers entities with [`TileFootprint`] to the
/// [`TileRegistrationMgr`] cell index and emits tile change events.
///
/// Newly spawned entities are registered, moved entities move-registered and
/// despawned entities unregistered. The systems run only while a level is
/// loaded.
pub(crate) struct TilesPlugin;

impl Plugin for TilesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileRegistrationMgr>()
            .init_resource::<Footprints>()
            .add_event::<TileChangedEvent>()
            .add_event::<SolidityChangedEvent>()
            .add_systems(OnEnter(AppState::InLevel), register_all)
            .add_systems(OnExit(AppState::InLevel), cleanup)
            .add_systems(
                Update,
                (update_footprints, remove_footprints, notify_tile_changes)
                    .chain()
                    .in_set(TickSet::Registration)
                    .run_if(in_state(AppState::InLevel)),
            );
    }
}

/// Entities with this component are registered to the cell index over the
/// tiles covered by their touch rectangle (or by their center if they have
/// no touch shape).
#[derive(Component, Clone, Copy, Debug)]
pub struct TileFootprint {
    /// Entities with disabled registration are silently left out.
    pub enabled: bool,
}

impl Default for TileFootprint {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Sent once per tick to each initialized entity registered around tiles
/// whose content changed.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileChangedEvent(Entity);

impl TileChangedEvent {
    pub fn entity(&self) -> Entity {
        self.0
    }
}

/// Sent when a tile switches between solid and non-solid, for example to
/// let fluids flow.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidityChangedEvent(IVec2);

impl SolidityChangedEvent {
    pub fn tile(&self) -> IVec2 {
        self.0
    }
}

/// Last registration rectangle of each registered entity.
#[derive(Resource, Default)]
struct Footprints(AHashMap<Entity, TileRect>);

fn footprint_rect(entities: &EntityQuery, entity: Entity) -> Option<TileRect> {
    entities
        .touch_rect(entity)
        .map(|rect| rect.to_tile_rect())
        .or_else(|| {
            entities
                .center_position(entity)
                .map(|center| TileRect::from_tile(world_to_tile(center)))
        })
}

fn update_footprints(
    mut mgr: ResMut<TileRegistrationMgr>,
    mut footprints: ResMut<Footprints>,
    entities: EntityQuery,
    changed: ChangedFootprints,
) {
    for (entity, footprint) in changed.iter() {
        sync_footprint(&mut mgr, &mut footprints, &entities, entity, footprint);
    }
}

/// Registers all entities when a level is entered. Registrations are dropped
/// on level exit, and entities which did not change since then would be
/// missed by [`update_footprints`].
fn register_all(
    mut mgr: ResMut<TileRegistrationMgr>,
    mut footprints: ResMut<Footprints>,
    entities: EntityQuery,
    all: Query<(Entity, &TileFootprint)>,
) {
    for (entity, footprint) in all.iter() {
        sync_footprint(&mut mgr, &mut footprints, &entities, entity, footprint);
    }
}

fn sync_footprint(
    mgr: &mut TileRegistrationMgr,
    footprints: &mut Footprints,
    entities: &EntityQuery,
    entity: Entity,
    footprint: &TileFootprint,
) {
    let new = if footprint.enabled {
        footprint_rect(entities, entity)
    } else {
        None
    };

    match (footprints.0.get(&entity).copied(), new) {
        (None, None) => (),
        (None, Some(new)) => {
            mgr.register_entity_handle(&new, entity);
            footprints.0.insert(entity, new);
        }
        (Some(old), Some(new)) => {
            if old != new {
                mgr.move_register_entity_handle(&old, &new, entity);
                footprints.0.insert(entity, new);
            }
        }
        (Some(old), None) => {
            mgr.unregister_entity_handle(&old, entity);
            footprints.0.remove(&entity);
        }
    }
}

fn remove_footprints(
    mut mgr: ResMut<TileRegistrationMgr>,
    mut footprints: ResMut<Footprints>,
    mut removed: RemovedComponents<TileFootprint>,
) {
    for entity in removed.iter() {
        if let Some(rect) = footprints.0.remove(&entity) {
            mgr.unregister_entity_handle(&rect, entity);
        }
    }
}

fn notify_tile_changes(
    mut mgr: ResMut<TileRegistrationMgr>,
    entities: EntityQuery,
    mut tile_events: EventWriter<TileChangedEvent>,
    mut solidity_events: EventWriter<SolidityChangedEvent>,
) {
    tile_events.send_batch(mgr.update(&entities).into_iter().map(TileChangedEvent));
    solidity_events.send_batch(
        mgr.take_solidity_changes()
            .into_iter()
            .map(SolidityChangedEvent),
    );
}

fn cleanup(mut mgr: ResMut<TileRegistrationMgr>, mut footprints: ResMut<Footprints>) {
    mgr.reset();
    footprints.0.clear();
}
