//! Per-tick ordering of simulation systems.

use bevy::prelude::*;

use crate::{
    clock::{advance_clock, GameClock},
    state::AppState,
};

pub(crate) struct TickPlugin;

impl Plugin for TickPlugin {
    fn build(&self, app: &mut App) {
        app.add_state::<AppState>()
            .init_resource::<GameClock>()
            .configure_sets(
                Update,
                (
                    TickSet::Clock,
                    TickSet::Movement,
                    TickSet::Registration,
                    TickSet::Detection,
                    TickSet::Callbacks,
                    TickSet::Flush,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                advance_clock
                    .in_set(TickSet::Clock)
                    .run_if(in_state(AppState::InLevel)),
            );
    }
}

/// Phases of a single simulation tick, executed in declaration order.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// [`GameClock`] advances.
    Clock,
    /// All changes to [`Transform`] of simulated entities happen here (and in
    /// no other set).
    Movement,
    /// The spatial index and tile overlays catch up with movement.
    Registration,
    /// Sensors collect raw candidates. All sensors finish before any sensor
    /// dispatches callbacks.
    Detection,
    /// Sensors diff candidates and dispatch enter & exit callbacks.
    Callbacks,
    /// Queued script calls are delivered.
    Flush,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Order(Vec<TickSet>);

    fn recorder(set: TickSet) -> impl Fn(ResMut<Order>) {
        move |mut order: ResMut<Order>| order.0.push(set)
    }

    #[test]
    fn test_tick_order() {
        let mut app = App::new();
        app.add_plugins(TickPlugin).init_resource::<Order>();
        // Registered in reverse to make sure the set ordering is what counts.
        for set in [
            TickSet::Flush,
            TickSet::Callbacks,
            TickSet::Detection,
            TickSet::Registration,
            TickSet::Movement,
        ] {
            app.add_systems(Update, recorder(set).in_set(set));
        }

        app.update();
        assert_eq!(
            app.world.resource::<Order>().0,
            vec![
                TickSet::Movement,
                TickSet::Registration,
                TickSet::Detection,
                TickSet::Callbacks,
                TickSet::Flush,
            ]
        );
        assert_eq!(app.world.resource::<GameClock>().ticks(), 0);

        app.world
            .resource_mut::<NextState<AppState>>()
            .set(AppState::InLevel);
        app.update();
        assert_eq!(app.world.resource::<GameClock>().ticks(), 1);
    }
}
