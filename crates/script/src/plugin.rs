use bevy::prelude::*;
use se_core::schedule::TickSet;

use crate::service::ScriptBridge;

pub(crate) struct ScriptPlugin;

impl Plugin for ScriptPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            flush
                .in_set(TickSet::Flush)
                .run_if(resource_exists::<ScriptBridge>()),
        );
    }
}

fn flush(mut bridge: ResMut<ScriptBridge>) {
    if bridge.queued() > 0 {
        trace!("Flushing {} queued script calls.", bridge.queued());
        bridge.flush();
    }
}
