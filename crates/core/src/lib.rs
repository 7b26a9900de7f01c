//! Core building blocks shared by all Sentinel crates: entity components and
//! the [`entity::EntityAccess`] view of them, the deterministic game clock and
//! the per-tick system ordering.

use bevy::{app::PluginGroupBuilder, prelude::PluginGroup};
use schedule::TickPlugin;

pub mod clock;
pub mod codec;
mod errors;
pub mod entity;
pub mod schedule;
pub mod state;

pub struct CorePluginGroup;

impl PluginGroup for CorePluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(TickPlugin)
    }
}
