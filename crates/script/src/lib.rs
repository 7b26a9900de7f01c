//! Calls from the simulation into entity scripts.
//!
//! Scripts are owned by a [`ScriptHost`] living on a dedicated thread. The
//! simulation talks to it only through the [`ScriptBridge`] resource: filter
//! predicates are request/response round trips with a timeout, other
//! callbacks are either delivered immediately or queued and flushed once per
//! tick.

mod call;
mod host;
mod lua;
mod plugin;
mod service;

use bevy::{app::PluginGroupBuilder, prelude::PluginGroup};
use plugin::ScriptPlugin;

pub use crate::{
    call::{ScriptArg, ScriptCall, ScriptCalls},
    host::{ScriptError, ScriptHost},
    lua::LuaHost,
    service::{ScriptBridge, ScriptService},
};

pub struct ScriptPluginGroup;

impl PluginGroup for ScriptPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(ScriptPlugin)
    }
}
