use std::path::Path;

use anyhow::{Context, Result};
use async_std::{path::PathBuf, task};
use bevy::prelude::*;
use se_conf::{default_conf_path, Configuration, ScriptsConf};
use se_core::{clock::GameClock, CorePluginGroup};
use se_log::LogPlugin;
use se_script::{LuaHost, ScriptBridge, ScriptPluginGroup, ScriptService};
use se_sensor::{Sensor, SensorPlugin};
use se_tiles::TilesPluginGroup;

use crate::demo::{DemoPlugin, GUARD_SCRIPT};

mod demo;

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_SHA: &str = env!("GIT_SHA");

/// Runs the demo level for the configured duration. The first argument, if
/// given, is the path to the configuration file.
fn main() -> Result<()> {
    let conf = load_conf()?;

    let mut app = App::new();
    let log = if conf.log().file() {
        LogPlugin::with_file(conf.log().directory())
    } else {
        LogPlugin::stdout()
    };
    app.add_plugins(log);

    // This has to be after LogPlugin is inserted.
    info!(
        "Starting Sentinel {{ \"Version\": \"{}\", \"GitSha\": \"{}\" }}",
        CARGO_PKG_VERSION, GIT_SHA
    );

    let bridge = start_scripts(conf.scripts()).context("Failed to start the script service")?;
    app.add_plugins((
        CorePluginGroup,
        TilesPluginGroup,
        ScriptPluginGroup,
        SensorPlugin::<ScriptBridge>::default(),
        DemoPlugin,
    ))
    .insert_resource(GameClock::new(conf.simulation().tick_rate()))
    .insert_resource(bridge);

    let ticks = conf.simulation().ticks();
    info!("Simulating {ticks} ticks.");
    for _ in 0..ticks {
        app.update();
    }

    let clock = *app.world.resource::<GameClock>();
    let mut sensors = app.world.query::<(Entity, &Sensor)>();
    for (entity, sensor) in sensors.iter(&app.world) {
        info!(
            "Sensor {:?} senses {:?} at {:.2}s.",
            entity,
            sensor.sensed_entities(),
            clock.elapsed()
        );
    }

    Ok(())
}

fn load_conf() -> Result<Configuration> {
    let path = match std::env::args_os().nth(1) {
        Some(path) => Some(PathBuf::from(path)),
        None => default_conf_path(),
    };

    match path {
        Some(path) => task::block_on(Configuration::load(path.as_path()))
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Configuration::default()),
    }
}

fn start_scripts(conf: &ScriptsConf) -> Result<ScriptBridge> {
    let main = conf.main().map(Path::to_path_buf);
    let bridge = ScriptService::spawn(
        move || match main {
            Some(path) => LuaHost::from_file(path),
            None => {
                let host = LuaHost::new();
                host.exec(GUARD_SCRIPT, "guard.lua")?;
                Ok(host)
            }
        },
        conf.filter_timeout(),
    )?;
    Ok(bridge)
}
