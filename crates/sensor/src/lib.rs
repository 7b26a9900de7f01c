//! Entity sensors: per-tick detection of entities in range of a shape (or a
//! single fixed target), scripted filtering, line of sight checks and
//! enter/exit notifications of the source entity script.

pub use crate::{
    delay::DelayedEntities,
    filter::SensorFilterIndex,
    sensor::{
        Sensor, SensorCallbacks, SensorError, SensorFlags, SensorParams, SensorPosition,
        SensorType,
    },
    systems::{DestroySensorEvent, SensorPlugin},
};

mod codec;
mod delay;
mod filter;
mod sensor;
mod systems;
