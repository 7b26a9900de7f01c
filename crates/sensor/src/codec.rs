//! Binary encoding of sensors for save games.
//!
//! Filter verdicts and the ray trace cache are not stored, they are
//! recomputed during the first tick after load.

use bevy::prelude::Entity;
use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use glam::Vec2;
use se_core::codec::{decode_entity, decode_opt_entity, encode_entity, encode_opt_entity};
use se_shape::Shape;
use se_tiles::RayTracer;
use se_types::codec::{decode_vec2, encode_vec2};

use crate::{
    delay::DelayedEntities,
    filter::FilterCache,
    sensor::{Detection, Sensor, SensorCallbacks, SensorFlags, SensorPosition, SensorType},
};

const POSITION_SOURCE: u8 = 0;
const POSITION_WORLD: u8 = 1;

impl Encode for Sensor {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        encode_entity(self.entity, encoder)?;
        self.sensor_type.to_u8().encode(encoder)?;
        encode_entity(self.source, encoder)?;
        encode_opt_entity(self.target, encoder)?;

        let (tag, position) = match self.position {
            SensorPosition::Source(offset) => (POSITION_SOURCE, offset),
            SensorPosition::World(position) => (POSITION_WORLD, position),
        };
        tag.encode(encoder)?;
        encode_vec2(position, encoder)?;

        self.enabled.encode(encoder)?;
        self.suspended.encode(encoder)?;
        self.delay.encode(encoder)?;
        encode_vec2(self.ray_trace_offset, encoder)?;

        self.callbacks.on_enter.encode(encoder)?;
        self.callbacks.on_exit.encode(encoder)?;
        self.callbacks.on_filter.encode(encoder)?;

        self.flags.enabled_in_darkness.encode(encoder)?;
        self.flags.ignore_own_collision.encode(encoder)?;
        self.flags.ignore_active_collision.encode(encoder)?;
        self.flags.distance_sort.encode(encoder)?;

        self.script.encode(encoder)?;
        encode_vec2(self.world_position, encoder)?;
        self.shape.encode(encoder)?;

        self.sensed.len().encode(encoder)?;
        for &entity in &self.sensed {
            encode_entity(entity, encoder)?;
        }

        let delayed = self.delayed.entries();
        delayed.len().encode(encoder)?;
        for &(entity, time) in delayed {
            encode_entity(entity, encoder)?;
            time.encode(encoder)?;
        }
        Ok(())
    }
}

impl Decode for Sensor {
    /// # Panics
    ///
    /// Panics on an unknown sensor type or position tag.
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let entity = decode_entity(decoder)?;
        let type_tag = u8::decode(decoder)?;
        let sensor_type = SensorType::from_u8(type_tag)
            .unwrap_or_else(|| panic!("Unhandled sensor type {type_tag} in serialized data."));
        let source = decode_entity(decoder)?;
        let target = decode_opt_entity(decoder)?;

        let position_tag = u8::decode(decoder)?;
        let position = decode_vec2(decoder)?;
        let position = match position_tag {
            POSITION_SOURCE => SensorPosition::Source(position),
            POSITION_WORLD => SensorPosition::World(position),
            tag => panic!("Unknown sensor position tag {tag} in serialized data."),
        };

        let enabled = bool::decode(decoder)?;
        let suspended = bool::decode(decoder)?;
        let delay = f32::decode(decoder)?;
        let ray_trace_offset = decode_vec2(decoder)?;

        let callbacks = SensorCallbacks {
            on_enter: String::decode(decoder)?,
            on_exit: String::decode(decoder)?,
            on_filter: String::decode(decoder)?,
        };
        let flags = SensorFlags {
            enabled_in_darkness: bool::decode(decoder)?,
            ignore_own_collision: bool::decode(decoder)?,
            ignore_active_collision: bool::decode(decoder)?,
            distance_sort: bool::decode(decoder)?,
        };

        let script = Option::<String>::decode(decoder)?;
        let world_position: Vec2 = decode_vec2(decoder)?;
        let shape = Option::<Shape>::decode(decoder)?;

        let sensed_len = usize::decode(decoder)?;
        let mut sensed = Vec::with_capacity(sensed_len.min(1024));
        for _ in 0..sensed_len {
            sensed.push(decode_entity(decoder)?);
        }

        let delayed_len = usize::decode(decoder)?;
        let mut delayed: Vec<(Entity, f64)> = Vec::with_capacity(delayed_len.min(1024));
        for _ in 0..delayed_len {
            let entity = decode_entity(decoder)?;
            delayed.push((entity, f64::decode(decoder)?));
        }

        Ok(Self {
            entity,
            sensor_type,
            source,
            target,
            shape,
            position,
            enabled,
            suspended,
            delay,
            ray_trace_offset,
            callbacks,
            flags,
            script,
            world_position,
            sensed,
            delayed: DelayedEntities::from_entries(delayed),
            current: Vec::new(),
            detection: Detection::Skipped,
            filters: FilterCache::default(),
            tracer: RayTracer::default(),
        })
    }
}
