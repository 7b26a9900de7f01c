//! Binary (de)serialization helpers used for save games and input recording
//! playback.
//!
//! The layout is defined by the order of encode calls; decoders must read
//! fields in exactly the same order.

use bincode::{
    config::{self, Configuration},
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use glam::Vec2;

use crate::{orientation::Orientation, rect::WorldRect};

const CONFIG: Configuration = config::standard();

/// Serializes a value into a new buffer.
pub fn to_bytes<T: Encode>(value: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::encode_to_vec(value, CONFIG)
}

/// Deserializes a value from a buffer. Trailing bytes are ignored.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    bincode::decode_from_slice(bytes, CONFIG).map(|(value, _)| value)
}

pub fn encode_vec2<E: Encoder>(vec: Vec2, encoder: &mut E) -> Result<(), EncodeError> {
    vec.x.encode(encoder)?;
    vec.y.encode(encoder)
}

pub fn decode_vec2<D: Decoder>(decoder: &mut D) -> Result<Vec2, DecodeError> {
    let x = f32::decode(decoder)?;
    let y = f32::decode(decoder)?;
    Ok(Vec2::new(x, y))
}

impl Encode for WorldRect {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        encode_vec2(self.min(), encoder)?;
        encode_vec2(self.max(), encoder)
    }
}

impl Decode for WorldRect {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let min = decode_vec2(decoder)?;
        let max = decode_vec2(decoder)?;
        Ok(Self::new(min, max))
    }
}

impl Encode for Orientation {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.angle().encode(encoder)?;
        self.flip_x().encode(encoder)
    }
}

impl Decode for Orientation {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let angle = f32::decode(decoder)?;
        let flip_x = bool::decode(decoder)?;
        Ok(Self::new(angle, flip_x))
    }
}
