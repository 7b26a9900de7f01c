//! Binary encoding of entity handles.
//!
//! Handles are stored as their full bit representation (index and
//! generation). Decoded handles are only meaningful within the world they
//! were encoded from, save games therefore keep entity ids stable on load.

use bevy::prelude::Entity;
use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};

pub fn encode_entity<E: Encoder>(entity: Entity, encoder: &mut E) -> Result<(), EncodeError> {
    entity.to_bits().encode(encoder)
}

pub fn decode_entity<D: Decoder>(decoder: &mut D) -> Result<Entity, DecodeError> {
    u64::decode(decoder).map(Entity::from_bits)
}

pub fn encode_opt_entity<E: Encoder>(
    entity: Option<Entity>,
    encoder: &mut E,
) -> Result<(), EncodeError> {
    entity.map(Entity::to_bits).encode(encoder)
}

pub fn decode_opt_entity<D: Decoder>(decoder: &mut D) -> Result<Option<Entity>, DecodeError> {
    Option::<u64>::decode(decoder).map(|bits| bits.map(Entity::from_bits))
}
