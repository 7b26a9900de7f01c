//! Binary encoding of shapes. The layout starts with the [`ShapeKind`] tag
//! followed by kind specific parameters and the state of the last transform
//! update.

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use se_core::codec::{decode_opt_entity, encode_opt_entity};
use se_types::{
    codec::{decode_vec2, encode_vec2},
    rect::WorldRect,
};

use crate::{
    circle::CircleShape,
    cone::ConeShape,
    ray::RayShape,
    rectangle::BoxShape,
    shape::{Shape, ShapeKind},
};

impl Encode for Shape {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.kind().to_u8().encode(encoder)?;

        match self {
            Self::Circle(circle) => {
                circle.min_radius().encode(encoder)?;
                circle.max_radius().encode(encoder)?;
                encode_vec2(circle.position(), encoder)
            }
            Self::Box(shape) => {
                shape.width().encode(encoder)?;
                shape.height().encode(encoder)?;
                shape.use_intersects().encode(encoder)?;
                encode_vec2(shape.position(), encoder)?;
                shape.rect().encode(encoder)
            }
            Self::Cone(cone) => {
                cone.circle().min_radius().encode(encoder)?;
                cone.circle().max_radius().encode(encoder)?;
                cone.angle().encode(encoder)?;
                cone.spread().encode(encoder)?;
                encode_vec2(cone.position(), encoder)?;
                cone.start_angle().encode(encoder)?;
                cone.end_angle().encode(encoder)
            }
            Self::Ray(ray) => {
                encode_vec2(ray.offset_end(), encoder)?;
                encode_opt_entity(ray.target(), encoder)?;
                encode_vec2(ray.start(), encoder)?;
                encode_vec2(ray.end(), encoder)?;
                encode_vec2(ray.hit(), encoder)
            }
        }
    }
}

impl Decode for Shape {
    /// # Panics
    ///
    /// Panics on an unknown shape kind tag.
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let tag = u8::decode(decoder)?;
        let kind = ShapeKind::from_u8(tag)
            .unwrap_or_else(|| panic!("Unknown shape kind tag {tag} in serialized data."));

        let shape = match kind {
            ShapeKind::Circle => {
                let min_radius = f32::decode(decoder)?;
                let max_radius = f32::decode(decoder)?;
                let mut circle = CircleShape::new(min_radius, max_radius);
                circle.update_transform(decode_vec2(decoder)?);
                Self::Circle(circle)
            }
            ShapeKind::Box => {
                let width = f32::decode(decoder)?;
                let height = f32::decode(decoder)?;
                let use_intersects = bool::decode(decoder)?;
                let mut shape = BoxShape::new(width, height, use_intersects);
                let position = decode_vec2(decoder)?;
                shape.restore(position, WorldRect::decode(decoder)?);
                Self::Box(shape)
            }
            ShapeKind::Cone => {
                let min_radius = f32::decode(decoder)?;
                let max_radius = f32::decode(decoder)?;
                let angle = f32::decode(decoder)?;
                let spread = f32::decode(decoder)?;
                let mut cone = ConeShape::new(min_radius, max_radius, angle, spread);
                let position = decode_vec2(decoder)?;
                let start = f32::decode(decoder)?;
                cone.restore(position, start, f32::decode(decoder)?);
                Self::Cone(cone)
            }
            ShapeKind::Ray => {
                let mut ray = RayShape::new(decode_vec2(decoder)?);
                ray.set_target(decode_opt_entity(decoder)?);
                let start = decode_vec2(decoder)?;
                let end = decode_vec2(decoder)?;
                ray.restore(start, end, decode_vec2(decoder)?);
                Self::Ray(ray)
            }
        };
        Ok(shape)
    }
}
