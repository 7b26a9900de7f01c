//! Geometric predicates used by sensors to test spatial range.
//!
//! A [`Shape`] is a closed set of four kinds: [`CircleShape`] (optionally an
//! annulus), [`BoxShape`], [`ConeShape`] (a circular sector) and
//! [`RayShape`] (a line segment clipped by light blocking tiles). All tests
//! are boundary inclusive.
//!
//! Shapes are positioned in world space by [`Shape::update_transform`] and
//! then queried against points, rectangles, each other or against entities
//! registered in [`se_tiles::TileRegistrationMgr`].

pub use crate::{
    circle::CircleShape,
    cone::ConeShape,
    ray::{RayContext, RayShape},
    rectangle::BoxShape,
    shape::{Shape, ShapeKind},
};

mod circle;
mod codec;
mod cone;
mod ray;
mod rectangle;
mod script;
mod shape;
