//! Test utilities shared by Sentinel crates: an in-memory entity store, a
//! recording script layer and deterministic point generation.

pub use entities::TestEntities;
use glam::Vec2;
pub use scripts::RecordingScripts;

mod entities;
mod scripts;

/// Generates deterministic pseudo random points.
///
/// # Arguments
///
/// * `seed` - points generated with the same seed are identical across
///   calls and platforms.
///
/// * `number` - number of generated points.
///
/// * `max_value` - both coordinates of all points lie in `[0, max_value)`.
pub fn scatter_points(seed: u64, number: usize, max_value: f32) -> Vec<Vec2> {
    let rng = fastrand::Rng::with_seed(seed);
    (0..number)
        .map(|_| max_value * Vec2::new(rng.f32(), rng.f32()))
        .collect()
}
