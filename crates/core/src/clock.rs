use bevy::prelude::*;

/// Deterministic simulation time. It advances by a fixed step every tick
/// spent in a level, independently of real elapsed time.
#[derive(Resource, Clone, Copy, Debug)]
pub struct GameClock {
    step: f64,
    ticks: u64,
}

impl GameClock {
    pub const DEFAULT_TICK_RATE: f64 = 60.;

    /// # Panics
    ///
    /// Panics if `tick_rate` is not a finite positive number.
    pub fn new(tick_rate: f64) -> Self {
        assert!(
            tick_rate.is_finite() && tick_rate > 0.,
            "Invalid tick rate: {tick_rate}"
        );
        Self {
            step: tick_rate.recip(),
            ticks: 0,
        }
    }

    /// Game time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.step
    }

    /// Duration of a single tick in seconds.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TICK_RATE)
    }
}

pub(crate) fn advance_clock(mut clock: ResMut<GameClock>) {
    clock.advance();
}
