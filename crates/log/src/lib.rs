//! Global `tracing` subscriber writing to stdout and optionally to a log
//! file named after the start time.

mod setup;

pub use crate::setup::LogPlugin;
