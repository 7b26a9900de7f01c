//! This crate implements functionality around Sentinel configuration:
//!
//! * Loading of the configuration from a YAML file. A missing file or a
//!   missing section falls back to defaults.
//!
//! * Parsing, validation and configuration provisioning.

#[macro_use]
mod macros;
mod conf;
mod io;

pub use conf::*;
pub use io::default_conf_path;
pub use macros::ConfigLoadError;
