//! This module implements final (i.e. parsed and validated) configuration
//! objects and their building from the configuration file sections.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

type CheckResult = Result<(), Vec<(String, String)>>;

/// Collects a failed check.
fn ensure(errors: &mut Vec<(String, String)>, condition: bool, field: &str, message: &str) {
    if !condition {
        errors.push((field.to_owned(), message.to_owned()));
    }
}

fn finish(errors: Vec<(String, String)>) -> CheckResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// --------------------
// Sections hold deserialized data before validation and conversion into
// final configuration objects.

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Log {
    directory: PathBuf,
    file: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Scripts {
    main: Option<PathBuf>,
    filter_timeout_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    tick_rate: f64,
    duration: f64,
}

impl Log {
    fn check(&self) -> CheckResult {
        let mut errors = Vec::new();
        ensure(
            &mut errors,
            !self.directory.as_os_str().is_empty(),
            "directory",
            "`directory` must not be empty.",
        );
        finish(errors)
    }
}

impl Scripts {
    fn check(&self) -> CheckResult {
        let mut errors = Vec::new();
        ensure(
            &mut errors,
            self.filter_timeout_ms > 0,
            "filter_timeout_ms",
            "`filter_timeout_ms` must be positive.",
        );
        finish(errors)
    }
}

impl Simulation {
    fn check(&self) -> CheckResult {
        let mut errors = Vec::new();
        ensure(
            &mut errors,
            self.tick_rate.is_finite(),
            "tick_rate",
            "`tick_rate` must be a finite number.",
        );
        ensure(
            &mut errors,
            self.tick_rate > 0.,
            "tick_rate",
            "`tick_rate` must be positive.",
        );
        ensure(
            &mut errors,
            self.duration.is_finite(),
            "duration",
            "`duration` must be a finite number.",
        );
        ensure(
            &mut errors,
            self.duration >= 0.,
            "duration",
            "`duration` must be greater than or equal to 0.0.",
        );
        finish(errors)
    }
}

// ---- default implementations ----

impl Default for Log {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file: true,
        }
    }
}

impl Default for Scripts {
    fn default() -> Self {
        Self {
            main: None,
            filter_timeout_ms: 50,
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            tick_rate: 60.,
            duration: 10.,
        }
    }
}

// --------------------

#[derive(Debug, Clone)]
pub struct LogConf {
    directory: PathBuf,
    file: bool,
}

impl From<Log> for LogConf {
    fn from(log: Log) -> Self {
        Self {
            directory: log.directory,
            file: log.file,
        }
    }
}

impl LogConf {
    /// Directory of log files.
    pub fn directory(&self) -> &std::path::Path {
        self.directory.as_path()
    }

    /// Whether logs are written to a file in addition to stdout.
    pub fn file(&self) -> bool {
        self.file
    }
}

#[derive(Debug, Clone)]
pub struct ScriptsConf {
    main: Option<PathBuf>,
    filter_timeout: Duration,
}

impl From<Scripts> for ScriptsConf {
    fn from(scripts: Scripts) -> Self {
        Self {
            main: scripts.main,
            filter_timeout: Duration::from_millis(scripts.filter_timeout_ms),
        }
    }
}

impl ScriptsConf {
    /// Lua file defining entity scripts. The built-in demo script is used
    /// if it is not set.
    pub fn main(&self) -> Option<&std::path::Path> {
        self.main.as_deref()
    }

    /// Maximum time the simulation waits for a single filter verdict. Filter
    /// requests which time out reject the candidate.
    pub fn filter_timeout(&self) -> Duration {
        self.filter_timeout
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConf {
    tick_rate: f64,
    duration: f64,
}

impl From<Simulation> for SimulationConf {
    fn from(simulation: Simulation) -> Self {
        Self {
            tick_rate: simulation.tick_rate,
            duration: simulation.duration,
        }
    }
}

impl SimulationConf {
    /// Number of simulation ticks per second of game time.
    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Game time in seconds the simulation runs for.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Total number of ticks to simulate.
    pub fn ticks(&self) -> u64 {
        (self.tick_rate * self.duration).round() as u64
    }
}

// Bundle configuration neatly into a single struct
bundle_config!(
    log: LogConf: Log,
    scripts: ScriptsConf: Scripts,
    simulation: SimulationConf: Simulation
);
