use std::path::{Path, PathBuf};

use bevy::prelude::*;
use chrono::{DateTime, TimeZone};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// Installs the global log collector. Verbosity defaults to INFO and is
/// overridden by `RUST_LOG`.
pub struct LogPlugin {
    directory: Option<PathBuf>,
}

impl LogPlugin {
    /// Logs to stdout only.
    pub fn stdout() -> Self {
        Self { directory: None }
    }

    /// Logs to stdout and to a new file in `directory`.
    pub fn with_file<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }
}

/// The handle for the guard (dropping it will disable the log writer).
#[derive(Resource)]
struct CurrentLogHandle {
    #[allow(dead_code)]
    guard: WorkerGuard,
}

impl Plugin for LogPlugin {
    fn build(&self, app: &mut App) {
        let (file_layer, guard) = match self.directory.as_deref() {
            Some(directory) => {
                let (layer, guard) = file_layer(directory);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let collector = tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    // defaults to INFO if RUST_LOG not set
                    .with_default_directive(Level::INFO.into())
                    .from_env_lossy(),
            )
            .with(fmt::layer().with_writer(std::io::stdout))
            .with(file_layer);
        if let Err(error) = tracing::subscriber::set_global_default(collector) {
            // Another collector keeps logging, the file would stay empty.
            warn!("Unable to set a global collector: {error}");
            return;
        }

        if let Some(guard) = guard {
            app.insert_resource(CurrentLogHandle { guard });
        }
    }
}

fn file_layer<S>(directory: &Path) -> (Box<dyn Layer<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let file_name = log_file_name(&chrono::Local::now());
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
    (layer, guard)
}

fn log_file_name<Tz>(time: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d_%H-%M-%S.log").to_string().into()
}
