use anyhow::{Context, Result};
use async_std::{
    fs,
    path::{Path, PathBuf},
};
use bevy::prelude::info;

/// Returns the default location of the configuration file in the user
/// configuration directory.
pub fn default_conf_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| PathBuf::from(base).join("Sentinel").join("conf.yaml"))
}

/// Loads configuration file to a string. Returns Ok(None) if the configuration
/// file does not exist.
pub(crate) async fn load_conf_text(path: &Path) -> Result<Option<String>> {
    if path.is_file().await {
        info!("Loading configuration from {}", path.to_string_lossy());
        fs::read_to_string(path).await.map(Some).with_context(|| {
            format!(
                "Could not load Sentinel configuration file: {}",
                path.to_string_lossy(),
            )
        })
    } else {
        info!(
            "Configuration does not exist or is not a file, using defaults: {}",
            path.to_string_lossy()
        );
        Ok(None)
    }
}
