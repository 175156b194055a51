pub mod schema;

pub use schema::{AppConfig, ServerConfig, SourceConfig, StoreConfig, WindowConfig};

use std::path::{Path, PathBuf};
use winavg_core::{AvgError, Result};

/// Load configuration from a TOML file.  Returns `AppConfig::default()` if
/// the file doesn't exist so the tool always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(AppConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| AvgError::Config(format!("cannot read '{}': {e}", path.display())))?;

    toml::from_str(&raw).map_err(|e| AvgError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
        .join("winavg")
        .join("winavg.toml")
}

/// Directory for the file-backed store when none is configured,
/// honouring `$XDG_DATA_HOME`.
pub fn default_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share").join("winavg")
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(fallback)
        })
}

impl StoreConfig {
    /// Configured store directory, or the XDG default.
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_data_dir)
    }
}
