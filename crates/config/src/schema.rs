use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `winavg.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote number source (test server) settings.
    pub source: SourceConfig,
    /// Sliding window settings.
    pub window: WindowConfig,
    /// Where the window state is persisted.
    pub store: StoreConfig,
    /// Local microservice settings.
    pub server: ServerConfig,
}

/// Connection settings for the remote number source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL; the kind route (`primes`, `fibo`, …) is appended to it.
    pub base_url: String,
    /// Bearer token sent in the `Authorization` header.
    pub access_code: String,
    /// Sent as `X-Client-Id` when non-empty.
    pub client_id: String,
    /// Sent as `X-Client-Name` when non-empty.
    pub client_name: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url:    "http://20.244.56.144/test".to_string(),
            access_code: String::new(),
            client_id:   String::new(),
            client_name: String::new(),
            timeout_ms:  5_000,
        }
    }
}

/// Sliding window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window size used when the caller does not supply one.
    pub size: i64,
    /// Key under which the state is stored.
    pub storage_key: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size:        10,
            storage_key: "calculator_window_state".to_string(),
        }
    }
}

/// Persistence backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one file per key. `None` = `$XDG_DATA_HOME/winavg`.
    pub directory: Option<PathBuf>,
    /// Keep state in memory only (lost on exit).
    pub in_memory: bool,
}

/// Local microservice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"127.0.0.1:9876"`.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:9876".to_string(),
        }
    }
}
