//! Server configuration. Reads `~/.plugframe/server.toml`:
//!
//! ```toml
//! log_level = "debug"
//!
//! [capabilities]
//! plan_destroy = true
//! get_provider_schema_optional = false
//! ```

use crate::error::{ServerError, ServerResult};
use crate::metadata::ServerCapabilities;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default `tracing` filter directive, overridden by `PLUGFRAME_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub capabilities: ServerCapabilities,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            capabilities: ServerCapabilities::default(),
        }
    }
}

impl ServerConfig {
    /// Loads `server.toml` from [`config_dir`], falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(config_dir().join("server.toml"))
    }

    /// Loads from an explicit path. A missing or unreadable file yields the
    /// defaults with a log line; use [`ServerConfig::from_path`] to fail instead.
    pub fn load_from(path: PathBuf) -> Self {
        if !path.exists() {
            info!("No server config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => {
                info!("Loaded server config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}. Falling back to default server config.", e);
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> ServerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve the plugframe config directory.
pub fn config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".plugframe")
    } else if let Ok(home) = std::env::var("USERPROFILE") {
        Path::new(&home).join(".plugframe")
    } else {
        PathBuf::from(".plugframe")
    }
}
