//! Configuration loading and catalog definition
//!
//! Configuration resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The config file also carries the resource catalog; when absent, the
//! built-in demo catalog is used.

use crate::error::{Error, Result};
use crate::model::Resource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default port for the review-room service
pub const DEFAULT_PORT: u16 = 5750;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FRAMELINE_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Resource catalog; empty means "use the built-in demo catalog"
    #[serde(default, rename = "resource")]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load configuration, resolving the file location in priority order:
    /// explicit path, `FRAMELINE_CONFIG`, then the platform config dir.
    /// Missing file is not an error; defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Config> {
        match resolve_config_path(explicit_path) {
            Some(path) if path.exists() => Config::from_file(&path),
            Some(_) | None => Ok(Config::default()),
        }
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Resolve the config file path following the priority order
fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Platform config directory
    dirs::config_dir().map(|d| d.join("frameline").join("config.toml"))
}
