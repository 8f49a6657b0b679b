//! Server configuration: TOML file plus environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "FISH_FRENZY_CONFIG";
/// Listen address override.
pub const ADDR_ENV: &str = "FISH_FRENZY_ADDR";
/// Database path override (`:memory:` for an ephemeral store).
pub const DB_ENV: &str = "FISH_FRENZY_DB";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "fish-frenzy.toml";

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// SQLite file, or `:memory:`
    pub database: String,
    /// Directory with the built wasm bundle and HTML, served for unknown paths
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            database: "fish-frenzy.db".to_string(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a `.toml` file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the effective config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// An explicitly named config file must exist; the default one is optional.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(db) = lookup(DB_ENV).filter(|v| !v.trim().is_empty()) {
            self.database = db;
        }
    }
}
