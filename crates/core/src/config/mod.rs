//! Configuration for the settings API
//!
//! TOML file with auto-generated defaults and manual reload. All file
//! operations take an explicit path; [`ApiConfig::load`] resolves the
//! default location next to the plugin binary.
//!
//! # Example
//!
//! ```ignore
//! use esapi_core::config::ApiConfig;
//!
//! let config = ApiConfig::load().unwrap_or_default();
//! if !config.bridge.enabled {
//!     println!("API bridges disabled");
//! }
//! ```

mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{config_path, configs_dir, plugin_base_dir, CONFIG_FILE_NAME};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory from plugin location
    #[error("Config directory not available - could not resolve plugin base path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Controls the free-form API bridges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Discover and patch `ExtraSettingsAPI_*` stubs
    pub enabled: bool,

    /// Promote early-bound calls to patched stubs after patching
    pub promote_call_sites: bool,

    /// Warn about stubs that match no API method
    pub warn_unmatched: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            promote_call_sites: true,
            warn_unmatched: true,
        }
    }
}

/// Settings API configuration
///
/// Loaded from `configs/extra_settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    pub bridge: BridgeConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            bridge: BridgeConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load config from the default location, creating it if missing
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from `path`, creating a default file if missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Replace self with the contents of `path`
    pub fn reload_from(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded config from {:?}", path);
        Ok(())
    }
}
