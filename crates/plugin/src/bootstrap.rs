//! Plugin load and unload

use std::panic::{catch_unwind, AssertUnwindSafe};

use esapi_core::{ApiConfig, SettingsApi};
use tracing_subscriber::EnvFilter;

pub const NAME: &str = "ExtraSettingsAPI";
pub const AUTHOR: &str = "dollan";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over the configured level. Does nothing if a subscriber
/// is already installed.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The loaded plugin
pub struct Plugin {
    api: SettingsApi,
}

impl Plugin {
    /// Load config from the plugin directory, set up logging and the subsystem
    ///
    /// A config that cannot be read falls back to defaults.
    pub fn load() -> Self {
        let (config, config_error) = match ApiConfig::load() {
            Ok(config) => (config, None),
            Err(e) => (ApiConfig::default(), Some(e)),
        };

        init_logging(config.debug);
        if let Some(e) = config_error {
            tracing::warn!("Failed to load config, using defaults: {}", e);
        }

        Self::with_config(config)
    }

    /// Set up the subsystem with an explicit config
    pub fn with_config(config: ApiConfig) -> Self {
        tracing::info!("{} {} by {} loading...", NAME, VERSION, AUTHOR);
        if !config.bridge.enabled {
            tracing::info!("API bridges are disabled");
        }
        let api = SettingsApi::new(config);
        tracing::info!("Main thread ID: {:?}", std::thread::current().id());
        Self { api }
    }

    pub fn api(&self) -> &SettingsApi {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut SettingsApi {
        &mut self.api
    }

    /// Shut the subsystem down; returns `false` if shutdown panicked
    pub fn unload(mut self) -> bool {
        tracing::info!("{} unloading...", NAME);

        match catch_unwind(AssertUnwindSafe(|| self.api.shutdown())) {
            Ok(()) => true,
            Err(_) => {
                tracing::error!("Panic during shutdown");
                false
            }
        }
    }
}
