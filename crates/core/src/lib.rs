//! Extra Settings API - Core Logic
//!
//! Hook bridging, event dispatch and the settings subsystem.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Type references, method signatures and well-known names
//! - [`engine`] - Mod registry
//!
//! # Example
//!
//! ```ignore
//! use esapi_core::{ApiConfig, ModDescriptor, NoopUi, SettingsApi};
//! use esapi_core::sdk::{mod_type, ClassDef};
//!
//! let mut api = SettingsApi::new(ApiConfig::default());
//! let main = ClassDef::new("MyMod").extends(mod_type()).into_type();
//! let key = api.load_mod(ModDescriptor::new("MyMod", main))?;
//! api.open_settings(&mut NoopUi);
//! ```

pub use esapi_engine as engine;
pub use esapi_sdk as sdk;

pub mod api;
pub mod assembly;
pub mod bridge;
pub mod config;
pub mod events;
pub mod settings;

// Re-export commonly used items
pub use api::{ApiError, ConstructError, ModDescriptor, SettingsApi, SettingsHolder};
pub use assembly::{ClassEntry, Instruction, MethodBody, ModAssembly, Value};
pub use bridge::{install_bridges, ApiCatalog, BridgeReport, ExecError, SynthesisError};
pub use config::{ApiConfig, BridgeConfig, ConfigError, ConfigResult};
pub use events::{
    Capabilities, EventCaller, EventKind, HookContext, HookError, HookOutcome, NoopUi, SettingsHooks,
    SettingsUi,
};
pub use settings::{SettingAccess, SettingInfo, SettingValue, SettingsStore, SliderDisplay, SliderInfo};
