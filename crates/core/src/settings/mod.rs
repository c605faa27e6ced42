//! Settings storage
//!
//! Values backing the API catalog's getters and setters, plus the widget
//! metadata the event caller hands to slider and access hooks.

mod store;
mod types;

pub use store::SettingsStore;
pub use types::{SettingAccess, SettingInfo, SettingValue, SettingsError, SliderDisplay, SliderInfo};
