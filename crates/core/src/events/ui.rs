//! Settings UI collaborator

use esapi_engine::ModKey;

/// The widget layer the event caller drives
pub trait SettingsUi {
    /// Build the settings widgets of a mod
    fn build_settings(&mut self, key: ModKey, mod_name: &str);

    /// Re-evaluate which of a mod's settings are visible
    fn refresh_visibility(&mut self, key: ModKey);
}

/// UI that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUi;

impl SettingsUi for NoopUi {
    fn build_settings(&mut self, _key: ModKey, _mod_name: &str) {}

    fn refresh_visibility(&mut self, _key: ModKey) {}
}
