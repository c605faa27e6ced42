//! Settings hook trait
//!
//! A mod handles settings events by implementing [`SettingsHooks`]. Every
//! method defaults to a no-op; [`SettingsHooks::capabilities`] declares which
//! ones are actually implemented, so the caller can tell an unbound hook
//! from one that chose to do nothing.

use esapi_engine::{ModKey, Registry};

use crate::bridge::{ApiCatalog, ExecError};
use crate::settings::{SettingInfo, SettingsError, SettingsStore, SliderInfo};

use super::types::Capabilities;

/// Errors a hook may report
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl HookError {
    /// Message plus the method frames it unwound through, if any
    pub fn clean_trace(&self) -> String {
        match self {
            HookError::Exec(e) => e.clean_trace(),
            other => other.to_string(),
        }
    }
}

/// Result type for hook methods
pub type HookOutcome<T> = Result<T, HookError>;

/// What a hook sees of the subsystem while it runs
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    mod_key: ModKey,
    registry: &'a Registry,
    catalog: &'a ApiCatalog,
    store: &'a SettingsStore,
}

impl<'a> HookContext<'a> {
    pub fn new(
        mod_key: ModKey,
        registry: &'a Registry,
        catalog: &'a ApiCatalog,
        store: &'a SettingsStore,
    ) -> Self {
        Self {
            mod_key,
            registry,
            catalog,
            store,
        }
    }

    /// The mod the hook belongs to
    pub fn mod_key(&self) -> ModKey {
        self.mod_key
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn catalog(&self) -> &'a ApiCatalog {
        self.catalog
    }

    pub fn store(&self) -> &'a SettingsStore {
        self.store
    }

    pub fn in_world(&self) -> bool {
        self.registry.is_in_world()
    }
}

/// Event handlers of one mod
///
/// Only the methods named by [`capabilities`](Self::capabilities) are ever
/// called.
pub trait SettingsHooks: Send {
    /// Hooks this implementation handles
    fn capabilities(&self) -> Capabilities;

    /// Settings menu opened
    fn on_open(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    /// Settings menu closed
    fn on_close(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    /// API loaded for this mod
    fn on_load(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    /// API about to unload for this mod
    fn on_unload(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    /// Settings widgets were built
    fn on_create(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    fn on_world_load(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    fn on_world_exit(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
        Ok(())
    }

    /// Button pressed; `index` is set for multi-buttons
    fn on_button(&mut self, _ctx: &HookContext<'_>, _button: &str, _index: Option<usize>) -> HookOutcome<()> {
        Ok(())
    }

    /// Text shown next to a slider with custom display
    fn on_slider_text(&mut self, _ctx: &HookContext<'_>, slider: &SliderInfo, value: f64) -> HookOutcome<String> {
        Ok(slider.display.render(value))
    }

    /// Visibility of a setting with custom access
    fn on_access_check(&mut self, _ctx: &HookContext<'_>, _setting: &SettingInfo, _in_world: bool) -> HookOutcome<bool> {
        Ok(false)
    }

    /// Input text edited; returns the text and caret to apply
    fn on_input_change(
        &mut self,
        _ctx: &HookContext<'_>,
        _input: &str,
        text: &str,
        caret: usize,
    ) -> HookOutcome<(String, usize)> {
        Ok((text.to_string(), caret))
    }

    /// Input caret moved; returns the caret and selection anchor to apply
    fn on_input_caret_move(
        &mut self,
        _ctx: &HookContext<'_>,
        _input: &str,
        _text: &str,
        caret: usize,
        anchor: usize,
    ) -> HookOutcome<(usize, usize)> {
        Ok((caret, anchor))
    }
}

/// Hooks for a mod that handles nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SettingsHooks for NoHooks {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SliderDisplay;
    use esapi_sdk::{mod_type, ClassDef};

    #[test]
    fn test_default_hooks_pass_through() {
        let registry = Registry::new();
        let catalog = ApiCatalog::empty();
        let store = SettingsStore::new();
        let key = registry
            .register_mod("Alpha", ClassDef::new("Alpha").extends(mod_type()).into_type())
            .unwrap();
        let ctx = HookContext::new(key, &registry, &catalog, &store);

        let mut hooks = NoHooks;
        assert!(hooks.capabilities().is_empty());
        assert_eq!(hooks.on_input_change(&ctx, "name", "abc", 2).unwrap(), ("abc".to_string(), 2));
        assert_eq!(hooks.on_input_caret_move(&ctx, "name", "abc", 1, 3).unwrap(), (1, 3));
        let slider = SliderInfo::new("volume", SliderDisplay::Percent);
        assert_eq!(hooks.on_slider_text(&ctx, &slider, 0.5).unwrap(), "50%");
    }

    #[test]
    fn test_clean_trace_of_plain_error() {
        let err = HookError::Failed("nope".into());
        assert_eq!(err.clean_trace(), "nope");
    }
}
