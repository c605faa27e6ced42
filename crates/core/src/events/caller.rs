//! Per-mod event dispatch

use std::panic::{catch_unwind, AssertUnwindSafe};

use esapi_engine::ModKey;
use tracing::{error, trace, warn};

use crate::settings::{SettingInfo, SliderInfo};

use super::hooks::{HookContext, HookOutcome, SettingsHooks};
use super::types::{Capabilities, EventKind};
use super::ui::SettingsUi;

/// Text shown for a custom slider whose hook is missing or failed
pub const SLIDER_FALLBACK_TEXT: &str = "{null}";

/// Dispatches settings events to one mod's hooks
///
/// Hook errors and panics stop at this boundary: they are logged with the
/// mod's display name and the call returns its fallback.
pub struct EventCaller {
    key: ModKey,
    display_name: String,
    hooks: Box<dyn SettingsHooks>,
    capabilities: Capabilities,
}

impl EventCaller {
    pub fn new(key: ModKey, display_name: impl Into<String>, hooks: Box<dyn SettingsHooks>) -> Self {
        let capabilities = hooks.capabilities();
        Self {
            key,
            display_name: display_name.into(),
            hooks,
            capabilities,
        }
    }

    pub fn key(&self) -> ModKey {
        self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Hooks bound at construction
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.capabilities.handles(kind)
    }

    /// Fire a payload-free event
    ///
    /// Button and input events are ignored here, as are slider and access
    /// events, which only make sense through their typed calls.
    pub fn call(&mut self, kind: EventKind, ctx: &HookContext<'_>, ui: &mut dyn SettingsUi) {
        if !kind.is_generic() {
            trace!("[{}] {} has a dedicated call path", self.display_name, kind);
            return;
        }

        match kind {
            EventKind::Create => ui.build_settings(self.key, &self.display_name),
            EventKind::Open => ui.refresh_visibility(self.key),
            EventKind::Load => ctx.registry().set_api_loaded(self.key, true),
            EventKind::Unload => ctx.registry().set_api_loaded(self.key, false),
            _ => {}
        }

        if !self.handles(kind) {
            return;
        }

        self.guard(kind, |hooks| match kind {
            EventKind::Open => hooks.on_open(ctx),
            EventKind::Close => hooks.on_close(ctx),
            EventKind::Load => hooks.on_load(ctx),
            EventKind::Unload => hooks.on_unload(ctx),
            EventKind::Create => hooks.on_create(ctx),
            EventKind::WorldLoad => hooks.on_world_load(ctx),
            EventKind::WorldExit => hooks.on_world_exit(ctx),
            _ => Ok(()),
        });
    }

    pub fn button_press(&mut self, ctx: &HookContext<'_>, button: &str) {
        if self.handles(EventKind::Button) {
            self.guard(EventKind::Button, |hooks| hooks.on_button(ctx, button, None));
        }
    }

    pub fn multi_button_press(&mut self, ctx: &HookContext<'_>, button: &str, index: usize) {
        if self.handles(EventKind::Button) {
            self.guard(EventKind::Button, |hooks| hooks.on_button(ctx, button, Some(index)));
        }
    }

    /// Returns the text and caret to apply; unchanged if unbound or failing
    pub fn input_value_change(
        &mut self,
        ctx: &HookContext<'_>,
        input: &str,
        text: &str,
        caret: usize,
    ) -> (String, usize) {
        if !self.handles(EventKind::InputValueChange) {
            return (text.to_string(), caret);
        }
        self.guard(EventKind::InputValueChange, |hooks| {
            hooks.on_input_change(ctx, input, text, caret)
        })
        .unwrap_or_else(|| (text.to_string(), caret))
    }

    /// Returns the caret and anchor to apply; unchanged if unbound or failing
    pub fn input_caret_move(
        &mut self,
        ctx: &HookContext<'_>,
        input: &str,
        text: &str,
        caret: usize,
        anchor: usize,
    ) -> (usize, usize) {
        if !self.handles(EventKind::InputCaretMove) {
            return (caret, anchor);
        }
        self.guard(EventKind::InputCaretMove, |hooks| {
            hooks.on_input_caret_move(ctx, input, text, caret, anchor)
        })
        .unwrap_or((caret, anchor))
    }

    /// Text for a custom slider
    pub fn slider_text(&mut self, ctx: &HookContext<'_>, slider: &SliderInfo, value: f64) -> String {
        if !self.handles(EventKind::Slider) {
            warn!(
                "[{}] Slider setting {} uses display mode {} but no {} method was found",
                self.display_name,
                slider.name,
                slider.display,
                EventKind::Slider.hook_name()
            );
            return SLIDER_FALLBACK_TEXT.to_string();
        }
        self.guard(EventKind::Slider, |hooks| hooks.on_slider_text(ctx, slider, value))
            .unwrap_or_else(|| SLIDER_FALLBACK_TEXT.to_string())
    }

    /// Visibility of a custom-access setting
    pub fn setting_visible(&mut self, ctx: &HookContext<'_>, setting: &SettingInfo) -> bool {
        if !self.handles(EventKind::Access) {
            warn!(
                "[{}] Setting {} uses access mode {} but no {} method was found",
                self.display_name,
                setting.name,
                setting.access,
                EventKind::Access.hook_name()
            );
            return false;
        }
        let in_world = ctx.in_world();
        self.guard(EventKind::Access, |hooks| hooks.on_access_check(ctx, setting, in_world))
            .unwrap_or(false)
    }

    /// Run a hook, turning errors and panics into a logged `None`
    fn guard<T>(
        &mut self,
        kind: EventKind,
        f: impl FnOnce(&mut dyn SettingsHooks) -> HookOutcome<T>,
    ) -> Option<T> {
        let hooks = self.hooks.as_mut();
        match catch_unwind(AssertUnwindSafe(|| f(hooks))) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                error!(
                    "[{}] {} failed: {}",
                    self.display_name,
                    kind.hook_name(),
                    e.clean_trace()
                );
                None
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    "[{}] {} panicked: {}",
                    self.display_name,
                    kind.hook_name(),
                    message
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for EventCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCaller")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
