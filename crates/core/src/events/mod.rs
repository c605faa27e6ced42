//! Settings event system
//!
//! Every loaded mod gets an [`EventCaller`] that dispatches settings UI
//! events to the mod's [`SettingsHooks`].
//!
//! # Architecture
//!
//! ```text
//! Settings UI → SettingsApi → EventCaller → SettingsHooks (native or AssemblyHooks)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use esapi_core::events::{Capabilities, HookContext, HookOutcome, SettingsHooks};
//!
//! struct MyHooks;
//!
//! impl SettingsHooks for MyHooks {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::OPEN | Capabilities::BUTTON
//!     }
//!
//!     fn on_open(&mut self, _ctx: &HookContext<'_>) -> HookOutcome<()> {
//!         tracing::info!("Settings opened");
//!         Ok(())
//!     }
//!
//!     fn on_button(&mut self, _ctx: &HookContext<'_>, button: &str, _index: Option<usize>) -> HookOutcome<()> {
//!         tracing::info!("Pressed {}", button);
//!         Ok(())
//!     }
//! }
//! ```

mod caller;
mod hooks;
mod reflective;
mod types;
mod ui;

pub use caller::{EventCaller, SLIDER_FALLBACK_TEXT};
pub use hooks::{HookContext, HookError, HookOutcome, NoHooks, SettingsHooks};
pub use reflective::AssemblyHooks;
pub use types::{Capabilities, EventKind};
pub use ui::{NoopUi, SettingsUi};
