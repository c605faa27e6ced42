//! Hooks declared in a mod assembly
//!
//! Binds the fixed `ExtraSettingsAPI_*` event methods of a settings holder
//! by exact name and parameter list and runs them on the interpreter.
//! Accepted parameter lists:
//!
//! | Event | Parameters | Result |
//! |-------|------------|--------|
//! | open, close, load, unload, create, world load/unload | `()` | ignored |
//! | button | `(string)` or `(string, int)` | ignored |
//! | slider | `(string, float)` | text |
//! | access | `(string, bool)`, else `(string)` | `bool` |
//! | input change | `(string, string, int)` | `(string, int)` |
//! | caret move | `(string, string, int, int)` | `(int, int)` |

use esapi_engine::ModKey;
use esapi_sdk::{MethodRef, TypeRef};
use tracing::{debug, warn};

use crate::assembly::{ModAssembly, Value};
use crate::bridge::cast::is_mod_handle;
use crate::bridge::Interpreter;
use crate::settings::{SettingInfo, SliderInfo};

use super::hooks::{HookContext, HookOutcome, SettingsHooks};
use super::types::{Capabilities, EventKind};

const SIMPLE_KINDS: [EventKind; 7] = [
    EventKind::Open,
    EventKind::Close,
    EventKind::Load,
    EventKind::Unload,
    EventKind::Create,
    EventKind::WorldLoad,
    EventKind::WorldExit,
];

/// [`SettingsHooks`] backed by methods of a mod assembly
pub struct AssemblyHooks {
    assembly: ModAssembly,
    receiver: Value,
    simple: Vec<(EventKind, MethodRef)>,
    button: Option<MethodRef>,
    multi_button: Option<MethodRef>,
    slider: Option<MethodRef>,
    access: Option<MethodRef>,
    access_by_name: Option<MethodRef>,
    input_change: Option<MethodRef>,
    caret_move: Option<MethodRef>,
}

impl AssemblyHooks {
    /// Bind the event methods found on `holder` or its bases
    pub fn bind(key: ModKey, assembly: ModAssembly, holder: &TypeRef) -> Self {
        let lookup = |kind: EventKind, params: &[TypeRef]| {
            assembly
                .find_in_hierarchy(holder, &kind.hook_name(), params)
                .map(|def| def.sig.clone())
        };
        let s = || TypeRef::String;

        let simple = SIMPLE_KINDS
            .into_iter()
            .filter_map(|kind| lookup(kind, &[]).map(|m| (kind, m)))
            .collect();
        let button = lookup(EventKind::Button, &[s()]);
        let multi_button = lookup(EventKind::Button, &[s(), TypeRef::Int]);
        let slider = lookup(EventKind::Slider, &[s(), TypeRef::Float]);
        let access = lookup(EventKind::Access, &[s(), TypeRef::Bool]);
        let access_by_name = lookup(EventKind::Access, &[s()]);
        let input_change = lookup(EventKind::InputValueChange, &[s(), s(), TypeRef::Int]);
        let caret_move = lookup(EventKind::InputCaretMove, &[s(), s(), TypeRef::Int, TypeRef::Int]);

        // Mod-derived holders receive the mod handle itself
        let receiver = if is_mod_handle(holder) {
            Value::Mod(key)
        } else {
            Value::Object(holder.clone())
        };

        let hooks = Self {
            assembly,
            receiver,
            simple,
            button,
            multi_button,
            slider,
            access,
            access_by_name,
            input_change,
            caret_move,
        };
        debug!(
            "Bound event hooks on {}: {:?}",
            holder,
            hooks.capabilities()
        );
        hooks
    }

    /// The assembly the hooks run in
    pub fn assembly(&self) -> &ModAssembly {
        &self.assembly
    }

    fn invoke(&self, ctx: &HookContext<'_>, method: &MethodRef, args: Vec<Value>) -> HookOutcome<Value> {
        let mut full = Vec::with_capacity(args.len() + 1);
        if !method.is_static {
            full.push(self.receiver.clone());
        }
        full.extend(args);

        let vm = Interpreter::new(&self.assembly, ctx.catalog(), ctx.registry(), ctx.store());
        Ok(vm.invoke(method, full)?)
    }

    fn simple_hook(&self, kind: EventKind) -> Option<&MethodRef> {
        self.simple.iter().find(|(k, _)| *k == kind).map(|(_, m)| m)
    }

    fn run_simple(&self, ctx: &HookContext<'_>, kind: EventKind) -> HookOutcome<()> {
        if let Some(method) = self.simple_hook(kind) {
            self.invoke(ctx, method, Vec::new())?;
        }
        Ok(())
    }
}

fn usize_from(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

impl SettingsHooks for AssemblyHooks {
    fn capabilities(&self) -> Capabilities {
        let mut caps = self
            .simple
            .iter()
            .fold(Capabilities::empty(), |acc, (kind, _)| acc | kind.capability());
        let mut set = |present: bool, flag: Capabilities| caps.set(flag, present);
        set(self.button.is_some() || self.multi_button.is_some(), Capabilities::BUTTON);
        set(self.slider.is_some(), Capabilities::SLIDER_TEXT);
        set(self.access.is_some() || self.access_by_name.is_some(), Capabilities::ACCESS_CHECK);
        set(self.input_change.is_some(), Capabilities::INPUT_CHANGE);
        set(self.caret_move.is_some(), Capabilities::INPUT_CARET_MOVE);
        caps
    }

    fn on_open(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::Open)
    }

    fn on_close(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::Close)
    }

    fn on_load(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::Load)
    }

    fn on_unload(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::Unload)
    }

    fn on_create(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::Create)
    }

    fn on_world_load(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::WorldLoad)
    }

    fn on_world_exit(&mut self, ctx: &HookContext<'_>) -> HookOutcome<()> {
        self.run_simple(ctx, EventKind::WorldExit)
    }

    fn on_button(&mut self, ctx: &HookContext<'_>, button: &str, index: Option<usize>) -> HookOutcome<()> {
        let name = Value::Str(button.to_string());
        match (index, &self.multi_button, &self.button) {
            (Some(i), Some(method), _) => {
                self.invoke(ctx, method, vec![name, Value::Int(i as i64)])?;
            }
            (None, _, Some(method)) => {
                self.invoke(ctx, method, vec![name])?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_slider_text(&mut self, ctx: &HookContext<'_>, slider: &SliderInfo, value: f64) -> HookOutcome<String> {
        let Some(method) = &self.slider else {
            return Ok(slider.display.render(value));
        };
        let result = self.invoke(ctx, method, vec![Value::Str(slider.name.clone()), Value::Float(value)])?;
        Ok(match result {
            Value::Str(text) => text,
            Value::Float(v) => slider.display.render(v),
            Value::Int(v) => slider.display.render(v as f64),
            other => other.to_string(),
        })
    }

    fn on_access_check(&mut self, ctx: &HookContext<'_>, setting: &SettingInfo, in_world: bool) -> HookOutcome<bool> {
        let name = Value::Str(setting.name.clone());
        let (method, args) = match (&self.access, &self.access_by_name) {
            (Some(method), _) => (method, vec![name, Value::Bool(in_world)]),
            (None, Some(method)) => (method, vec![name]),
            (None, None) => return Ok(false),
        };

        match self.invoke(ctx, method, args)? {
            Value::Bool(visible) => Ok(visible),
            other => {
                warn!(
                    "{} returned {} for setting {}, expected bool",
                    method.full_name(),
                    other.kind(),
                    setting.name
                );
                Ok(false)
            }
        }
    }

    fn on_input_change(
        &mut self,
        ctx: &HookContext<'_>,
        input: &str,
        text: &str,
        caret: usize,
    ) -> HookOutcome<(String, usize)> {
        let unchanged = (text.to_string(), caret);
        let Some(method) = &self.input_change else {
            return Ok(unchanged);
        };

        let args = vec![
            Value::Str(input.to_string()),
            Value::Str(text.to_string()),
            Value::Int(caret as i64),
        ];
        let result = self.invoke(ctx, method, args)?;
        match result.as_text_and_int() {
            Some((text, caret)) => Ok(usize_from(caret).map(|c| (text, c)).unwrap_or(unchanged)),
            None => {
                debug!("{} returned {}, ignoring", method.full_name(), result.kind());
                Ok(unchanged)
            }
        }
    }

    fn on_input_caret_move(
        &mut self,
        ctx: &HookContext<'_>,
        input: &str,
        text: &str,
        caret: usize,
        anchor: usize,
    ) -> HookOutcome<(usize, usize)> {
        let Some(method) = &self.caret_move else {
            return Ok((caret, anchor));
        };

        let args = vec![
            Value::Str(input.to_string()),
            Value::Str(text.to_string()),
            Value::Int(caret as i64),
            Value::Int(anchor as i64),
        ];
        let result = self.invoke(ctx, method, args)?;
        let moved = result
            .as_int_pair()
            .and_then(|(c, a)| Some((usize_from(c)?, usize_from(a)?)));
        Ok(moved.unwrap_or((caret, anchor)))
    }
}
