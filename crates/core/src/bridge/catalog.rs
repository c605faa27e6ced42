//! API catalog
//!
//! The fixed set of API methods a hook stub may bind to. Every entry is a
//! static method on the API class with a native implementation. The catalog
//! also holds the context intrinsics that synthesized bodies use to inject
//! and convert handles:
//!
//! - `GetMod(Type) -> Mod`
//! - `GetCallerFromMod(Mod) -> EventCaller`
//! - `EventCaller::get_parent() -> Mod`
//!
//! The first two are ordinary catalog entries and can be bound by name like
//! any other; `get_parent` is an instance method on `EventCaller` and is only
//! reachable from generated code.

use esapi_sdk::{api_type, event_caller_type, mod_type, MethodRef, MethodSig, TypeRef};

use crate::assembly::{arg, NativeFn, Value};
use crate::settings::SettingValue;

use super::interp::{ExecError, NativeEnv};

/// One API method with its implementation
#[derive(Clone)]
pub struct CatalogEntry {
    method: MethodRef,
    native: NativeFn,
}

impl CatalogEntry {
    /// Create an entry
    pub fn new<F>(method: MethodSig, native: F) -> Self
    where
        F: Fn(&NativeEnv<'_>, &[Value]) -> Result<Value, ExecError> + Send + Sync + 'static,
    {
        Self {
            method: method.into_ref(),
            native: std::sync::Arc::new(native),
        }
    }

    /// Canonical name
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Method handle
    pub fn method(&self) -> &MethodRef {
        &self.method
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry").field("method", &self.method.to_string()).finish()
    }
}

/// Static API method signature
fn api(name: &str, params: impl IntoIterator<Item = TypeRef>, ret: TypeRef) -> MethodSig {
    MethodSig::static_fn(api_type(), name, params, ret)
}

/// Immutable API surface
#[derive(Debug, Clone)]
pub struct ApiCatalog {
    entries: Vec<CatalogEntry>,
    caller_parent: CatalogEntry,
}

impl ApiCatalog {
    /// Catalog containing only the context intrinsics
    pub fn empty() -> Self {
        let get_mod = CatalogEntry::new(api("GetMod", [TypeRef::Type], mod_type()), |env, args| {
            let ty = arg(args, 0)?.as_type()?;
            Ok(Value::Mod(env.registry.mod_for_type(ty)?))
        });

        let get_caller = CatalogEntry::new(
            api("GetCallerFromMod", [mod_type()], event_caller_type()),
            |env, args| {
                let key = arg(args, 0)?.as_mod()?;
                Ok(Value::Caller(env.registry.caller_for_mod(key)?))
            },
        );

        let caller_parent = CatalogEntry::new(
            MethodSig::instance(event_caller_type(), "get_parent", [], mod_type()),
            |env, args| {
                let key = arg(args, 0)?.as_caller()?;
                if !env.registry.contains(key) {
                    return Err(esapi_engine::RegistryError::ModNotFound.into());
                }
                Ok(Value::Mod(key))
            },
        );

        Self {
            entries: vec![get_mod, get_caller],
            caller_parent,
        }
    }

    /// The standard settings API
    pub fn standard() -> Self {
        let m = mod_type;
        let s = || TypeRef::String;

        Self::empty()
            .with_entry(CatalogEntry::new(api("IsInWorld", [], TypeRef::Bool), |env, _| {
                Ok(Value::Bool(env.registry.is_in_world()))
            }))
            .with_entry(CatalogEntry::new(api("IsApiLoaded", [m()], TypeRef::Bool), |env, args| {
                let key = arg(args, 0)?.as_mod()?;
                Ok(Value::Bool(env.registry.is_api_loaded(key)))
            }))
            .with_entry(CatalogEntry::new(
                api("GetCheckboxState", [m(), s()], TypeRef::Bool),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    Ok(Value::Bool(env.store.checkbox(key, arg(args, 1)?.as_str()?)?))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("SetCheckboxState", [m(), s(), TypeRef::Bool], TypeRef::Void),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let value = SettingValue::Checkbox(arg(args, 2)?.as_bool()?);
                    env.store.set(key, arg(args, 1)?.as_str()?, value)?;
                    Ok(Value::Unit)
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetSliderValue", [m(), s()], TypeRef::Float),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    Ok(Value::Float(env.store.slider(key, arg(args, 1)?.as_str()?)?))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("SetSliderValue", [m(), s(), TypeRef::Float], TypeRef::Void),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let value = SettingValue::Slider(arg(args, 2)?.as_float()?);
                    env.store.set(key, arg(args, 1)?.as_str()?, value)?;
                    Ok(Value::Unit)
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetInputValue", [m(), s()], TypeRef::String),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    Ok(Value::Str(env.store.input(key, arg(args, 1)?.as_str()?)?))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("SetInputValue", [m(), s(), s()], TypeRef::Void),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let value = SettingValue::Input(arg(args, 2)?.as_str()?.to_string());
                    env.store.set(key, arg(args, 1)?.as_str()?, value)?;
                    Ok(Value::Unit)
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetComboboxSelectedIndex", [m(), s()], TypeRef::Int),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let (index, _) = env.store.combobox(key, arg(args, 1)?.as_str()?)?;
                    Ok(Value::Int(index as i64))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetComboboxSelectedItem", [m(), s()], TypeRef::String),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let (_, item) = env.store.combobox(key, arg(args, 1)?.as_str()?)?;
                    Ok(Value::Str(item))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetKeybindMain", [m(), s()], TypeRef::String),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let (main, _) = env.store.keybind(key, arg(args, 1)?.as_str()?)?;
                    Ok(Value::Str(main))
                },
            ))
            .with_entry(CatalogEntry::new(
                api("GetKeybindAlt", [m(), s()], TypeRef::String),
                |env, args| {
                    let key = arg(args, 0)?.as_mod()?;
                    let (_, alt) = env.store.keybind(key, arg(args, 1)?.as_str()?)?;
                    Ok(Value::Str(alt))
                },
            ))
            .with_entry(CatalogEntry::new(api("ResetAllSettings", [m()], TypeRef::Void), |env, args| {
                env.store.reset_all(arg(args, 0)?.as_mod()?);
                Ok(Value::Unit)
            }))
            .with_entry(CatalogEntry::new(
                api("ResetAllSettings", [event_caller_type()], TypeRef::Void),
                |env, args| {
                    env.store.reset_all(arg(args, 0)?.as_caller()?);
                    Ok(Value::Unit)
                },
            ))
    }

    /// Append an entry (builder style)
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// All bindable entries in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries whose name equals `bare_name`, ignoring case, in catalog order
    pub fn named<'a>(&'a self, bare_name: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.name().eq_ignore_ascii_case(bare_name))
    }

    /// Native implementation for an API method or intrinsic
    pub fn native(&self, method: &MethodSig) -> Option<&NativeFn> {
        self.entries
            .iter()
            .chain(std::iter::once(&self.caller_parent))
            .find(|e| *e.method == *method)
            .map(|e| &e.native)
    }

    /// `GetMod(Type) -> Mod`
    pub fn get_mod(&self) -> &MethodRef {
        &self.entries[0].method
    }

    /// `GetCallerFromMod(Mod) -> EventCaller`
    pub fn get_caller_from_mod(&self) -> &MethodRef {
        &self.entries[1].method
    }

    /// `EventCaller::get_parent() -> Mod`
    pub fn caller_parent(&self) -> &MethodRef {
        &self.caller_parent.method
    }
}

impl Default for ApiCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
