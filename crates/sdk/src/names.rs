//! Well-known names and handle types
//!
//! These must match exactly what mods declare.

use std::sync::LazyLock;

use crate::types::{ClassDef, ClassKind, TypeRef};

/// Reserved prefix for hook methods declared by mods
pub const HOOK_PREFIX: &str = "ExtraSettingsAPI_";

/// The API class whose static methods form the catalog
pub const API_CLASS: &str = "ExtraSettingsAPI";

/// Base class of every mod's main class (mod-identity handle)
pub const MOD_CLASS: &str = "Mod";

/// Per-mod dispatcher class (event-caller handle)
pub const EVENT_CALLER_CLASS: &str = "EventCaller";

static MOD_TYPE: LazyLock<TypeRef> =
    LazyLock::new(|| ClassDef::new(MOD_CLASS).with_kind(ClassKind::Abstract).into_type());

static EVENT_CALLER_TYPE: LazyLock<TypeRef> =
    LazyLock::new(|| ClassDef::new(EVENT_CALLER_CLASS).without_default_ctor().into_type());

static API_TYPE: LazyLock<TypeRef> =
    LazyLock::new(|| ClassDef::new(API_CLASS).with_kind(ClassKind::Abstract).into_type());

/// Mod-identity handle type
pub fn mod_type() -> TypeRef {
    MOD_TYPE.clone()
}

/// Event-caller handle type
pub fn event_caller_type() -> TypeRef {
    EVENT_CALLER_TYPE.clone()
}

/// The API class
pub fn api_type() -> TypeRef {
    API_TYPE.clone()
}
