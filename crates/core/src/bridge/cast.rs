//! Cast compatibility
//!
//! Decides whether a value of one type may stand in for a parameter of
//! another. On top of ordinary assignability, the two handle types (`Mod` and
//! `EventCaller`) may optionally substitute for each other: a mod and its
//! dispatcher are always derivable from one another.

use esapi_sdk::{event_caller_type, mod_type, TypeRef};

/// Check whether `source` can be passed where `target` is expected
///
/// With `allow_handle_substitution`, any handle-like source is accepted for
/// any handle-like target.
pub fn can_cast_to(source: &TypeRef, target: &TypeRef, allow_handle_substitution: bool) -> bool {
    if target.is_assignable_from(source) {
        return true;
    }

    allow_handle_substitution && is_handle(source) && is_handle(target)
}

/// Check whether a type is (or derives from) one of the two handle types
pub fn is_handle(ty: &TypeRef) -> bool {
    is_mod_handle(ty) || is_caller_handle(ty)
}

/// Check whether a type is (or derives from) `Mod`
pub fn is_mod_handle(ty: &TypeRef) -> bool {
    mod_type().is_assignable_from(ty)
}

/// Check whether a type is (or derives from) `EventCaller`
pub fn is_caller_handle(ty: &TypeRef) -> bool {
    event_caller_type().is_assignable_from(ty)
}
