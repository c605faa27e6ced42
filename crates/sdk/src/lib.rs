//! Extra Settings API SDK - Metadata Model
//!
//! This crate contains the type definitions used to describe mod classes and
//! the methods declared on them. It has no dependencies and compiles quickly,
//! allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`types`] - Type references, class definitions and assignability
//! - [`method`] - Method signatures and method handles
//! - [`names`] - Well-known type names, the hook prefix and handle types

pub mod method;
pub mod names;
pub mod types;

pub use method::{MethodRef, MethodSig};
pub use names::{api_type, event_caller_type, mod_type, API_CLASS, EVENT_CALLER_CLASS, HOOK_PREFIX, MOD_CLASS};
pub use types::{ClassDef, ClassKind, TypeRef};
