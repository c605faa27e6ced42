//! Extra Settings API Engine - Mod Registry and Session State
//!
//! This crate handles:
//! - Registering loaded mods and indexing them by their main type
//! - Resolving a mod to its dispatcher (event caller) handle
//! - Session flags read across the subsystem (API loaded, in world)
//!
//! # Ownership
//!
//! A [`Registry`] is created when the settings subsystem initializes and is
//! dropped when it shuts down. It is passed by reference to every component
//! that needs a lookup; there is no global instance.
//!
//! # Thread Safety
//!
//! The subsystem runs on the game's main thread. The creating thread's ID is
//! stored for runtime checks via [`Registry::is_main_thread`].

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{ModKey, Registry};
