//! Error types for registry operations

/// Error type for mod registry lookups and registration
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No mod is registered under the given key
    #[error("Mod not registered")]
    ModNotFound,

    /// No mod is registered for the given type
    #[error("No mod registered for type: {0}")]
    TypeNotRegistered(String),

    /// A mod with the same main type is already registered
    #[error("Mod type already registered: {0}")]
    AlreadyRegistered(String),

    /// The main type does not derive from the mod base class
    #[error("Type is not a mod class: {0}")]
    NotAModType(String),

    /// The mod has no event caller bound yet
    #[error("No event caller bound for mod: {0}")]
    CallerNotBound(String),
}
