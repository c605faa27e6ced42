//! Mod registry
//!
//! Maps mod keys to their records, main types to mod keys, and mods to their
//! dispatcher handles. The bridge uses these lookups to inject context
//! arguments into synthesized method bodies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

use dashmap::DashMap;
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use esapi_sdk::{mod_type, TypeRef};

use crate::error::RegistryError;

new_key_type! {
    /// Handle for a registered mod
    ///
    /// Both the mod-identity handle and the event-caller handle of a mod
    /// carry the same key; they differ only in their static type.
    pub struct ModKey;
}

/// Registered mod information
struct ModRecord {
    /// Mod name as shown in logs
    name: String,
    /// Main class of the mod, derives from `Mod`
    main_type: TypeRef,
    /// Set by the Load event, cleared by Unload
    api_loaded: AtomicBool,
    /// Whether an event caller has been bound for this mod
    caller_bound: AtomicBool,
}

/// Registry of loaded mods and session flags
pub struct Registry {
    /// Records indexed by key
    mods: RwLock<SlotMap<ModKey, ModRecord>>,

    /// Lookup by main type
    by_type: DashMap<TypeRef, ModKey>,

    /// Whether the player is currently in a world
    in_world: AtomicBool,

    /// Thread that created the registry
    main_thread_id: ThreadId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry owned by the current thread
    pub fn new() -> Self {
        Self {
            mods: RwLock::new(SlotMap::with_key()),
            by_type: DashMap::new(),
            in_world: AtomicBool::new(false),
            main_thread_id: std::thread::current().id(),
        }
    }

    /// Check if current thread is the thread that created the registry
    pub fn is_main_thread(&self) -> bool {
        std::thread::current().id() == self.main_thread_id
    }

    /// Register a mod by name and main type
    pub fn register_mod(&self, name: &str, main_type: TypeRef) -> Result<ModKey, RegistryError> {
        if !mod_type().is_assignable_from(&main_type) {
            return Err(RegistryError::NotAModType(main_type.name()));
        }
        if self.by_type.contains_key(&main_type) {
            return Err(RegistryError::AlreadyRegistered(main_type.name()));
        }

        let key = self.mods.write().insert(ModRecord {
            name: name.to_string(),
            main_type: main_type.clone(),
            api_loaded: AtomicBool::new(false),
            caller_bound: AtomicBool::new(false),
        });
        self.by_type.insert(main_type, key);

        tracing::debug!("Registered mod '{}' as {:?}", name, key);
        Ok(key)
    }

    /// Remove a mod
    ///
    /// Returns `true` if the mod was found and removed.
    pub fn unregister_mod(&self, key: ModKey) -> bool {
        let Some(record) = self.mods.write().remove(key) else {
            return false;
        };
        self.by_type.remove(&record.main_type);
        tracing::debug!("Unregistered mod '{}'", record.name);
        true
    }

    /// Resolve a type to the mod that declares it as its main type
    pub fn mod_for_type(&self, ty: &TypeRef) -> Result<ModKey, RegistryError> {
        self.by_type
            .get(ty)
            .map(|entry| *entry.value())
            .ok_or_else(|| RegistryError::TypeNotRegistered(ty.name()))
    }

    /// Mark the mod's event caller as available
    pub fn bind_caller(&self, key: ModKey) -> Result<(), RegistryError> {
        let mods = self.mods.read();
        let record = mods.get(key).ok_or(RegistryError::ModNotFound)?;
        record.caller_bound.store(true, Ordering::Release);
        Ok(())
    }

    /// Resolve a mod to its dispatcher handle
    pub fn caller_for_mod(&self, key: ModKey) -> Result<ModKey, RegistryError> {
        let mods = self.mods.read();
        let record = mods.get(key).ok_or(RegistryError::ModNotFound)?;
        if record.caller_bound.load(Ordering::Acquire) {
            Ok(key)
        } else {
            Err(RegistryError::CallerNotBound(record.name.clone()))
        }
    }

    /// Check if a mod key is registered
    pub fn contains(&self, key: ModKey) -> bool {
        self.mods.read().contains_key(key)
    }

    /// Get a mod's name
    pub fn mod_name(&self, key: ModKey) -> Option<String> {
        self.mods.read().get(key).map(|r| r.name.clone())
    }

    /// Get a mod's main type
    pub fn main_type(&self, key: ModKey) -> Option<TypeRef> {
        self.mods.read().get(key).map(|r| r.main_type.clone())
    }

    /// Set the per-mod "API loaded" flag
    pub fn set_api_loaded(&self, key: ModKey, loaded: bool) {
        if let Some(record) = self.mods.read().get(key) {
            record.api_loaded.store(loaded, Ordering::Release);
        }
    }

    /// Read the per-mod "API loaded" flag
    pub fn is_api_loaded(&self, key: ModKey) -> bool {
        self.mods
            .read()
            .get(key)
            .map(|r| r.api_loaded.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Set whether the player is in a world
    pub fn set_in_world(&self, in_world: bool) {
        self.in_world.store(in_world, Ordering::Release);
    }

    /// Check whether the player is in a world
    pub fn is_in_world(&self) -> bool {
        self.in_world.load(Ordering::Acquire)
    }

    /// Number of registered mods
    pub fn len(&self) -> usize {
        self.mods.read().len()
    }

    /// Check if no mods are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every mod and reset session flags
    pub fn clear(&self) {
        self.mods.write().clear();
        self.by_type.clear();
        self.in_world.store(false, Ordering::Release);
        tracing::debug!("Registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esapi_sdk::ClassDef;

    fn mod_class(name: &str) -> TypeRef {
        ClassDef::new(name).extends(mod_type()).into_type()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        let ty = mod_class("Alpha");
        let key = registry.register_mod("Alpha", ty.clone()).unwrap();

        assert_eq!(registry.mod_for_type(&ty).unwrap(), key);
        assert_eq!(registry.mod_name(key).as_deref(), Some("Alpha"));
        assert_eq!(registry.main_type(key), Some(ty));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let registry = Registry::new();
        registry.register_mod("Alpha", mod_class("Alpha")).unwrap();
        let err = registry.register_mod("Alpha again", mod_class("Alpha")).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_non_mod_type_rejected() {
        let registry = Registry::new();
        let err = registry
            .register_mod("Plain", ClassDef::new("Plain").into_type())
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotAModType(_)));
    }

    #[test]
    fn test_caller_requires_binding() {
        let registry = Registry::new();
        let key = registry.register_mod("Alpha", mod_class("Alpha")).unwrap();

        assert!(matches!(
            registry.caller_for_mod(key),
            Err(RegistryError::CallerNotBound(_))
        ));
        registry.bind_caller(key).unwrap();
        assert_eq!(registry.caller_for_mod(key).unwrap(), key);
    }

    #[test]
    fn test_flags() {
        let registry = Registry::new();
        let key = registry.register_mod("Alpha", mod_class("Alpha")).unwrap();

        assert!(!registry.is_api_loaded(key));
        registry.set_api_loaded(key, true);
        assert!(registry.is_api_loaded(key));

        assert!(!registry.is_in_world());
        registry.set_in_world(true);
        assert!(registry.is_in_world());
        assert!(registry.is_main_thread());
    }

    #[test]
    fn test_unregister_and_clear() {
        let registry = Registry::new();
        let ty = mod_class("Alpha");
        let key = registry.register_mod("Alpha", ty.clone()).unwrap();
        registry.register_mod("Beta", mod_class("Beta")).unwrap();

        assert!(registry.unregister_mod(key));
        assert!(!registry.unregister_mod(key));
        assert!(registry.mod_for_type(&ty).is_err());

        registry.set_in_world(true);
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.is_in_world());
    }
}
