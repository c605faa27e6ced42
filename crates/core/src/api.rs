//! Settings API subsystem
//!
//! Owns the registry, catalog, settings store and one [`EventCaller`] per
//! loaded mod, and turns settings UI lifecycle triggers into events.

use esapi_engine::{ModKey, Registry, RegistryError};
use esapi_sdk::{ClassKind, TypeRef};
use slotmap::SecondaryMap;
use tracing::{debug, error, info, warn};

use crate::assembly::ModAssembly;
use crate::bridge::{install_bridges, ApiCatalog};
use crate::config::ApiConfig;
use crate::events::{
    AssemblyHooks, EventCaller, EventKind, HookContext, NoHooks, NoopUi, SettingsHooks, SettingsUi,
};
use crate::settings::{SettingInfo, SettingValue, SettingsStore, SliderDisplay, SliderInfo};

/// Errors from building a settings holder
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    #[error("Settings field has type Type; declare it with the settings class instead")]
    TypeToken,

    #[error("{0} is abstract")]
    Abstract(String),

    #[error("{0} is an interface")]
    Interface(String),

    #[error("{0} has no parameterless constructor")]
    NoDefaultConstructor(String),

    #[error("{0} is not a class")]
    NotAClass(String),
}

/// Subsystem errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Mod is not loaded")]
    NotLoaded,
}

/// Where a mod's hooks live
#[derive(Debug, Clone, Default)]
pub enum SettingsHolder {
    /// On the main class
    #[default]
    None,
    /// Field declared but unset; constructed through its parameterless constructor
    Unset(TypeRef),
    /// Field holding an instance
    Instance(TypeRef),
    /// Static class
    Static(TypeRef),
}

impl SettingsHolder {
    /// Class the hooks bind against
    pub fn resolve(&self, main_type: &TypeRef) -> Result<TypeRef, ConstructError> {
        match self {
            SettingsHolder::None => Ok(main_type.clone()),
            SettingsHolder::Instance(ty) | SettingsHolder::Static(ty) => Ok(ty.clone()),
            SettingsHolder::Unset(TypeRef::Type) => Err(ConstructError::TypeToken),
            SettingsHolder::Unset(ty) => {
                let class = ty.class().ok_or_else(|| ConstructError::NotAClass(ty.name()))?;
                match class.kind {
                    ClassKind::Abstract => Err(ConstructError::Abstract(ty.name())),
                    ClassKind::Interface => Err(ConstructError::Interface(ty.name())),
                    ClassKind::Concrete if !class.has_default_ctor => {
                        Err(ConstructError::NoDefaultConstructor(ty.name()))
                    }
                    ClassKind::Concrete => Ok(ty.clone()),
                }
            }
        }
    }
}

/// Everything needed to load a mod into the subsystem
pub struct ModDescriptor {
    name: String,
    display_name: String,
    main_type: TypeRef,
    assembly: Option<ModAssembly>,
    holder: SettingsHolder,
    hooks: Option<Box<dyn SettingsHooks>>,
    settings: Vec<(String, SettingValue)>,
}

impl ModDescriptor {
    pub fn new(name: impl Into<String>, main_type: TypeRef) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            main_type,
            assembly: None,
            holder: SettingsHolder::None,
            hooks: None,
            settings: Vec::new(),
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Hooks and bridge stubs declared in an assembly
    pub fn assembly(mut self, assembly: ModAssembly) -> Self {
        self.assembly = Some(assembly);
        self
    }

    pub fn holder(mut self, holder: SettingsHolder) -> Self {
        self.holder = holder;
        self
    }

    /// Native hooks; take precedence over assembly hooks
    pub fn hooks(mut self, hooks: impl SettingsHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Declare a setting with its default
    pub fn setting(mut self, name: impl Into<String>, default: SettingValue) -> Self {
        self.settings.push((name.into(), default));
        self
    }
}

/// The settings subsystem
pub struct SettingsApi {
    config: ApiConfig,
    registry: Registry,
    catalog: ApiCatalog,
    store: SettingsStore,
    callers: SecondaryMap<ModKey, EventCaller>,
    /// Load order
    order: Vec<ModKey>,
    /// Set once the settings widgets have been built
    settings_created: bool,
    is_open: bool,
}

impl SettingsApi {
    /// Create the subsystem with the standard catalog
    pub fn new(config: ApiConfig) -> Self {
        Self::with_catalog(config, ApiCatalog::standard())
    }

    pub fn with_catalog(config: ApiConfig, catalog: ApiCatalog) -> Self {
        Self {
            config,
            registry: Registry::new(),
            catalog,
            store: SettingsStore::new(),
            callers: SecondaryMap::new(),
            order: Vec::new(),
            settings_created: false,
            is_open: false,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn catalog(&self) -> &ApiCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Loaded mods in load order
    pub fn loaded_mods(&self) -> &[ModKey] {
        &self.order
    }

    pub fn caller(&self, key: ModKey) -> Option<&EventCaller> {
        self.callers.get(key)
    }

    /// Register a mod, bind its hooks and fire `Load`
    pub fn load_mod(&mut self, descriptor: ModDescriptor) -> Result<ModKey, ApiError> {
        debug_assert!(self.registry.is_main_thread());

        let ModDescriptor {
            name,
            display_name,
            main_type,
            assembly,
            holder,
            hooks,
            settings,
        } = descriptor;

        let key = self.registry.register_mod(&name, main_type.clone())?;
        self.registry.bind_caller(key)?;

        for (setting, default) in settings {
            self.store.declare(key, setting, default);
        }

        let hooks: Box<dyn SettingsHooks> = match (hooks, assembly) {
            (Some(hooks), assembly) => {
                if assembly.is_some() {
                    warn!(
                        "[{}] Native hooks supplied, ignoring assembly; its {}* methods stay unpatched",
                        display_name,
                        esapi_sdk::HOOK_PREFIX
                    );
                }
                hooks
            }
            (None, Some(mut assembly)) => {
                let holder = holder.resolve(&main_type).unwrap_or_else(|e| {
                    error!("[{}] Failed to create settings holder: {}", display_name, e);
                    main_type.clone()
                });
                install_bridges(
                    &name,
                    &main_type,
                    &holder,
                    &mut assembly,
                    &self.catalog,
                    &self.config.bridge,
                );
                Box::new(AssemblyHooks::bind(key, assembly, &holder))
            }
            (None, None) => Box::new(NoHooks),
        };

        let mut caller = EventCaller::new(key, display_name, hooks);
        debug!("[{}] Hooks: {:?}", caller.display_name(), caller.capabilities());

        let ctx = HookContext::new(key, &self.registry, &self.catalog, &self.store);
        caller.call(EventKind::Load, &ctx, &mut NoopUi);

        info!("Loaded settings API for {}", caller.display_name());
        self.callers.insert(key, caller);
        self.order.push(key);
        Ok(key)
    }

    /// Fire `Unload`, then forget the mod
    pub fn unload_mod(&mut self, key: ModKey) -> Result<(), ApiError> {
        let mut caller = self.callers.remove(key).ok_or(ApiError::NotLoaded)?;

        let ctx = HookContext::new(key, &self.registry, &self.catalog, &self.store);
        caller.call(EventKind::Unload, &ctx, &mut NoopUi);

        self.order.retain(|k| *k != key);
        self.store.remove_mod(key);
        self.registry.unregister_mod(key);
        info!("Unloaded settings API for {}", caller.display_name());
        Ok(())
    }

    /// Fire `kind` for every mod in load order
    fn broadcast(&mut self, kind: EventKind, ui: &mut dyn SettingsUi) {
        for &key in &self.order {
            if let Some(caller) = self.callers.get_mut(key) {
                let ctx = HookContext::new(key, &self.registry, &self.catalog, &self.store);
                caller.call(kind, &ctx, ui);
            }
        }
    }

    /// Settings menu opened; builds the widgets on first open
    pub fn open_settings(&mut self, ui: &mut dyn SettingsUi) {
        if !self.settings_created {
            self.broadcast(EventKind::Create, ui);
            self.settings_created = true;
        }
        self.is_open = true;
        self.broadcast(EventKind::Open, ui);
    }

    /// Settings menu closed; ignored unless it was open
    pub fn close_settings(&mut self, ui: &mut dyn SettingsUi) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.broadcast(EventKind::Close, ui);
    }

    pub fn enter_world(&mut self, ui: &mut dyn SettingsUi) {
        self.registry.set_in_world(true);
        self.broadcast(EventKind::WorldLoad, ui);
    }

    pub fn exit_world(&mut self, ui: &mut dyn SettingsUi) {
        self.registry.set_in_world(false);
        self.broadcast(EventKind::WorldExit, ui);
    }

    /// Run `f` on a mod's caller with a fresh hook context
    fn with_caller<T>(
        &mut self,
        key: ModKey,
        f: impl FnOnce(&mut EventCaller, &HookContext<'_>) -> T,
    ) -> Result<T, ApiError> {
        let caller = self.callers.get_mut(key).ok_or(ApiError::NotLoaded)?;
        let ctx = HookContext::new(key, &self.registry, &self.catalog, &self.store);
        Ok(f(caller, &ctx))
    }

    pub fn button_press(&mut self, key: ModKey, button: &str) -> Result<(), ApiError> {
        self.with_caller(key, |caller, ctx| caller.button_press(ctx, button))
    }

    pub fn multi_button_press(&mut self, key: ModKey, button: &str, index: usize) -> Result<(), ApiError> {
        self.with_caller(key, |caller, ctx| caller.multi_button_press(ctx, button, index))
    }

    /// Text and caret to apply after an edit
    pub fn input_value_change(
        &mut self,
        key: ModKey,
        input: &str,
        text: &str,
        caret: usize,
    ) -> Result<(String, usize), ApiError> {
        self.with_caller(key, |caller, ctx| caller.input_value_change(ctx, input, text, caret))
    }

    /// Caret and anchor to apply after a move
    ///
    /// The caret is clamped to the text length before the hook sees it.
    pub fn input_caret_move(
        &mut self,
        key: ModKey,
        input: &str,
        text: &str,
        caret: usize,
        anchor: usize,
    ) -> Result<(usize, usize), ApiError> {
        let caret = caret.min(text.chars().count());
        self.with_caller(key, |caller, ctx| {
            caller.input_caret_move(ctx, input, text, caret, anchor)
        })
    }

    /// Text shown next to a slider
    pub fn slider_text(&mut self, key: ModKey, slider: &SliderInfo, value: f64) -> Result<String, ApiError> {
        if slider.display != SliderDisplay::Custom {
            return Ok(slider.display.render(value));
        }
        self.with_caller(key, |caller, ctx| caller.slider_text(ctx, slider, value))
    }

    /// Whether a setting is shown in the current context
    pub fn setting_visible(&mut self, key: ModKey, setting: &SettingInfo) -> Result<bool, ApiError> {
        if let Some(visible) = setting.access.is_visible(self.registry.is_in_world()) {
            return Ok(visible);
        }
        self.with_caller(key, |caller, ctx| caller.setting_visible(ctx, setting))
    }

    /// Unload every mod in reverse load order and clear the registry
    pub fn shutdown(&mut self) {
        for key in self.order.clone().into_iter().rev() {
            if let Err(e) = self.unload_mod(key) {
                warn!("Failed to unload mod during shutdown: {}", e);
            }
        }
        self.registry.clear();
        self.settings_created = false;
        self.is_open = false;
        info!("Settings API shut down");
    }
}
