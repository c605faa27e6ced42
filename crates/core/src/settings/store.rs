//! Per-mod setting values

use dashmap::DashMap;
use esapi_engine::ModKey;

use super::types::{SettingValue, SettingsError};

#[derive(Debug, Clone)]
struct SettingEntry {
    default: SettingValue,
    current: SettingValue,
}

/// Setting values keyed by mod and setting name
///
/// Values live only for the session; persistence belongs to the host.
#[derive(Debug, Default)]
pub struct SettingsStore {
    entries: DashMap<(ModKey, String), SettingEntry>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a setting with its default, replacing any previous declaration
    pub fn declare(&self, key: ModKey, name: impl Into<String>, default: SettingValue) {
        let name = name.into();
        tracing::trace!("Declared {} setting '{}'", default.kind(), name);
        self.entries.insert(
            (key, name),
            SettingEntry {
                current: default.clone(),
                default,
            },
        );
    }

    /// Current value of a setting
    pub fn get(&self, key: ModKey, name: &str) -> Result<SettingValue, SettingsError> {
        self.entries
            .get(&(key, name.to_string()))
            .map(|e| e.current.clone())
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    /// Replace a setting's value; the kind must match the declaration
    pub fn set(&self, key: ModKey, name: &str, value: SettingValue) -> Result<(), SettingsError> {
        let mut entry = self
            .entries
            .get_mut(&(key, name.to_string()))
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))?;

        let value = match (&entry.current, value) {
            // Only the selection of a combobox is settable
            (SettingValue::Combobox { items, .. }, SettingValue::Combobox { index, .. }) => {
                SettingValue::Combobox {
                    index,
                    items: items.clone(),
                }
            }
            (current, value) if current.kind() == value.kind() => value,
            (current, value) => {
                return Err(SettingsError::KindMismatch {
                    name: name.to_string(),
                    expected: current.kind(),
                    found: value.kind(),
                })
            }
        };

        entry.current = value;
        Ok(())
    }

    fn mismatch(name: &str, expected: &'static str, found: &SettingValue) -> SettingsError {
        SettingsError::KindMismatch {
            name: name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    pub fn checkbox(&self, key: ModKey, name: &str) -> Result<bool, SettingsError> {
        match self.get(key, name)? {
            SettingValue::Checkbox(v) => Ok(v),
            other => Err(Self::mismatch(name, "checkbox", &other)),
        }
    }

    pub fn slider(&self, key: ModKey, name: &str) -> Result<f64, SettingsError> {
        match self.get(key, name)? {
            SettingValue::Slider(v) => Ok(v),
            other => Err(Self::mismatch(name, "slider", &other)),
        }
    }

    pub fn input(&self, key: ModKey, name: &str) -> Result<String, SettingsError> {
        match self.get(key, name)? {
            SettingValue::Input(v) => Ok(v),
            other => Err(Self::mismatch(name, "input", &other)),
        }
    }

    /// Selected index and item
    pub fn combobox(&self, key: ModKey, name: &str) -> Result<(usize, String), SettingsError> {
        match self.get(key, name)? {
            SettingValue::Combobox { index, items } => {
                let item = items.get(index).cloned().unwrap_or_default();
                Ok((index, item))
            }
            other => Err(Self::mismatch(name, "combobox", &other)),
        }
    }

    /// Main and alternate key names
    pub fn keybind(&self, key: ModKey, name: &str) -> Result<(String, String), SettingsError> {
        match self.get(key, name)? {
            SettingValue::Keybind { main, alt } => Ok((main, alt)),
            other => Err(Self::mismatch(name, "keybind", &other)),
        }
    }

    /// Restore every setting of a mod to its default; returns how many were reset
    pub fn reset_all(&self, key: ModKey) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().0 == key {
                entry.current = entry.default.clone();
                count += 1;
            }
        }
        tracing::debug!("Reset {} settings", count);
        count
    }

    /// Forget every setting of a mod
    pub fn remove_mod(&self, key: ModKey) {
        self.entries.retain(|(owner, _), _| *owner != key);
    }

    /// Names of a mod's settings, sorted
    pub fn names(&self, key: ModKey) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().0 == key)
            .map(|e| e.key().1.clone())
            .collect();
        names.sort();
        names
    }
}
