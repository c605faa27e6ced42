//! Setting values and widget metadata

use std::fmt;

/// Errors raised by the settings store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Setting {name} is a {expected}, not a {found}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Value held by one setting
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Checkbox(bool),
    Slider(f64),
    Input(String),
    Combobox { index: usize, items: Vec<String> },
    Keybind { main: String, alt: String },
}

impl SettingValue {
    /// Widget kind name
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Checkbox(_) => "checkbox",
            SettingValue::Slider(_) => "slider",
            SettingValue::Input(_) => "input",
            SettingValue::Combobox { .. } => "combobox",
            SettingValue::Keybind { .. } => "keybind",
        }
    }

    /// Currently selected combobox item, empty when the index is out of range
    pub fn selected_item(&self) -> Option<&str> {
        match self {
            SettingValue::Combobox { index, items } => {
                Some(items.get(*index).map(String::as_str).unwrap_or(""))
            }
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Checkbox(v) => write!(f, "{}", v),
            SettingValue::Slider(v) => write!(f, "{}", v),
            SettingValue::Input(v) => f.write_str(v),
            SettingValue::Combobox { .. } => f.write_str(self.selected_item().unwrap_or("")),
            SettingValue::Keybind { main, alt } => write!(f, "{} / {}", main, alt),
        }
    }
}

/// How a slider renders its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliderDisplay {
    /// Rounded to an integer
    #[default]
    Whole,
    /// Two decimal places
    Decimal,
    /// Multiplied by 100 with a percent sign
    Percent,
    /// Text supplied by the mod's slider hook
    Custom,
}

impl SliderDisplay {
    /// Render a value; `Custom` has no built-in form and falls back to plain
    pub fn render(self, value: f64) -> String {
        match self {
            SliderDisplay::Whole => format!("{}", value.round() as i64),
            SliderDisplay::Decimal => format!("{:.2}", value),
            SliderDisplay::Percent => format!("{}%", (value * 100.0).round() as i64),
            SliderDisplay::Custom => format!("{}", value),
        }
    }
}

impl fmt::Display for SliderDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SliderDisplay::Whole => "Whole",
            SliderDisplay::Decimal => "Decimal",
            SliderDisplay::Percent => "Percent",
            SliderDisplay::Custom => "Custom",
        };
        f.write_str(s)
    }
}

/// Where a setting may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingAccess {
    #[default]
    Both,
    MainMenu,
    World,
    /// Decided by the mod's access hook
    Custom,
}

impl SettingAccess {
    /// Built-in visibility; `Custom` always needs the hook
    pub fn is_visible(self, in_world: bool) -> Option<bool> {
        match self {
            SettingAccess::Both => Some(true),
            SettingAccess::MainMenu => Some(!in_world),
            SettingAccess::World => Some(in_world),
            SettingAccess::Custom => None,
        }
    }
}

impl fmt::Display for SettingAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettingAccess::Both => "Both",
            SettingAccess::MainMenu => "MainMenu",
            SettingAccess::World => "World",
            SettingAccess::Custom => "Custom",
        };
        f.write_str(s)
    }
}

/// A setting as seen by the access hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingInfo {
    pub name: String,
    pub label: String,
    pub access: SettingAccess,
}

impl SettingInfo {
    pub fn new(name: impl Into<String>, access: SettingAccess) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            access,
        }
    }
}

/// A slider as seen by the slider-text hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderInfo {
    pub name: String,
    pub label: String,
    pub display: SliderDisplay,
}

impl SliderInfo {
    pub fn new(name: impl Into<String>, display: SliderDisplay) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            display,
        }
    }
}
