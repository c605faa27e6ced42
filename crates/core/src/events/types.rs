//! Event kinds and capability flags

use std::fmt;

use bitflags::bitflags;
use esapi_sdk::HOOK_PREFIX;

/// Settings UI events a mod may handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventKind {
    Open = 0,
    Close = 1,
    Load = 2,
    Unload = 3,
    Button = 4,
    Create = 5,
    Slider = 6,
    Access = 7,
    WorldLoad = 8,
    WorldExit = 9,
    InputValueChange = 10,
    InputCaretMove = 11,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 12] = [
        EventKind::Open,
        EventKind::Close,
        EventKind::Load,
        EventKind::Unload,
        EventKind::Button,
        EventKind::Create,
        EventKind::Slider,
        EventKind::Access,
        EventKind::WorldLoad,
        EventKind::WorldExit,
        EventKind::InputValueChange,
        EventKind::InputCaretMove,
    ];

    /// Hook name without the reserved prefix
    pub fn suffix(self) -> &'static str {
        match self {
            EventKind::Open => "SettingsOpen",
            EventKind::Close => "SettingsClose",
            EventKind::Load => "Load",
            EventKind::Unload => "Unload",
            EventKind::Button => "ButtonPress",
            EventKind::Create => "SettingsCreate",
            EventKind::Slider => "HandleSliderText",
            EventKind::Access => "HandleSettingVisible",
            EventKind::WorldLoad => "WorldLoad",
            EventKind::WorldExit => "WorldUnload",
            EventKind::InputValueChange => "InputValueChange",
            EventKind::InputCaretMove => "InputCaretMove",
        }
    }

    /// Full method name a mod declares to handle this event
    pub fn hook_name(self) -> String {
        format!("{}{}", HOOK_PREFIX, self.suffix())
    }

    /// Event whose fixed hook has exactly this method name
    pub fn from_hook_name(name: &str) -> Option<EventKind> {
        let suffix = name.strip_prefix(HOOK_PREFIX)?;
        Self::ALL.into_iter().find(|kind| kind.suffix() == suffix)
    }

    /// Whether the generic `call` path dispatches this kind
    ///
    /// Button and input events carry a payload and have dedicated paths.
    pub fn is_generic(self) -> bool {
        !matches!(
            self,
            EventKind::Button | EventKind::InputValueChange | EventKind::InputCaretMove
        )
    }

    /// Capability bit for this kind
    pub fn capability(self) -> Capabilities {
        Capabilities::from_bits_truncate(1 << self as u32)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

bitflags! {
    /// Set of events a mod's hooks handle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const OPEN = 1 << 0;
        const CLOSE = 1 << 1;
        const LOAD = 1 << 2;
        const UNLOAD = 1 << 3;
        const BUTTON = 1 << 4;
        const CREATE = 1 << 5;
        const SLIDER_TEXT = 1 << 6;
        const ACCESS_CHECK = 1 << 7;
        const WORLD_LOAD = 1 << 8;
        const WORLD_EXIT = 1 << 9;
        const INPUT_CHANGE = 1 << 10;
        const INPUT_CARET_MOVE = 1 << 11;
    }
}

impl Capabilities {
    /// Check whether the hook for `kind` is bound
    pub fn handles(self, kind: EventKind) -> bool {
        self.contains(kind.capability())
    }
}
