//! Translation of abstract remote control keys to Mi TV key codes.

use std::collections::HashMap;
use std::fmt;

/// Keys of an abstract TV remote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Select,
    Back,
    Exit,
    Information,
    PlayPause,
    Rewind,
    FastForward,
    NextTrack,
    PreviousTrack,
    VolumeUp,
    VolumeDown,
    Power,
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Lookup table from [`RemoteKey`] to the TV's key code vocabulary.
///
/// Not every key has a TV equivalent. Looking up an unmapped key returns `None`, which callers
/// treat as "nothing to send".
#[derive(Debug, Clone)]
pub struct KeyTranslationTable {
    keys: HashMap<RemoteKey, &'static str>,
}

impl Default for KeyTranslationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTranslationTable {
    pub fn new() -> Self {
        let keys = HashMap::from([
            (RemoteKey::ArrowUp, "up"),
            (RemoteKey::ArrowDown, "down"),
            (RemoteKey::ArrowLeft, "left"),
            (RemoteKey::ArrowRight, "right"),
            (RemoteKey::Select, "enter"),
            (RemoteKey::Back, "back"),
            (RemoteKey::Information, "menu"),
            // The TV has no play/pause key; the remote's play/pause button goes home instead
            (RemoteKey::PlayPause, "home"),
            (RemoteKey::VolumeUp, "volumeup"),
            (RemoteKey::VolumeDown, "volumedown"),
            (RemoteKey::Power, "power"),
        ]);

        KeyTranslationTable { keys }
    }

    /// The TV key code for `key`, if there is one.
    pub fn get(&self, key: RemoteKey) -> Option<&'static str> {
        self.keys.get(&key).copied()
    }
}

// ================================================================================================
// Tests
