use std::fmt;

/// Identifier of the TV's home screen input.
pub const HOME_SCREEN_IDENTIFIER: u32 = 10;

/// Inferred power state of the TV.
///
/// The TV cannot report whether it is on, so this is an inference from recent command outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// No command has completed yet.
    #[default]
    Unknown,
    Off,
    On,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A TV input source, addressed by its numeric identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Hdmi1,
    Hdmi2,
    Hdmi3,
}

impl InputSource {
    /// The input for an identifier. The home screen (and any unknown identifier) is not an
    /// input source.
    pub fn from_identifier(identifier: u32) -> Option<InputSource> {
        match identifier {
            11 => Some(InputSource::Hdmi1),
            12 => Some(InputSource::Hdmi2),
            13 => Some(InputSource::Hdmi3),
            _ => None,
        }
    }

    pub fn identifier(&self) -> u32 {
        match self {
            InputSource::Hdmi1 => 11,
            InputSource::Hdmi2 => 12,
            InputSource::Hdmi3 => 13,
        }
    }

    /// The source name used by the TV's `changesource` action.
    pub fn source_name(&self) -> &'static str {
        match self {
            InputSource::Hdmi1 => "hdmi1",
            InputSource::Hdmi2 => "hdmi2",
            InputSource::Hdmi3 => "hdmi3",
        }
    }
}

/// Direction of a volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeSelector {
    Increment,
    Decrement,
}

impl VolumeSelector {
    pub fn key_code(&self) -> &'static str {
        match self {
            VolumeSelector::Increment => "volumeup",
            VolumeSelector::Decrement => "volumedown",
        }
    }
}

/// Counts down the ticks since the last successful interaction with the TV.
///
/// The value always lies within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityCountdown {
    value: u32,
    max: u32,
}

impl ActivityCountdown {
    pub fn new(max: u32) -> Self {
        ActivityCountdown { value: max, max }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn reset(&mut self) {
        self.value = self.max;
    }

    /// Count down one step (stopping at zero) and return the new value.
    pub fn decrement(&mut self) -> u32 {
        self.value = self.value.saturating_sub(1);
        self.value
    }

    pub fn is_expired(&self) -> bool {
        self.value == 0
    }
}

/// Snapshot of the controller's view of the TV.
#[derive(Debug, Clone, PartialEq)]
pub struct TvState {
    pub power_state: PowerState,
    pub countdown: ActivityCountdown,
    pub active_identifier: u32,
}

// ================================================================================================
// Tests
