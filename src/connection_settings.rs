use std::fmt;
use std::time::Duration;

/// The HTTP control port used by Mi TVs.
pub const DEFAULT_PORT: u16 = 6095;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_COUNTDOWN_MAX: u32 = 12;
const DEFAULT_PROBE_THRESHOLD: u32 = 6;

/// Network address of a single TV.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: u16,
}

impl DeviceAddress {
    /// Create an address from a host name or IP address (IPv4 or IPv6) and a port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Create an address using [`DEFAULT_PORT`].
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Power tracking settings for a [`crate::MiTvController`]. Can be created with
/// [`ControllerSettingsBuilder`].
///
/// The controller counts down one step per `tick_interval` while the TV is on. Any successful
/// command resets the countdown to `countdown_max`. A liveness probe is sent when the countdown
/// reaches `probe_threshold`, and the TV is presumed off when it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub tick_interval: Duration,
    pub countdown_max: u32,
    pub probe_threshold: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettingsBuilder::new().build()
    }
}

/// Build a [`ControllerSettings`] instance.
///
/// Examples:
/// ```
/// use std::time::Duration;
///
/// use mitv_manager::ControllerSettingsBuilder;
///
/// // Default controller settings
/// ControllerSettingsBuilder::default();
///
/// // Controller settings with overrides
/// ControllerSettingsBuilder::new()
///     .with_tick_interval(Duration::from_secs(5))
///     .with_countdown_max(24)
///     .with_probe_threshold(12)
///     .build();
/// ```
pub struct ControllerSettingsBuilder {
    tick_interval: Duration,
    countdown_max: u32,
    probe_threshold: u32,
}

impl Default for ControllerSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerSettingsBuilder {
    pub fn new() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            countdown_max: DEFAULT_COUNTDOWN_MAX,
            probe_threshold: DEFAULT_PROBE_THRESHOLD,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_countdown_max(mut self, countdown_max: u32) -> Self {
        self.countdown_max = countdown_max;
        self
    }

    pub fn with_probe_threshold(mut self, probe_threshold: u32) -> Self {
        self.probe_threshold = probe_threshold;
        self
    }

    /// Build the settings. The probe threshold is clamped to lie strictly between zero and
    /// `countdown_max` (it is zero, i.e. never reached by a tick, if `countdown_max` < 2).
    pub fn build(&mut self) -> ControllerSettings {
        let probe_threshold = if self.countdown_max < 2 {
            0
        } else {
            self.probe_threshold.clamp(1, self.countdown_max - 1)
        };

        ControllerSettings {
            tick_interval: self.tick_interval,
            countdown_max: self.countdown_max,
            probe_threshold,
        }
    }
}

// ================================================================================================
// Tests
