use log::debug;
use tokio::sync::mpsc::Receiver;

use crate::{
    ClientError, ControllerSettings, DeviceAddress, ManagerMessage, ManagerOutputMessage,
    MiTvManager,
};

/// Build a [`MiTvManager`] instance.
///
/// ```
/// use std::time::Duration;
///
/// use mitv_manager::{ControllerSettingsBuilder, DeviceAddress, MiTvManagerBuilder};
/// use tokio::sync::mpsc;
///
/// let (to_manager_tx, to_manager_rx) = mpsc::channel(32);
///
/// let (mut manager, mut from_manager_rx) =
///     MiTvManagerBuilder::new(DeviceAddress::with_default_port("10.0.0.101"), to_manager_rx)
///         .with_settings(
///             ControllerSettingsBuilder::new()
///                 .with_tick_interval(Duration::from_secs(5))
///                 .build(),
///         )
///         .build()
///         .unwrap();
/// ```
pub struct MiTvManagerBuilder {
    address: DeviceAddress,
    settings: ControllerSettings,
    command_receiver: Receiver<ManagerMessage>,
}

impl MiTvManagerBuilder {
    pub fn new(address: DeviceAddress, command_receiver: Receiver<ManagerMessage>) -> Self {
        MiTvManagerBuilder {
            address,
            settings: ControllerSettings::default(),
            command_receiver,
        }
    }

    /// Override the default controller settings (tick interval and activity countdown).
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        debug!("Builder is overriding controller settings: {:?}", settings);
        self.settings = settings;

        self
    }

    pub fn build(self) -> Result<(MiTvManager, Receiver<ManagerOutputMessage>), ClientError> {
        debug!("Builder is instantiating a MiTvManager instance");

        MiTvManager::with_settings(self.address, self.settings, self.command_receiver)
    }
}
