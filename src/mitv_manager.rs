mod message_senders;
mod orchestration;
mod out_emitters;

use log::{info, warn};
use tokio::select;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio_util::task::TaskTracker;

use crate::{
    ClientError, ControllerSettings, DeviceAddress, MiTvController, PowerState, RemoteKey,
    VolumeSelector,
};

#[cfg(doc)]
use crate::MiTvManagerBuilder;

// CHANNEL MESSAGES -------------------------------------------------------------------------------

/// Messages sent from the caller to the [`MiTvManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerMessage {
    /// Check that the TV is reachable. The TV is considered on if it responds. The TV cannot be
    /// woken remotely.
    PowerOn,
    /// Send the power key to the TV (if it is reachable). The TV is considered off afterwards.
    PowerOff,
    /// Send a remote control key press. Keys without a TV key code are ignored.
    SendRemoteKey(RemoteKey),
    /// Send a raw TV key code (e.g. `"home"`).
    SendKeyCode(String),
    /// Switch to the named input source (e.g. `"hdmi1"`).
    ChangeSource(String),
    /// Switch to the input with the given identifier. Identifiers without an input source go to
    /// the home screen.
    SetActiveIdentifier(u32),
    /// Change the volume by one step.
    SetVolume(VolumeSelector),
    /// Request sending of all current state as instances of `ManagerOutputMessage`.
    EmitAllState,
    /// Shut down the [`MiTvManager`]. Stops the keepalive ticker and waits for in-flight
    /// commands to complete.
    ShutDown,
}

/// Messages sent from the [`MiTvManager`] back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerOutputMessage {
    /// The TV's inferred power state.
    PowerState(PowerState),
    /// The identifier of the TV's active input.
    ActiveIdentifier(u32),
    /// A [`MiTvManager`] error occurred.
    Error(ManagerError),
}

// ================================================================================================
// Additional structs

/// Errors sent from the [`MiTvManager`] back to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManagerError {
    /// A command sent to the TV failed.
    #[error("Command failed: {0}")]
    Command(#[from] ClientError),
}

// ================================================================================================
// MiTvManager
//
// Design notes:
//
//  - The manager expects to be run once by the caller, and to run until shut down.
//  - All input from the caller is received over a receiver channel.
//  - All output to the caller is sent over a sender channel.
//  - Commands to the TV are performed by the controller, which owns the TV's inferred state. The
//    manager forwards the controller's power state changes to the caller.
//  - Each caller message is acted on in its own task. A slow or unresponsive TV does not block
//    the manager from receiving further messages, and a user command may be in flight at the same
//    time as a keepalive probe.
//  - Command failures are never fatal. They are reported to the caller as errors.
// ================================================================================================

/// Manage a Mi TV.
///
/// The interface to `MiTvManager` (after instantiation with [`MiTvManager::new()`] and running
/// with [`MiTvManager::run()`]) is mostly contained to the sending and receiving of
/// [`ManagerMessage`] and [`ManagerOutputMessage`].
pub struct MiTvManager {
    controller: MiTvController,
    command_rx: Receiver<ManagerMessage>,
    output_tx: Sender<ManagerOutputMessage>,
}

/// Usage example:
///
/// ```no_run
/// use mitv_manager::{DeviceAddress, ManagerMessage, MiTvManager};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() {
///     let (to_manager, to_manager_rx) = mpsc::channel(32);
///     let (mut manager, mut from_manager) =
///         MiTvManager::new(DeviceAddress::with_default_port("10.0.0.101"), to_manager_rx)
///             .unwrap();
///
///     // Start a task to receive `ManagerOutputMessage` messages on `from_manager`
///     // Start a task to send `ManagerMessage` messages on `to_manager`
///
///     manager.run().await;
/// }
/// ```
impl MiTvManager {
    /// Creates a `MiTvManager` instance for the TV at `address`.
    ///
    /// Expects to be given a tokio mpsc `Receiver` of [`ManagerMessage`]s from the caller. Returns
    /// a tuple of itself and a `Receiver` of [`ManagerOutputMessage`]s back to the caller.
    ///
    /// Use [`MiTvManagerBuilder`] to override any `MiTvManager` defaults.
    pub fn new(
        address: DeviceAddress,
        command_rx: Receiver<ManagerMessage>,
    ) -> Result<(MiTvManager, Receiver<ManagerOutputMessage>), ClientError> {
        MiTvManager::with_settings(address, ControllerSettings::default(), command_rx)
    }

    pub(crate) fn with_settings(
        address: DeviceAddress,
        settings: ControllerSettings,
        command_rx: Receiver<ManagerMessage>,
    ) -> Result<(MiTvManager, Receiver<ManagerOutputMessage>), ClientError> {
        let (output_tx, manager_channel_rx) = channel(32);

        let manager = MiTvManager {
            controller: MiTvController::new(address, settings)?,
            command_rx,
            output_tx,
        };

        Ok((manager, manager_channel_rx))
    }

    /// The controller used by the manager to communicate with the TV.
    pub fn controller(&self) -> &MiTvController {
        &self.controller
    }

    /// Run the manager.
    ///
    /// This is the main hub of `MiTvManager`. It runs until it receives
    /// [`ManagerMessage::ShutDown`] (or the caller's channel closes), performing the following
    /// tasks:
    ///
    /// 1. Starting the keepalive ticker.
    /// 2. Sending the current state to the caller.
    /// 3. Looping until shut down, doing the following:
    ///     * Accepting (and acting on) `ManagerMessage` messages from the caller.
    ///     * Sending power state changes back to the caller.
    pub async fn run(&mut self) {
        info!("Manager starting up for TV at {}", self.controller.address());

        let task_tracker = TaskTracker::new();
        let keepalive = self.controller.start_keepalive();
        let mut power_rx = self.controller.subscribe();

        self.emit_all_state().await;

        info!("Manager ready to receive commands");

        loop {
            select! {
                // FROM THE CALLER ----------------------------------------------------------------

                manager_msg = self.command_rx.recv() => {
                    match manager_msg {
                        Some(ManagerMessage::EmitAllState) => {
                            self.emit_all_state().await;
                        }
                        Some(ManagerMessage::ShutDown) => {
                            info!("Manager shutting down");
                            break;
                        }
                        Some(manager_msg) => {
                            self.spawn_action(&task_tracker, manager_msg);
                        }
                        None => {
                            warn!("Command channel closed; manager shutting down");
                            break;
                        }
                    }
                }

                // FROM THE CONTROLLER ------------------------------------------------------------

                Ok(()) = power_rx.changed() => {
                    let power_state = *power_rx.borrow_and_update();
                    self.emit_power_state(power_state).await;
                }
            }
        }

        info!("Manager waiting for tasks to shut down");

        keepalive.stop().await;
        task_tracker.close();
        task_tracker.wait().await;

        // Commands still in flight at shutdown may have changed the power state
        if power_rx.has_changed().unwrap_or(false) {
            let power_state = *power_rx.borrow_and_update();
            self.emit_power_state(power_state).await;
        }

        info!("Tasks shut down successfully");
    }
}

// ================================================================================================
// Tests
