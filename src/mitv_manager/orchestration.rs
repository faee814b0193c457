use log::{debug, warn};
use tokio::sync::mpsc::Sender;
use tokio_util::task::TaskTracker;

use super::MiTvManager;
use crate::{ClientError, ManagerError, ManagerMessage, ManagerOutputMessage, MiTvController};

// ------------------------------------------------------------------------------------------------
// Orchestration between the Manager and the Controller
//
// These functions are invoked as a result of a received `ManagerMessage` from the caller. Each
// action runs in its own tracked task, and reports back to the caller over a clone of the
// manager's output channel.
// ------------------------------------------------------------------------------------------------

impl MiTvManager {
    /// Act on `message` in a new task tracked by `task_tracker`.
    pub(crate) fn spawn_action(&self, task_tracker: &TaskTracker, message: ManagerMessage) {
        let controller = self.controller.clone();
        let output_tx = self.output_tx.clone();

        task_tracker.spawn(async move {
            MiTvManager::perform_action(&controller, &output_tx, message).await;
        });
    }

    async fn perform_action(
        controller: &MiTvController,
        output_tx: &Sender<ManagerOutputMessage>,
        message: ManagerMessage,
    ) {
        debug!("Performing action: {:?}", &message);

        let result: Result<(), ClientError> = match message {
            ManagerMessage::PowerOn => {
                controller.power_on().await;
                Ok(())
            }
            ManagerMessage::PowerOff => {
                controller.power_off().await;
                Ok(())
            }
            ManagerMessage::SendRemoteKey(key) => {
                controller.send_remote_key(key).await.map(|_| ())
            }
            ManagerMessage::SendKeyCode(key_code) => {
                controller.send_key(&key_code).await.map(|_| ())
            }
            ManagerMessage::ChangeSource(source) => {
                controller.change_source(&source).await.map(|_| ())
            }
            ManagerMessage::SetActiveIdentifier(identifier) => {
                let previous = controller.active_identifier().await;
                let result = controller
                    .set_active_identifier(identifier)
                    .await
                    .map(|_| ());

                let current = controller.active_identifier().await;
                if current != previous {
                    let _ = MiTvManager::send_out_with_sender(
                        output_tx,
                        ManagerOutputMessage::ActiveIdentifier(current),
                    )
                    .await;
                }

                result
            }
            ManagerMessage::SetVolume(selector) => {
                controller.set_volume(selector).await.map(|_| ())
            }
            ManagerMessage::EmitAllState | ManagerMessage::ShutDown => {
                warn!("Message is handled by the manager loop, not as an action: {:?}", &message);
                Ok(())
            }
        };

        if let Err(e) = result {
            let _ = MiTvManager::send_out_with_sender(
                output_tx,
                ManagerOutputMessage::Error(ManagerError::Command(e)),
            )
            .await;
        }
    }
}
