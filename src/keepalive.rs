use log::{debug, info};
use tokio::{
    select,
    task::JoinHandle,
    time::{interval, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::MiTvController;

/// Handle to a running keepalive ticker.
///
/// The ticker calls [`MiTvController::on_tick`] once per tick interval. Dropping the handle
/// cancels the ticker without waiting for it to finish.
pub struct KeepaliveHandle {
    cancel_token: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl KeepaliveHandle {
    pub(crate) fn start(controller: MiTvController, tick_interval: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let task_cancel_token = cancel_token.clone();

        let join_handle = tokio::spawn(async move {
            info!(
                "Starting keepalive for TV at {} (tick interval: {:?})",
                controller.address(),
                tick_interval
            );

            let mut ticker = interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            ticker.tick().await;

            loop {
                select! {
                    _ = ticker.tick() => {
                        controller.on_tick().await;
                    }
                    _ = task_cancel_token.cancelled() => {
                        debug!("Keepalive cancelled");
                        break;
                    }
                }
            }

            info!("Keepalive for TV at {} stopped", controller.address());
        });

        KeepaliveHandle {
            cancel_token,
            join_handle: Some(join_handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the ticker and wait for it to exit. A tick already in progress completes first.
    pub async fn stop(mut self) {
        self.cancel_token.cancel();

        if let Some(join_handle) = self.join_handle.take() {
            let _ = join_handle.await;
        }
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

// ================================================================================================
// Tests
