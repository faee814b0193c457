//! Power state inference and command dispatch for a single Mi TV.
//!
//! The TV offers no push notifications and no power query. [`MiTvController`] infers the power
//! state from the outcomes of the commands it sends, and keeps an [`ActivityCountdown`] of ticks
//! since the last successful command. While the TV is on, a background tick counts down; a
//! liveness probe is sent part way through, and the TV is presumed off once the countdown runs
//! out.
//!
//! Every successful command resets the countdown. Commands are not serialized: a user command and
//! a background probe can be in flight at once, and whichever completes last determines the
//! state.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{watch, Mutex};

use crate::api_payloads::CommandReply;
use crate::keepalive::KeepaliveHandle;
use crate::power_state_machine::{Input, Output, PowerFsm};
use crate::state::HOME_SCREEN_IDENTIFIER;
use crate::{
    ActivityCountdown, ClientError, ControllerSettings, DeviceAddress, InputSource,
    KeyTranslationTable, MiTvClient, PowerState, RemoteKey, TvCommand, TvState, VolumeSelector,
};

const POWER_KEY_CODE: &str = "power";
const HOME_KEY_CODE: &str = "home";

/// State owned by the controller. Only the controller's transition methods write to it.
struct ControllerState {
    fsm: PowerFsm,
    countdown: ActivityCountdown,
    active_identifier: u32,
}

struct ControllerInner {
    client: MiTvClient,
    key_table: KeyTranslationTable,
    settings: ControllerSettings,
    state: Mutex<ControllerState>,
    power_tx: watch::Sender<PowerState>,
}

/// Controls a single TV and tracks its inferred power state.
///
/// Cloning produces another handle to the same controller.
///
/// ```no_run
/// use mitv_manager::{ControllerSettings, DeviceAddress, MiTvController, RemoteKey};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), mitv_manager::ClientError> {
/// let controller = MiTvController::new(
///     DeviceAddress::with_default_port("10.0.0.101"),
///     ControllerSettings::default(),
/// )?;
///
/// let keepalive = controller.start_keepalive();
///
/// controller.power_on().await;
/// controller.send_remote_key(RemoteKey::ArrowDown).await?;
///
/// keepalive.stop().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MiTvController {
    inner: Arc<ControllerInner>,
}

impl MiTvController {
    /// Create a controller for the TV at `address`. The power state starts as
    /// [`PowerState::Unknown`].
    pub fn new(address: DeviceAddress, settings: ControllerSettings) -> Result<Self, ClientError> {
        let client = MiTvClient::new(address)?;
        let (power_tx, _) = watch::channel(PowerState::Unknown);

        Ok(MiTvController {
            inner: Arc::new(ControllerInner {
                client,
                key_table: KeyTranslationTable::new(),
                state: Mutex::new(ControllerState {
                    fsm: PowerFsm::new(),
                    countdown: ActivityCountdown::new(settings.countdown_max),
                    active_identifier: HOME_SCREEN_IDENTIFIER,
                }),
                settings,
                power_tx,
            }),
        })
    }

    pub fn address(&self) -> &DeviceAddress {
        self.inner.client.address()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.inner.settings
    }

    pub async fn power_state(&self) -> PowerState {
        *self.inner.state.lock().await.fsm.state()
    }

    pub async fn countdown(&self) -> ActivityCountdown {
        self.inner.state.lock().await.countdown
    }

    pub async fn active_identifier(&self) -> u32 {
        self.inner.state.lock().await.active_identifier
    }

    /// Snapshot of the controller's current view of the TV.
    pub async fn tv_state(&self) -> TvState {
        let state = self.inner.state.lock().await;

        TvState {
            power_state: *state.fsm.state(),
            countdown: state.countdown,
            active_identifier: state.active_identifier,
        }
    }

    /// Subscribe to power state changes.
    pub fn subscribe(&self) -> watch::Receiver<PowerState> {
        self.inner.power_tx.subscribe()
    }

    /// Start calling [`MiTvController::on_tick`] every `tick_interval`. The ticker runs until
    /// the returned handle is stopped or dropped.
    pub fn start_keepalive(&self) -> KeepaliveHandle {
        KeepaliveHandle::start(self.clone(), self.inner.settings.tick_interval)
    }

    // --------------------------------------------------------------------------------------------
    // Power

    /// Check whether the TV is reachable, and consider it on if it is.
    ///
    /// The TV cannot be woken remotely, so an unreachable TV is considered off. Failures are
    /// logged and not returned.
    pub async fn power_on(&self) -> PowerState {
        info!("Powering on TV at {}", self.address());

        if let Err(e) = self
            .dispatch(&TvCommand::Alive, Some(Input::AliveConfirmed))
            .await
        {
            debug!("TV at {} is not reachable: {}", self.address(), e);
            self.transition(Input::Unreachable).await;
        }

        self.power_state().await
    }

    /// Turn the TV off.
    ///
    /// The power key is only sent if the TV first responds to a liveness check. The TV is
    /// considered off afterwards either way. Failures are logged and not returned.
    pub async fn power_off(&self) -> PowerState {
        info!("Powering off TV at {}", self.address());

        match self.dispatch(&TvCommand::Alive, None).await {
            Ok(_) => {
                if let Err(e) = self.send_key(POWER_KEY_CODE).await {
                    debug!("Could not send power key to TV: {}", e);
                }
            }
            Err(e) => {
                debug!("TV at {} is not reachable; not sending power key: {}", self.address(), e);
            }
        }

        self.transition(Input::TurnedOff).await;

        self.power_state().await
    }

    // --------------------------------------------------------------------------------------------
    // Remote control

    /// Send a key press using a TV key code. Does not change the power state.
    pub async fn send_key(&self, key_code: &str) -> Result<CommandReply, ClientError> {
        self.dispatch(&TvCommand::KeyEvent(key_code.to_string()), None)
            .await
    }

    /// Send a remote control key press. Keys without a TV key code are ignored and return
    /// `Ok(None)`.
    pub async fn send_remote_key(
        &self,
        key: RemoteKey,
    ) -> Result<Option<CommandReply>, ClientError> {
        match self.inner.key_table.get(key) {
            Some(key_code) => self.send_key(key_code).await.map(Some),
            None => {
                debug!("Remote key {} has no TV key code; ignoring", key);
                Ok(None)
            }
        }
    }

    /// Change the volume by one step.
    pub async fn set_volume(&self, selector: VolumeSelector) -> Result<CommandReply, ClientError> {
        self.send_key(selector.key_code()).await
    }

    /// Switch to the named input source (e.g. `"hdmi1"`). Does not change the power state.
    pub async fn change_source(&self, source: &str) -> Result<CommandReply, ClientError> {
        self.dispatch(&TvCommand::ChangeSource(source.to_string()), None)
            .await
    }

    /// Switch to the input with the given identifier.
    ///
    /// HDMI identifiers switch the TV's source and become the active identifier. Any other
    /// identifier (including the home screen) sends the home key instead.
    pub async fn set_active_identifier(
        &self,
        identifier: u32,
    ) -> Result<CommandReply, ClientError> {
        match InputSource::from_identifier(identifier) {
            Some(source) => {
                self.inner.state.lock().await.active_identifier = identifier;
                self.change_source(source.source_name()).await
            }
            None => {
                debug!(
                    "Identifier {} is not an input source; going to the home screen",
                    identifier
                );
                self.send_key(HOME_KEY_CODE).await
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Keepalive

    /// Advance the activity countdown by one tick.
    ///
    /// Does nothing unless the TV is on. A liveness probe is sent when the countdown reaches the
    /// probe threshold; a failed probe is logged only. The TV is considered off once the
    /// countdown reaches zero.
    pub async fn on_tick(&self) {
        let should_probe = {
            let mut state = self.inner.state.lock().await;

            if *state.fsm.state() != PowerState::On {
                return;
            }

            let remaining = state.countdown.decrement();
            debug!("Activity countdown: {}", remaining);

            if state.countdown.is_expired() {
                info!("No activity from TV at {}; presuming it is off", self.address());
                self.apply(&mut state, Input::CountdownExpired);

                return;
            }

            remaining == self.inner.settings.probe_threshold
        };

        if should_probe {
            debug!("Probing TV at {}", self.address());

            if let Err(e) = self.dispatch(&TvCommand::Alive, None).await {
                debug!("Keepalive probe failed: {}", e);
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Private

    /// Execute `command`. On success the countdown is reset and `on_success` (if any) is applied,
    /// both under the same lock.
    async fn dispatch(
        &self,
        command: &TvCommand,
        on_success: Option<Input>,
    ) -> Result<CommandReply, ClientError> {
        match self.inner.client.execute(command).await {
            Ok(reply) => {
                let mut state = self.inner.state.lock().await;
                state.countdown.reset();

                if let Some(input) = on_success {
                    self.apply(&mut state, input);
                }

                Ok(reply)
            }
            Err(e) => {
                warn!("{} failed: {}", command, e);
                Err(e)
            }
        }
    }

    async fn transition(&self, input: Input) {
        let mut state = self.inner.state.lock().await;
        self.apply(&mut state, input);
    }

    fn apply(&self, state: &mut ControllerState, input: Input) {
        match state.fsm.consume(&input) {
            Ok(Some(Output::AnnouncePowerState(power_state))) => {
                info!("TV at {} is now {}", self.address(), power_state);
                self.inner.power_tx.send_replace(power_state);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "Power state transition error with Input [{:?}] while in State '{:?}': {:?}",
                    &input,
                    state.fsm.state(),
                    e
                );
            }
        }
    }
}

// ================================================================================================
// Tests

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::MiTvController;
    use crate::test_support::{unused_address, FakeReply, FakeTv, BUSY_REPLY, OK_REPLY};
    use crate::{ControllerSettingsBuilder, DeviceAddress, PowerState, RemoteKey, VolumeSelector};

    const ALIVE: &str = "/request?action=isalive";

    fn build_controller(
        address: DeviceAddress,
        countdown_max: u32,
        threshold: u32,
    ) -> MiTvController {
        MiTvController::new(
            address,
            ControllerSettingsBuilder::new()
                .with_countdown_max(countdown_max)
                .with_probe_threshold(threshold)
                .build(),
        )
        .unwrap()
    }

    async fn ok_tv() -> FakeTv {
        FakeTv::start(|_| FakeReply::json(OK_REPLY)).await
    }

    #[tokio::test]
    async fn starts_unknown() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        assert_eq!(controller.power_state().await, PowerState::Unknown);
        assert_eq!(controller.active_identifier().await, 10);
    }

    #[tokio::test]
    async fn power_on_reachable() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);
        let mut power_rx = controller.subscribe();

        assert_eq!(controller.power_on().await, PowerState::On);
        assert_eq!(controller.countdown().await.value(), 12);
        assert_eq!(tv.requests().await, vec![ALIVE]);

        assert!(power_rx.has_changed().unwrap());
        assert_eq!(*power_rx.borrow_and_update(), PowerState::On);
    }

    #[tokio::test]
    async fn power_on_unreachable() {
        let controller = build_controller(unused_address().await, 12, 6);

        assert_eq!(controller.power_on().await, PowerState::Off);
    }

    #[tokio::test]
    async fn power_on_device_error() {
        let tv = FakeTv::start(|_| FakeReply::json(BUSY_REPLY)).await;
        let controller = build_controller(tv.address(), 12, 6);

        assert_eq!(controller.power_on().await, PowerState::Off);
    }

    #[tokio::test]
    async fn power_off_sends_power_key() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        controller.power_on().await;
        assert_eq!(controller.power_off().await, PowerState::Off);

        assert_eq!(
            tv.requests().await,
            vec![ALIVE, ALIVE, "/controller?action=keyevent&keycode=power"]
        );
    }

    #[tokio::test]
    async fn power_off_when_power_key_fails() {
        let tv = FakeTv::start(|target| {
            if target == ALIVE {
                FakeReply::json(OK_REPLY)
            } else {
                FakeReply::json(BUSY_REPLY)
            }
        })
        .await;
        let controller = build_controller(tv.address(), 12, 6);

        controller.power_on().await;
        assert_eq!(controller.power_off().await, PowerState::Off);
    }

    #[tokio::test]
    async fn power_off_unreachable_skips_power_key() {
        let tv = FakeTv::start(|_| FakeReply::json(BUSY_REPLY)).await;
        let controller = build_controller(tv.address(), 12, 6);

        assert_eq!(controller.power_off().await, PowerState::Off);
        assert_eq!(tv.requests().await, vec![ALIVE]);
    }

    #[tokio::test]
    async fn failed_key_does_not_change_power_state() {
        let tv = FakeTv::start(|target| {
            if target == ALIVE {
                FakeReply::json(OK_REPLY)
            } else {
                FakeReply::json(BUSY_REPLY)
            }
        })
        .await;
        let controller = build_controller(tv.address(), 12, 6);

        controller.power_on().await;

        assert!(controller.send_key("up").await.is_err());
        assert!(controller.change_source("hdmi1").await.is_err());
        assert_eq!(controller.power_state().await, PowerState::On);
    }

    #[tokio::test]
    async fn keys_do_not_turn_on() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        assert!(controller.send_key("up").await.is_ok());
        assert!(controller.set_volume(VolumeSelector::Increment).await.is_ok());
        assert_eq!(controller.power_state().await, PowerState::Unknown);
    }

    #[tokio::test]
    async fn successful_command_resets_countdown() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 5, 2);

        controller.power_on().await;
        controller.on_tick().await;
        controller.on_tick().await;
        assert_eq!(controller.countdown().await.value(), 3);

        controller.send_key("down").await.unwrap();
        assert_eq!(controller.countdown().await.value(), 5);
    }

    #[tokio::test]
    async fn remote_keys() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        assert!(controller
            .send_remote_key(RemoteKey::Select)
            .await
            .unwrap()
            .is_some());
        assert!(controller
            .send_remote_key(RemoteKey::Rewind)
            .await
            .unwrap()
            .is_none());
        controller
            .set_volume(VolumeSelector::Decrement)
            .await
            .unwrap();

        assert_eq!(
            tv.requests().await,
            vec![
                "/controller?action=keyevent&keycode=enter",
                "/controller?action=keyevent&keycode=volumedown",
            ]
        );
    }

    #[tokio::test]
    async fn hdmi_identifier_changes_source() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        controller.set_active_identifier(11).await.unwrap();

        assert_eq!(controller.active_identifier().await, 11);
        assert_eq!(
            tv.requests().await,
            vec!["/controller?action=changesource&source=hdmi1"]
        );
    }

    #[tokio::test]
    async fn unmapped_identifier_goes_home() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 12, 6);

        controller.set_active_identifier(12).await.unwrap();
        controller.set_active_identifier(10).await.unwrap();
        controller.set_active_identifier(42).await.unwrap();

        assert_eq!(controller.active_identifier().await, 12);
        assert_eq!(
            tv.requests().await,
            vec![
                "/controller?action=changesource&source=hdmi2",
                "/controller?action=keyevent&keycode=home",
                "/controller?action=keyevent&keycode=home",
            ]
        );
    }

    #[tokio::test]
    async fn tick_is_noop_unless_on() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 2, 1);

        for _ in 0..5 {
            controller.on_tick().await;
        }

        assert_eq!(controller.power_state().await, PowerState::Unknown);
        assert_eq!(controller.countdown().await.value(), 2);
        assert!(tv.requests().await.is_empty());

        let unreachable = build_controller(unused_address().await, 2, 1);
        unreachable.power_on().await;
        unreachable.on_tick().await;
        assert_eq!(unreachable.power_state().await, PowerState::Off);
        assert_eq!(unreachable.countdown().await.value(), 2);
    }

    #[tokio::test]
    async fn threshold_probe_success_resets_countdown() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 4, 2);

        controller.power_on().await;
        controller.on_tick().await; // 3
        controller.on_tick().await; // 2: probe

        assert_eq!(controller.countdown().await.value(), 4);
        assert_eq!(controller.power_state().await, PowerState::On);
        assert_eq!(tv.requests().await, vec![ALIVE, ALIVE]);
    }

    #[tokio::test]
    async fn threshold_probe_failure_keeps_counting_down() {
        let reachable = Arc::new(AtomicBool::new(true));
        let tv_reachable = Arc::clone(&reachable);

        let tv = FakeTv::start(move |_| {
            if tv_reachable.load(Ordering::SeqCst) {
                FakeReply::json(OK_REPLY)
            } else {
                FakeReply::json(BUSY_REPLY)
            }
        })
        .await;
        let controller = build_controller(tv.address(), 4, 2);

        controller.power_on().await;
        reachable.store(false, Ordering::SeqCst);

        controller.on_tick().await; // 3
        controller.on_tick().await; // 2: failed probe

        assert_eq!(controller.power_state().await, PowerState::On);
        assert_eq!(controller.countdown().await.value(), 2);

        controller.on_tick().await; // 1
        assert_eq!(controller.power_state().await, PowerState::On);
        assert_eq!(controller.countdown().await.value(), 1);

        controller.on_tick().await; // 0: expired
        assert_eq!(controller.power_state().await, PowerState::Off);
        assert_eq!(tv.requests().await, vec![ALIVE, ALIVE]);
    }

    #[tokio::test]
    async fn tv_state_snapshot() {
        let tv = ok_tv().await;
        let controller = build_controller(tv.address(), 3, 1);

        controller.power_on().await;
        controller.set_active_identifier(13).await.unwrap();

        let tv_state = controller.tv_state().await;
        assert_eq!(tv_state.power_state, PowerState::On);
        assert_eq!(tv_state.countdown.value(), 3);
        assert_eq!(tv_state.active_identifier, 13);
    }
}
