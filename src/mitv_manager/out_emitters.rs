use crate::{ManagerOutputMessage, PowerState};

use super::MiTvManager;

// ------------------------------------------------------------------------------------------------
// Emit various ManagerOutputMessages to the caller.
// ------------------------------------------------------------------------------------------------

impl MiTvManager {
    /// Emit all current TV state to the caller.
    pub(crate) async fn emit_all_state(&self) {
        let tv_state = self.controller.tv_state().await;

        self.emit_power_state(tv_state.power_state).await;
        self.emit_active_identifier(tv_state.active_identifier)
            .await;
    }

    /// Send the given `PowerState` to the caller.
    pub(crate) async fn emit_power_state(&self, power_state: PowerState) {
        let _ = self
            .send_out(ManagerOutputMessage::PowerState(power_state))
            .await;
    }

    /// Send the given active input identifier to the caller.
    pub(crate) async fn emit_active_identifier(&self, identifier: u32) {
        let _ = self
            .send_out(ManagerOutputMessage::ActiveIdentifier(identifier))
            .await;
    }
}
