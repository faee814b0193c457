/*!
Asynchronous control manager for Xiaomi (Mi) TVs.

[`MiTvManager`] manages an asynchronous interface to Mi TVs supporting the TV's local HTTP
control API (port 6095).

## Features

* Sending remote control key presses and raw key codes to the TV.
* Switching the TV's input source.
* Inferring the TV's power state, which the TV itself does not report.
* Keepalive probing to detect a TV which has been turned off by other means.

## Overview

A `MiTvManager` instance:

1. Owns a [`MiTvController`] for a single TV, and runs its keepalive ticker.
2. Accepts [`ManagerMessage`] messages from the caller to:
    * Power the TV on or off.
    * Send [`RemoteKey`] presses, raw key codes, and volume changes.
    * Switch the TV's input source.
    * Shut down.
3. Sends [`ManagerOutputMessage`] updates back to the caller:
    * Changes to the TV's inferred [`PowerState`].
    * Changes to the active input identifier.
    * Any command errors.

To view the full documentation, clone the repository and run `cargo doc --open`.

Run the example with:

```sh
cargo run --example control
```

## The Mi TV control API

The TV listens for plain HTTP `GET` requests on port 6095. There is no authentication, no
pairing, and no persistent connection. Each request is a [`TvCommand`]:

* `Alive`: `/request?action=isalive`
* `KeyEvent`: `/controller?action=keyevent&keycode=<code>`
* `ChangeSource`: `/controller?action=changesource&source=<source>`

The TV replies with a JSON object carrying a `status` (or `code`) of `0` on success. Any request
which does not complete within 500ms is treated as a timeout.

[`MiTvClient`] can be used directly to send commands without any power state tracking.

## Power state

The TV cannot be woken over the network, and offers no way to query whether it is on. The
[`MiTvController`] therefore infers the TV's power state:

* A successful liveness check while powering on means the TV is [`PowerState::On`].
* A failed liveness check while powering on means the TV is [`PowerState::Off`].
* Powering off always leaves the TV [`PowerState::Off`].
* Every successful command resets an [`ActivityCountdown`]. While the TV is on, the keepalive
  ticker counts down once per tick interval. A liveness probe is sent part way through the
  countdown, and the TV is presumed off when the countdown reaches zero.

Failed key presses and source changes never change the power state.

The tick interval, countdown length, and probe threshold can be configured with the
[`ControllerSettingsBuilder`].

## Instantiating

Instantiate a `MiTvManager` with [`MiTvManager::new()`], providing the TV's address and a channel
that will be used to send [`ManagerMessage`] messages to the manager. `MiTvManager::new()` will
return a tuple of the manager instance itself, and another channel over which the manager will
send [`ManagerOutputMessage`] messages back to the caller.

```
use mitv_manager::{DeviceAddress, MiTvManager};
use tokio::sync::mpsc;

let (to_manager, to_manager_rx) = mpsc::channel(32);
let (mut manager, mut from_manager) =
    MiTvManager::new(DeviceAddress::with_default_port("10.0.0.101"), to_manager_rx).unwrap();

// Send messages with to_manager.send()
// Receive messages with from_manager.recv()
```

Optionally, controller settings can be configured using the [`MiTvManagerBuilder`].

## Sending commands

Once the manager is running, commands can be sent at any time. There is no connection to
establish first. Each command is performed in its own task, so a slow TV does not hold up later
commands.

```
use mitv_manager::{ManagerMessage, RemoteKey, VolumeSelector};
use tokio::sync::mpsc;

# #[tokio::main]
# async fn main() {
let (to_manager, to_manager_rx) = mpsc::channel(32);

// <Instantiate and run the manager first>

let _ = to_manager.send(ManagerMessage::PowerOn).await;
let _ = to_manager.send(ManagerMessage::SendRemoteKey(RemoteKey::ArrowDown)).await;
let _ = to_manager.send(ManagerMessage::SetVolume(VolumeSelector::Increment)).await;
let _ = to_manager.send(ManagerMessage::SetActiveIdentifier(11)).await;
# }
```

Remote keys without a TV key code (such as [`RemoteKey::Rewind`]) are ignored. Input identifiers
11, 12, and 13 select HDMI 1 to 3; any other identifier goes to the home screen.

## Shutting down

Send [`ManagerMessage::ShutDown`] to stop the keepalive ticker and exit. The manager waits for any
in-flight commands to complete before [`MiTvManager::run()`] returns.

## Examples

(Note: The example relies on the third-party crates `env_logger` and `tokio`).

The `control` example creates a `MiTvManager` instance, sends commands to the manager via the
console, and prints all messages received from the manager. **This example likely won't work
without updating the TV IP address**.
*/

mod api_payloads;
mod commands;
mod connection_settings;
mod controller;
mod helpers;
mod http_client;
mod keepalive;
mod key_map;
mod mitv_manager;
mod mitv_manager_builder;
mod power_state_machine;
mod state;

#[cfg(test)]
mod test_support;

pub use api_payloads::CommandReply;
pub use commands::TvCommand;
pub use connection_settings::{
    ControllerSettings, ControllerSettingsBuilder, DeviceAddress, DEFAULT_PORT,
};
pub use controller::MiTvController;
pub use http_client::{ClientError, MiTvClient};
pub use keepalive::KeepaliveHandle;
pub use key_map::{KeyTranslationTable, RemoteKey};
pub use mitv_manager::{ManagerError, ManagerMessage, ManagerOutputMessage, MiTvManager};
pub use mitv_manager_builder::MiTvManagerBuilder;
pub use state::{
    ActivityCountdown, InputSource, PowerState, TvState, VolumeSelector, HOME_SCREEN_IDENTIFIER,
};
