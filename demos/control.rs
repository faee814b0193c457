use env_logger;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use mitv_manager::ManagerMessage::{
    EmitAllState, PowerOff, PowerOn, SendRemoteKey, SetActiveIdentifier, SetVolume, ShutDown,
};
use mitv_manager::{DeviceAddress, MiTvManager, RemoteKey, VolumeSelector};

#[tokio::main]
async fn main() -> Result<(), ()> {
    // Initialize manager and associated send/receive channels
    let (to_manager, to_manager_rx) = mpsc::channel(32);

    // TODO: Set the IP address to a valid TV on the local network
    let (mut manager, mut from_manager) =
        MiTvManager::new(DeviceAddress::with_default_port("10.0.0.101"), to_manager_rx)
            .map_err(|e| eprintln!("Could not create manager: {}", e))?;

    // Print all logs to stdout
    env_logger::Builder::new()
        .filter(None, log::LevelFilter::Debug)
        .init();

    println!(concat!(
        ">>> Enter command:\n",
        ">>>    p (power on), o (power off), e (emit all state)\n",
        ">>>    w/a/s/d (arrows), x (select), b (back), h (home)\n",
        ">>>    u (volume up), v (volume down), 1/2/3 (hdmi), q (shut down)\n"
    ));

    // Task to print all messages received from the manager
    tokio::spawn(async move {
        while let Some(manager_output_msg) = from_manager.recv().await {
            println!(
                "<<< Received message from MiTvManager: {:?}",
                manager_output_msg
            );
        }
    });

    let to_manager_clone = to_manager.clone();

    // Task to accept commands from the console to send to the manager
    let stdin_handle = tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);

        loop {
            let mut buf = String::new();

            match reader.read_line(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }

            let message = match buf.trim() {
                "p" => PowerOn,
                "o" => PowerOff,
                "e" => EmitAllState,
                "w" => SendRemoteKey(RemoteKey::ArrowUp),
                "a" => SendRemoteKey(RemoteKey::ArrowLeft),
                "s" => SendRemoteKey(RemoteKey::ArrowDown),
                "d" => SendRemoteKey(RemoteKey::ArrowRight),
                "x" => SendRemoteKey(RemoteKey::Select),
                "b" => SendRemoteKey(RemoteKey::Back),
                "h" => SetActiveIdentifier(mitv_manager::HOME_SCREEN_IDENTIFIER),
                "u" => SetVolume(VolumeSelector::Increment),
                "v" => SetVolume(VolumeSelector::Decrement),
                "1" => SetActiveIdentifier(11),
                "2" => SetActiveIdentifier(12),
                "3" => SetActiveIdentifier(13),
                "q" => {
                    to_manager_clone.send(ShutDown).await.map_err(|_| ())?;
                    break;
                }
                _ => continue,
            };

            to_manager_clone.send(message).await.map_err(|_| ())?;
        }

        Ok(())
    });

    // Run the manager until instructed to shut down (ManagerMessage::ShutDown)
    manager.run().await;

    stdin_handle.await.map_err(|_| ())?
}
