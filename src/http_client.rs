//! HTTP transport for the Mi TV control API.
//!
//! [`MiTvClient`] executes a single [`TvCommand`] against a single TV. It has no awareness of the
//! TV's power state and performs no retries; each failed call surfaces exactly one
//! [`ClientError`] and leaves recovery to the caller.

use std::time::Duration;

use log::debug;
use thiserror::Error;
use tokio::time::timeout;

use crate::api_payloads::{parse_reply, CommandReply};
use crate::helpers::command_url;
use crate::{DeviceAddress, TvCommand};

const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Errors returned when executing a [`TvCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ClientError {
    /// The TV did not reply within the request timeout.
    #[error("Request timed out")]
    Timeout,
    /// The request could not be delivered (unreachable host, connection refused or reset, etc).
    #[error("Network error: {0}")]
    Network(String),
    /// The TV replied with something other than a well-formed status reply.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The TV replied with a nonzero status.
    #[error(
        "TV returned status {status}{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Device {
        status: i64,
        message: Option<String>,
    },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

// ================================================================================================
// MiTvClient

/// HTTP client for one TV.
///
/// Cloning is cheap and clones share the underlying connection pool, so one client can be used
/// for concurrent requests.
#[derive(Debug, Clone)]
pub struct MiTvClient {
    address: DeviceAddress,
    http: reqwest::Client,
}

impl MiTvClient {
    /// Create a client for the TV at `address`.
    pub fn new(address: DeviceAddress) -> Result<Self, ClientError> {
        // TV control is LAN-only, so system proxy settings are ignored.
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| ClientError::Network(format!("Could not create HTTP client: {e}")))?;

        Ok(MiTvClient { address, http })
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Execute `command` against the TV.
    ///
    /// The request (including reading the reply body) is cancelled if it has not completed
    /// within 500ms. The reply body must be a JSON object with a zero `status`; only then is the
    /// reply handed to the command for consumption and returned. The HTTP status is not checked.
    pub async fn execute(&self, command: &TvCommand) -> Result<CommandReply, ClientError> {
        let url = command_url(&self.address, command).map_err(ClientError::Network)?;
        debug!("Sending {} to TV: {}", command, &url);

        let request = async {
            let response = self.http.get(url).send().await?;
            let http_status = response.status();
            let body = response.text().await?;

            Ok::<_, ClientError>((http_status, body))
        };

        let (http_status, body) = match timeout(REQUEST_TIMEOUT, request).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                debug!("{} request to {} failed: {}", command, &self.address, e);
                return Err(e);
            }
            Err(_) => {
                debug!("{} request to {} timed out", command, &self.address);
                return Err(ClientError::Timeout);
            }
        };

        // The TV's JSON status decides the outcome, whatever the HTTP status.
        debug!("TV replied to {} with {}: {:?}", command, http_status, body);

        let reply = parse_reply(&body)?;
        command.consume_result(&reply)?;

        Ok(reply)
    }
}

// ================================================================================================
// Tests
