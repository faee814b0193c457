//! Mi TV control commands.
//!
//! Each [`TvCommand`] describes a single action against the TV's HTTP control API: the endpoint
//! path, the query parameters, and how to consume the reply payload. Commands never perform I/O;
//! see [`crate::MiTvClient`] for dispatching them.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::api_payloads::CommandReply;
use crate::http_client::ClientError;

const REQUEST_PATH: &str = "/request";
const CONTROLLER_PATH: &str = "/controller";

const SUCCESS_MESSAGE: &str = "success";

/// Mi TV control commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TvCommand {
    /// Check whether the TV is responding.
    Alive,
    /// Send a key press using a device key code (e.g. `"volumeup"`).
    KeyEvent(String),
    /// Switch the TV to the given input source (e.g. `"hdmi1"`).
    ChangeSource(String),
}

impl TvCommand {
    /// The endpoint path for the command.
    pub fn path(&self) -> &'static str {
        match self {
            TvCommand::Alive => REQUEST_PATH,
            TvCommand::KeyEvent(_) | TvCommand::ChangeSource(_) => CONTROLLER_PATH,
        }
    }

    /// The query parameters for the command. Values are unescaped; URL encoding is applied when
    /// the request URL is built.
    pub fn query_parameters(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();

        match self {
            TvCommand::Alive => {
                params.insert("action", "isalive".to_string());
            }
            TvCommand::KeyEvent(key_code) => {
                params.insert("action", "keyevent".to_string());
                params.insert("keycode", key_code.clone());
            }
            TvCommand::ChangeSource(source) => {
                params.insert("action", "changesource".to_string());
                params.insert("source", source.clone());
            }
        }

        params
    }

    /// Consume the reply to a successful (zero status) request.
    ///
    /// None of the current commands extract anything from the reply. The `msg` field is
    /// advisory: the TV does not reliably report `"success"`, so any other value is ignored.
    pub(crate) fn consume_result(&self, reply: &CommandReply) -> Result<(), ClientError> {
        match reply.message.as_deref() {
            Some(SUCCESS_MESSAGE) => {}
            other => debug!("{} reply message ignored: {:?}", self, other),
        }

        match self {
            TvCommand::Alive | TvCommand::KeyEvent(_) | TvCommand::ChangeSource(_) => Ok(()),
        }
    }
}

impl fmt::Display for TvCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TvCommand::KeyEvent(val) => write!(f, "KeyEvent({})", val),
            TvCommand::ChangeSource(val) => write!(f, "ChangeSource({})", val),
            variant => write!(f, "{:?}", variant),
        }
    }
}

// ================================================================================================
// Tests
