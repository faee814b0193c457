//! Reply payloads for the Mi TV HTTP control API.
//!
//! Every endpoint replies with a JSON object of the shape:
//!
//! ```json
//! {"status": 0, "msg": "success", "data": {}}
//! ```
//!
//! `status` is zero on success. Some firmware names the field `code` instead. `msg` and `data`
//! are optional.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::http_client::ClientError;

// ------------------------------------------------------------------------------------------------
// Responses

// Top-level Response shape

#[derive(Debug, Deserialize)]
pub(crate) struct MiTvResponse {
    #[serde(alias = "code")]
    pub status: Option<i64>,
    pub msg: Option<String>,
    pub data: Option<Map<String, Value>>,
}

/// The payload of a successful reply from the TV.
///
/// `data` is empty when the TV did not send one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandReply {
    /// The reply's `msg` field, usually `"success"`.
    pub message: Option<String>,
    /// The reply's `data` object.
    pub data: Map<String, Value>,
}

/// Parse a raw reply body, validating the status field.
///
/// A body that is not a JSON object of the expected shape, or that has no status, is a protocol
/// error. A nonzero status is a device error.
pub(crate) fn parse_reply(body: &str) -> Result<CommandReply, ClientError> {
    let response: MiTvResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::Protocol(format!("Malformed reply body: {e}")))?;

    match response.status {
        None => Err(ClientError::Protocol("Reply has no status field".into())),
        Some(0) => Ok(CommandReply {
            message: response.msg,
            data: response.data.unwrap_or_default(),
        }),
        Some(status) => Err(ClientError::Device {
            status,
            message: response.msg,
        }),
    }
}

// ================================================================================================
// Tests
