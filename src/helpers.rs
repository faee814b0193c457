//! Helper functions.

use std::net::Ipv6Addr;

use url::Url;

use crate::{DeviceAddress, TvCommand};

/// Generate the request URL for sending `command` to the TV at `address`.
///
/// Query values are URL encoded but otherwise used verbatim. Bare IPv6 hosts are bracketed.
///
/// Examples:
///
/// 10.0.0.101:6095, Alive -> http://10.0.0.101:6095/request?action=isalive
/// fd12::1:6095, KeyEvent(up) -> http://[fd12::1]:6095/controller?action=keyevent&keycode=up
pub(crate) fn command_url(address: &DeviceAddress, command: &TvCommand) -> Result<Url, String> {
    let host = address.host();

    if host.is_empty() {
        return Err(String::from("No host specified"));
    }

    let host = match host.parse::<Ipv6Addr>() {
        Ok(ipv6) => format!("[{ipv6}]"),
        Err(_) => host.to_string(),
    };

    let mut url = Url::parse(&format!("http://{host}"))
        .map_err(|e| format!("Could not parse host '{}': {:?}", address.host(), e))?;

    url.set_port(Some(address.port()))
        .map_err(|_| format!("Could not set URL to port {}", address.port()))?;
    url.set_path(command.path());
    url.query_pairs_mut()
        .extend_pairs(command.query_parameters().iter());

    Ok(url)
}

// ================================================================================================
// Tests
