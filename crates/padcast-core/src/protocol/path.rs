//! WebSocket handshake target for output clients.
//!
//! Output clients connect to `/ws/output` and pass the group to join (and an
//! optional display name) as query parameters:
//!
//! ```text
//! /ws/output?group_id=living%20room&name=Pad%201
//! ```

use std::fmt::Write;

/// Request path of the output endpoint on the group server.
pub const OUTPUT_ENDPOINT: &str = "/ws/output";

/// Builds the handshake path for `group_id` and an optional device name.
///
/// An empty device name is treated as absent.
pub fn output_path(group_id: &str, device_name: Option<&str>) -> String {
    let mut path = format!("{OUTPUT_ENDPOINT}?group_id={}", encode_query_component(group_id));
    if let Some(name) = device_name.filter(|name| !name.is_empty()) {
        path.push_str("&name=");
        path.push_str(&encode_query_component(name));
    }
    path
}

/// Percent-encodes a query parameter value.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) are kept; every other byte of
/// the UTF-8 encoding becomes `%XX`, so a space is `%20` rather than `+`.
pub fn encode_query_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => {
                // Writing to a String cannot fail.
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}

// ── Tests ─────────────────────────────────────────────────────────────────────
