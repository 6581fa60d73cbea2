//! JSON messages exchanged between an output client and the group server.
//!
//! Every WebSocket text frame carries exactly one JSON object with a `"type"`
//! field that identifies the message.  For example:
//!
//! ```json
//! {"type":"key_event","code":"BTN_A","state":1}
//! ```
//!
//! # Server → client
//!
//! | `type`          | Fields                                              |
//! |-----------------|-----------------------------------------------------|
//! | `config`        | `output_device_name`, `output_device_id`, `group_id`|
//! | `key_event`     | `code` (string), `state` (integer)                  |
//! | `rename_output` | `name` (string)                                     |
//! | `ping`          | `id` (any JSON value)                               |
//! | anything else   | ignored by the client                               |
//!
//! # Client → server
//!
//! | `type`                | Fields                                        |
//! |-----------------------|-----------------------------------------------|
//! | `set_keybind_presets` | `keybind_presets` (preset → key → binding)    |
//! | `pong`                | `id` echoed from the matching `ping`          |
//!
//! # Why is decoding done by hand instead of `#[serde(tag = "type")]`?
//!
//! The server may add new message types at any time and the client must keep
//! working when it does.  A tagged serde enum would turn an unknown `type`
//! into a hard error and lose the type name.  [`decode_server_message`] first
//! reads the `type` string, then deserializes only the variants it knows and
//! maps everything else to [`ServerMessage::Other`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Keybind presets: preset name → (logical key → binding string).
///
/// `BTreeMap` keeps the serialized order stable, which makes the outbound
/// message deterministic.
pub type KeybindPresets = BTreeMap<String, BTreeMap<String, String>>;

/// Errors produced while decoding or encoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text is not valid JSON, or a known message is missing a field.
    #[error("invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON value is not an object.
    #[error("message is not a JSON object")]
    NotAnObject,
    /// The object has no `"type"` field, or it is not a string.
    #[error("message has no string \"type\" field")]
    MissingType,
}

/// The identity the server assigns to this output client in its `config` message.
///
/// The client never invents these values; they are only recorded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputIdentity {
    pub output_device_name: String,
    pub output_device_id: String,
    pub group_id: String,
}

/// A decoded server → client message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Initial handshake payload; must be the first message of a session.
    Config(OutputIdentity),
    /// A button changed state.
    KeyEvent { code: String, state: i32 },
    /// The output device was renamed by a group member.
    RenameOutput { name: String },
    /// Latency check; answered with [`ClientMessage::Pong`].
    Ping { id: Value },
    /// A message type this client does not know about.
    Other { kind: String },
}

impl ServerMessage {
    /// The wire `type` string of this message.
    pub fn kind(&self) -> &str {
        match self {
            Self::Config(_) => "config",
            Self::KeyEvent { .. } => "key_event",
            Self::RenameOutput { .. } => "rename_output",
            Self::Ping { .. } => "ping",
            Self::Other { kind } => kind,
        }
    }
}

#[derive(Deserialize)]
struct KeyEventPayload {
    code: String,
    state: i32,
}

#[derive(Deserialize)]
struct RenameOutputPayload {
    name: String,
}

/// Decodes one text frame from the server.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the text is not a JSON object with a string
/// `type`, or if a known message type lacks a required field or has a field of
/// the wrong JSON type.  Unknown types are *not* errors.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let Value::Object(mut object) = serde_json::from_str::<Value>(text)? else {
        return Err(ProtocolError::NotAnObject);
    };

    let kind = match object.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(ProtocolError::MissingType),
    };

    let message = match kind.as_str() {
        "config" => ServerMessage::Config(serde_json::from_value(Value::Object(object))?),
        "key_event" => {
            let payload: KeyEventPayload = serde_json::from_value(Value::Object(object))?;
            ServerMessage::KeyEvent {
                code: payload.code,
                state: payload.state,
            }
        }
        "rename_output" => {
            let payload: RenameOutputPayload = serde_json::from_value(Value::Object(object))?;
            ServerMessage::RenameOutput { name: payload.name }
        }
        "ping" => ServerMessage::Ping {
            id: object.remove("id").unwrap_or(Value::Null),
        },
        _ => ServerMessage::Other { kind },
    };
    Ok(message)
}

/// A client → server message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Publishes the locally configured keybind presets to the group.
    SetKeybindPresets { keybind_presets: KeybindPresets },
    /// Answer to a server `ping`.
    Pong { id: Value },
}

impl ClientMessage {
    /// Serializes the message to the JSON text sent in a WebSocket frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Decoding known messages ───────────────────────────────────────────────

    #[test]
    fn test_decode_config_message() {
        // Arrange
        let text = r#"{"type":"config","output_device_name":"Pad1","output_device_id":"d1","group_id":"g1"}"#;

        // Act
        let msg = decode_server_message(text).unwrap();

        // Assert
        assert_eq!(
            msg,
            ServerMessage::Config(OutputIdentity {
                output_device_name: "Pad1".into(),
                output_device_id: "d1".into(),
                group_id: "g1".into(),
            })
        );
    }

    #[test]
    fn test_decode_config_missing_field_is_error() {
        let text = r#"{"type":"config","output_device_name":"Pad1","group_id":"g1"}"#;
        assert!(matches!(decode_server_message(text), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_decode_key_event() {
        let msg = decode_server_message(r#"{"type":"key_event","code":"BTN_B","state":0}"#).unwrap();
        assert_eq!(msg, ServerMessage::KeyEvent { code: "BTN_B".into(), state: 0 });
    }

    #[test]
    fn test_decode_key_event_with_string_state_is_error() {
        let result = decode_server_message(r#"{"type":"key_event","code":"BTN_B","state":"1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_key_event_ignores_extra_fields() {
        let text = r#"{"type":"key_event","code":"BTN_X","state":1,"device_id":"d1"}"#;
        let msg = decode_server_message(text).unwrap();
        assert_eq!(msg.kind(), "key_event");
    }

    #[test]
    fn test_decode_rename_output() {
        let msg = decode_server_message(r#"{"type":"rename_output","name":"Couch"}"#).unwrap();
        assert_eq!(msg, ServerMessage::RenameOutput { name: "Couch".into() });
    }

    #[test]
    fn test_decode_ping_keeps_id_and_defaults_to_null() {
        let with_id = decode_server_message(r#"{"type":"ping","id":"abc"}"#).unwrap();
        let without_id = decode_server_message(r#"{"type":"ping"}"#).unwrap();

        assert_eq!(with_id, ServerMessage::Ping { id: json!("abc") });
        assert_eq!(without_id, ServerMessage::Ping { id: Value::Null });
    }

    // ── Forward compatibility and malformed input ─────────────────────────────

    #[test]
    fn test_decode_unknown_type_is_other_not_error() {
        let msg = decode_server_message(r#"{"type":"vibrate","ms":200}"#).unwrap();
        assert_eq!(msg, ServerMessage::Other { kind: "vibrate".into() });
        assert_eq!(msg.kind(), "vibrate");
    }

    #[test]
    fn test_decode_invalid_json_is_error() {
        assert!(matches!(decode_server_message("{not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_decode_non_object_is_error() {
        assert!(matches!(decode_server_message("[1,2]"), Err(ProtocolError::NotAnObject)));
    }

    #[test]
    fn test_decode_missing_or_non_string_type_is_error() {
        assert!(matches!(decode_server_message(r#"{"code":"BTN_A"}"#), Err(ProtocolError::MissingType)));
        assert!(matches!(decode_server_message(r#"{"type":7}"#), Err(ProtocolError::MissingType)));
    }

    // ── Encoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_encode_set_keybind_presets() {
        // Arrange
        let mut presets = KeybindPresets::new();
        presets.insert(
            "default".into(),
            BTreeMap::from([("Space".to_string(), "BTN_A".to_string())]),
        );
        let msg = ClientMessage::SetKeybindPresets { keybind_presets: presets };

        // Act
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        // Assert
        assert_eq!(
            value,
            json!({"type":"set_keybind_presets","keybind_presets":{"default":{"Space":"BTN_A"}}})
        );
    }

    #[test]
    fn test_encode_pong_echoes_id() {
        let msg = ClientMessage::Pong { id: json!(42) };
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"type":"pong","id":42}));
    }
}
