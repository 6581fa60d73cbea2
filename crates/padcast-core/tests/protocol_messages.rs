//! Integration tests for the padcast-core public API.
//!
//! These tests drive a realistic server conversation through the crate root
//! re-exports: decoding the messages an output client receives, resolving the
//! button names they carry, and encoding the replies.

use padcast_core::{
    decode_server_message, output_path, select_endpoints, ClientMessage, IpPreference,
    KeybindPresets, ServerMessage, GAMEPAD_BUTTONS,
};
use serde_json::{json, Value};

/// Messages in the order a typical server sends them after the handshake.
const CONVERSATION: &[&str] = &[
    r#"{"type":"config","output_device_name":"Pad1","output_device_id":"d-7","group_id":"g1"}"#,
    r#"{"type":"key_event","code":"BTN_A","state":1}"#,
    r#"{"type":"ping","id":3}"#,
    r#"{"type":"key_event","code":"BTN_A","state":0}"#,
    r#"{"type":"members_changed","count":2}"#,
    r#"{"type":"key_event","code":"BTN_TURBO","state":1}"#,
];

#[test]
fn test_conversation_decodes_in_order() {
    // Act
    let kinds: Vec<String> = CONVERSATION
        .iter()
        .map(|text| decode_server_message(text).expect("fixture must decode").kind().to_string())
        .collect();

    // Assert
    assert_eq!(
        kinds,
        ["config", "key_event", "ping", "key_event", "members_changed", "key_event"]
    );
}

#[test]
fn test_key_events_resolve_against_button_table() {
    // Arrange
    let key_events: Vec<(String, i32)> = CONVERSATION
        .iter()
        .filter_map(|text| match decode_server_message(text).ok()? {
            ServerMessage::KeyEvent { code, state } => Some((code, state)),
            _ => None,
        })
        .collect();

    // Act
    let resolved: Vec<Option<u16>> = key_events
        .iter()
        .map(|(code, _)| GAMEPAD_BUTTONS.lookup(code))
        .collect();

    // Assert: the unknown button resolves to nothing and is dropped by callers.
    assert_eq!(resolved, [Some(0x130), Some(0x130), None]);
}

#[test]
fn test_ping_reply_echoes_the_same_id() {
    let ServerMessage::Ping { id } = decode_server_message(CONVERSATION[2]).unwrap() else {
        panic!("fixture 2 must be a ping");
    };

    let reply = ClientMessage::Pong { id }.to_json().unwrap();

    let value: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(value, json!({"type":"pong","id":3}));
}

#[test]
fn test_presets_message_preserves_every_binding() {
    // Arrange
    let presets: KeybindPresets = serde_json::from_value(json!({
        "arrows": {"ArrowUp": "BTN_DPAD_UP", "ArrowDown": "BTN_DPAD_DOWN"},
        "wasd": {"w": "BTN_DPAD_UP", "s": "BTN_DPAD_DOWN"}
    }))
    .unwrap();

    // Act
    let text = ClientMessage::SetKeybindPresets { keybind_presets: presets.clone() }
        .to_json()
        .unwrap();

    // Assert
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["type"], "set_keybind_presets");
    let echoed: KeybindPresets = serde_json::from_value(value["keybind_presets"].clone()).unwrap();
    assert_eq!(echoed, presets);
}

#[test]
fn test_handshake_path_and_endpoint_policy_together() {
    // Arrange
    let resolved = ["192.168.1.5:8000", "[fd00::5]:8000"]
        .iter()
        .map(|addr| addr.parse().unwrap());

    // Act
    let endpoints = select_endpoints(resolved, IpPreference::Auto).unwrap();
    let path = output_path("game night", Some("Living Room"));

    // Assert
    assert_eq!(endpoints[0].addr.to_string(), "[fd00::5]:8000");
    assert_eq!(endpoints[1].addr.to_string(), "192.168.1.5:8000");
    assert_eq!(path, "/ws/output?group_id=game%20night&name=Living%20Room");
}
