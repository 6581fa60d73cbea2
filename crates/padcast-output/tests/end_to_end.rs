//! End-to-end test against a real WebSocket server on the loopback interface.
//!
//! Exercises the production resolver and connector: DNS-free resolution of
//! `127.0.0.1`, the TCP connect, the WebSocket upgrade request line, the
//! initial config and one button event reaching the (recording) gamepad.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use padcast_core::IpPreference;
use padcast_output::application::emit_buttons::VirtualGamepad;
use padcast_output::application::reconnect::Supervisor;
use padcast_output::domain::{OutputConfig, ShutdownFlag};
use padcast_output::infrastructure::gamepad::mock::{DeviceWrite, MockGamepad};
use padcast_output::infrastructure::network::{SystemResolver, WsConnector, CLIENT_USER_AGENT};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

const CONFIG: &str =
    r#"{"type":"config","output_device_name":"Pad1","output_device_id":"d1","group_id":"g1"}"#;
const PRESS_A: &str = r#"{"type":"key_event","code":"BTN_A","state":1}"#;

/// What the test server saw in the upgrade request.
#[derive(Debug, Default, Clone)]
struct SeenRequest {
    uri: String,
    user_agent: String,
}

/// Accepts one WebSocket client, sends the config and one key event, then
/// keeps reading until the client goes away.
async fn spawn_group_server() -> (u16, Arc<Mutex<SeenRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(SeenRequest::default()));
    let seen_by_server = Arc::clone(&seen);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let mut seen = seen_by_server.lock().unwrap();
            seen.uri = request.uri().to_string();
            seen.user_agent = request
                .headers()
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok(response)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();

        ws.send(Message::Text(CONFIG.into())).await.unwrap();
        ws.send(Message::Text(PRESS_A.into())).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    (port, seen)
}

#[tokio::test]
async fn test_output_client_joins_group_and_presses_button() {
    // Arrange
    let (port, seen) = spawn_group_server().await;

    let mut config = OutputConfig::new("g1");
    config.host = "127.0.0.1".into();
    config.port = port;
    config.ip_version = IpPreference::V4;
    let config = Arc::new(config);

    let device = MockGamepad::new();
    let journal = device.journal();
    let mut gamepad = VirtualGamepad::new(Box::new(device));

    let shutdown = ShutdownFlag::new();
    let connector = WsConnector::new(Arc::clone(&config)).unwrap();
    let supervisor = Supervisor::new(config, SystemResolver, connector, shutdown.clone());

    let watcher = async {
        while journal.len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown.request();
    };

    // Act
    let (summary, ()) = tokio::time::timeout(
        Duration::from_secs(10),
        async { tokio::join!(supervisor.run(&mut gamepad), watcher) },
    )
    .await
    .expect("client did not receive the button event in time");

    // Assert
    assert_eq!(
        journal.writes(),
        vec![DeviceWrite::Key { code: 0x130, value: 1 }, DeviceWrite::Sync]
    );
    let summary = summary.expect("a stopped session reports its summary");
    assert_eq!(summary.identity.output_device_name, "Pad1");
    assert_eq!(summary.emitted, 1);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.uri, "/ws/output?group_id=g1");
    assert_eq!(seen.user_agent, CLIENT_USER_AGENT);
}
