//! Integration tests for the reconnection supervisor's timing.
//!
//! The Tokio clock is paused, so the 3 s retry delay elapses instantly while
//! the ordering of timers stays exact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use padcast_output::application::emit_buttons::VirtualGamepad;
use padcast_output::application::reconnect::Supervisor;
use padcast_output::domain::{OutputConfig, ShutdownFlag, STOP_POLL_INTERVAL};
use padcast_output::infrastructure::gamepad::mock::MockGamepad;
use padcast_output::infrastructure::network::mock::{ScriptedConnector, StaticResolver};
use tokio::time::{sleep, Instant};

fn gamepad() -> VirtualGamepad {
    VirtualGamepad::new(Box::new(MockGamepad::new()))
}

fn unreachable_server(shutdown: &ShutdownFlag) -> (Supervisor<StaticResolver, ScriptedConnector>, Arc<AtomicUsize>) {
    let resolver = StaticResolver::new(["127.0.0.1:8000".parse().unwrap()]);
    let calls = resolver.calls();
    let supervisor = Supervisor::new(
        Arc::new(OutputConfig::new("g1")),
        resolver,
        ScriptedConnector::refusing_all(),
        shutdown.clone(),
    );
    (supervisor, calls)
}

#[tokio::test(start_paused = true)]
async fn test_failed_pass_is_retried_after_three_seconds() {
    // Arrange
    let shutdown = ShutdownFlag::new();
    let (supervisor, calls) = unreachable_server(&shutdown);
    let mut gamepad = gamepad();

    let checker = async {
        sleep(Duration::from_millis(2_900)).await;
        let before = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(200)).await;
        let after = calls.load(Ordering::SeqCst);
        shutdown.request();
        (before, after)
    };

    // Act
    let (summary, (before, after)) = tokio::join!(supervisor.run(&mut gamepad), checker);

    // Assert
    assert!(summary.is_none());
    assert_eq!(before, 1);
    assert_eq!(after, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_retry_delay_returns_within_one_poll_slice() {
    // Arrange
    let shutdown = ShutdownFlag::new();
    let (supervisor, calls) = unreachable_server(&shutdown);
    let mut gamepad = gamepad();

    let stopper = async {
        sleep(Duration::from_millis(1_000)).await;
        shutdown.request();
        Instant::now()
    };

    // Act
    let (_, requested_at) = tokio::join!(supervisor.run(&mut gamepad), stopper);
    let returned_at = Instant::now();

    // Assert
    assert!(returned_at - requested_at <= STOP_POLL_INTERVAL);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_delay_does_not_grow() {
    // Arrange: a shorter delay so several passes fit in the window.
    let shutdown = ShutdownFlag::new();
    let resolver = StaticResolver::new(["127.0.0.1:8000".parse().unwrap()]);
    let calls = resolver.calls();
    let mut config = OutputConfig::new("g1");
    config.retry_delay = Duration::from_secs(1);
    let supervisor = Supervisor::new(
        Arc::new(config),
        resolver,
        ScriptedConnector::refusing_all(),
        shutdown.clone(),
    );
    let mut gamepad = gamepad();

    let stopper = async {
        sleep(Duration::from_millis(4_500)).await;
        shutdown.request();
    };

    // Act
    tokio::join!(supervisor.run(&mut gamepad), stopper);

    // Assert: passes at t = 0, 1, 2, 3 and 4 seconds.
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}
