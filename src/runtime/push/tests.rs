use super::*;
use std::time::Duration;

use crate::error::Result;
use crate::testkit;
use crate::testkit::domain::{run_detail_frame, vehicle_list_frame};
use crate::testkit::push::{RecordingCallbacks, Reported, ScriptedConnector, StreamEnd};

// -- Helpers --------------------------------------------------------------

const URL: &str = "ws://test/ws/runs/run-1/";

fn client(connector: &Arc<ScriptedConnector>, callbacks: &Arc<RecordingCallbacks>) -> PushClient {
    client_with(connector, callbacks, testkit::config::reconnection())
}

fn client_with(
    connector: &Arc<ScriptedConnector>,
    callbacks: &Arc<RecordingCallbacks>,
    reconnection: ReconnectionConfig,
) -> PushClient {
    PushClient::new(
        testkit::domain::run_id("run-1"),
        URL.to_string(),
        Arc::clone(connector) as Arc<dyn PushConnector>,
        Arc::clone(callbacks) as Arc<dyn PushCallbacks>,
        reconnection,
    )
}

/// Poll `check` until it holds, failing the test after two seconds.
async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

async fn next_report(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Reported>) -> Reported {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no callback in time")
        .expect("callback channel closed")
}

// -- Lifecycle ------------------------------------------------------------

#[tokio::test]
async fn test_new_client_is_idle() {
    let connector = Arc::new(ScriptedConnector::new());
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    assert!(!client.connected());
    assert!(!client.is_running());
    assert_eq!(client.run_id().as_str(), "run-1");
    assert_eq!(client.url(), URL);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let connector = Arc::new(ScriptedConnector::new().accept(vec![], StreamEnd::Hang));
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();
    client.start();
    eventually(|| client.connected()).await;
    client.start();

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.urls(), vec![URL.to_string()]);
    client.stop().await;
}

#[tokio::test]
async fn test_stop_without_start_reports_nothing() {
    let connector = Arc::new(ScriptedConnector::new());
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.stop().await;
    client.stop().await;

    assert!(callbacks.reported().is_empty());
    assert!(!client.connected());
}

#[tokio::test]
async fn test_stop_closes_connection_and_reports_requested_once() {
    let connector = Arc::new(ScriptedConnector::new().accept(vec![], StreamEnd::Hang));
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();
    eventually(|| client.connected()).await;

    client.stop().await;
    client.stop().await;

    assert!(!client.connected());
    assert!(!client.is_running());
    assert_eq!(connector.close_count(), 1);
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

#[tokio::test]
async fn test_restart_after_stop_runs_a_fresh_loop() {
    let connector = Arc::new(
        ScriptedConnector::new()
            .accept(vec![], StreamEnd::Hang)
            .accept(vec![], StreamEnd::Hang),
    );
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();
    eventually(|| client.connected()).await;
    client.stop().await;

    client.start();
    eventually(|| client.connected()).await;
    client.stop().await;

    assert_eq!(connector.connect_count(), 2);
    assert_eq!(
        callbacks.disconnects(),
        vec![DisconnectReason::Requested, DisconnectReason::Requested]
    );
}

#[tokio::test]
async fn test_stop_interrupts_backoff_sleep() {
    let connector = Arc::new(ScriptedConnector::new().refuse("down"));
    let (callbacks, _rx) = RecordingCallbacks::new();
    let reconnection = ReconnectionConfig {
        initial_delay_ms: 60_000,
        max_delay_ms: 60_000,
        ..testkit::config::reconnection()
    };
    let client = client_with(&connector, &callbacks, reconnection);

    client.start();
    eventually(|| connector.connect_count() == 1).await;

    tokio::time::timeout(Duration::from_millis(500), client.stop())
        .await
        .expect("stop should not wait out the backoff");

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

// -- Message dispatch -----------------------------------------------------

#[tokio::test]
async fn test_dispatches_snapshots_and_drops_everything_else() {
    let frames = vec![
        PushFrame::Text("not json".into()),
        PushFrame::Text(r#"{"type": "lap_times", "data": [1, 2, 3]}"#.into()),
        PushFrame::Text(r#"{"type": "run_detail", "data": null}"#.into()),
        PushFrame::Binary(vec![0, 1, 2]),
        PushFrame::Text(run_detail_frame("run-1", 42)),
        PushFrame::Text(r#"{"type": "vehicle_list", "data": {"oops": true}}"#.into()),
        PushFrame::Text(vehicle_list_frame(&["Driver A", "Driver B"])),
    ];
    let connector = Arc::new(ScriptedConnector::new().accept(frames, StreamEnd::Hang));
    let (callbacks, mut rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();

    match next_report(&mut rx).await {
        Reported::RunDetail(run_id, event) => {
            assert_eq!(run_id.as_str(), "run-1");
            assert_eq!(event.lap_number(), Some(42));
        }
        other => panic!("expected run detail, got {other:?}"),
    }
    match next_report(&mut rx).await {
        Reported::VehicleList(_, participants) => {
            assert_eq!(participants.len(), 2);
            assert_eq!(participants[1].display_name(), Some("Driver B"));
        }
        other => panic!("expected vehicle list, got {other:?}"),
    }

    client.stop().await;
    assert_eq!(
        next_report(&mut rx).await,
        Reported::Disconnect(testkit::domain::run_id("run-1"), DisconnectReason::Requested)
    );
    assert!(rx.try_recv().is_err());
}

// -- Reconnection ---------------------------------------------------------

#[tokio::test]
async fn test_retries_refused_connections_until_connected() {
    let connector = Arc::new(
        ScriptedConnector::new()
            .refuse("refused")
            .refuse("refused")
            .accept(vec![], StreamEnd::Hang),
    );
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();
    eventually(|| client.connected()).await;

    assert_eq!(connector.connect_count(), 3);
    assert!(callbacks.disconnects().is_empty());
    client.stop().await;
}

#[tokio::test]
async fn test_reconnects_after_stream_ends_or_errors() {
    let connector = Arc::new(
        ScriptedConnector::new()
            .accept_text(&[run_detail_frame("run-1", 1)], StreamEnd::Eof)
            .accept_text(&[run_detail_frame("run-1", 2)], StreamEnd::Error)
            .accept_text(&[run_detail_frame("run-1", 3)], StreamEnd::Hang),
    );
    let (callbacks, mut rx) = RecordingCallbacks::new();
    let client = client(&connector, &callbacks);

    client.start();

    for lap in 1..=3 {
        match next_report(&mut rx).await {
            Reported::RunDetail(_, event) => assert_eq!(event.lap_number(), Some(lap)),
            other => panic!("expected run detail, got {other:?}"),
        }
    }

    assert_eq!(connector.connect_count(), 3);
    assert!(callbacks.disconnects().is_empty());
    client.stop().await;
}

#[tokio::test]
async fn test_connected_drops_when_connection_is_lost() {
    let connector = Arc::new(
        ScriptedConnector::new()
            .accept(vec![], StreamEnd::Eof)
            .refuse("gone"),
    );
    let (callbacks, _rx) = RecordingCallbacks::new();
    let reconnection = ReconnectionConfig {
        initial_delay_ms: 60_000,
        max_delay_ms: 60_000,
        ..testkit::config::reconnection()
    };
    let client = client_with(&connector, &callbacks, reconnection);

    client.start();
    eventually(|| connector.connect_count() == 1 && !client.connected()).await;

    assert!(client.is_running());
    client.stop().await;
}

// -- Failure reporting ----------------------------------------------------

#[tokio::test]
async fn test_panicking_callback_reports_lost() {
    let connector = Arc::new(
        ScriptedConnector::new().accept_text(&[run_detail_frame("run-1", 7)], StreamEnd::Hang),
    );
    let (callbacks, mut rx) = RecordingCallbacks::panicking();
    let client = client(&connector, &callbacks);

    client.start();

    assert_eq!(
        next_report(&mut rx).await,
        Reported::Disconnect(testkit::domain::run_id("run-1"), DisconnectReason::Lost)
    );
    eventually(|| !client.is_running()).await;
    assert!(!client.connected());

    client.stop().await;
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Lost]);
}

/// Connector whose streams never finish closing.
struct StuckOnClose;

struct StuckStream;

#[async_trait]
impl PushStream for StuckStream {
    async fn next_frame(&mut self) -> Option<Result<PushFrame>> {
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<()> {
        std::future::pending().await
    }
}

#[async_trait]
impl PushConnector for StuckOnClose {
    async fn connect(&self, _url: &str) -> Result<Box<dyn PushStream>> {
        Ok(Box::new(StuckStream))
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_aborts_a_loop_that_will_not_exit() {
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = PushClient::new(
        testkit::domain::run_id("run-1"),
        URL.to_string(),
        Arc::new(StuckOnClose),
        Arc::clone(&callbacks) as Arc<dyn PushCallbacks>,
        testkit::config::reconnection(),
    );

    client.start();
    eventually(|| client.connected()).await;

    client.stop().await;

    assert!(!client.connected());
    assert!(!client.is_running());
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

// -- Factory --------------------------------------------------------------

#[tokio::test]
async fn test_factory_builds_idle_clients_for_the_given_run() {
    let connector = Arc::new(ScriptedConnector::new());
    let (callbacks, _rx) = RecordingCallbacks::new();
    let factory = PushClientFactory::new(connector, testkit::config::reconnection());

    let handle = factory.create(
        testkit::domain::run_id("run-9"),
        "ws://test/ws/runs/run-9/".into(),
        callbacks,
    );

    assert_eq!(handle.run_id().as_str(), "run-9");
    assert!(!handle.connected());
}
