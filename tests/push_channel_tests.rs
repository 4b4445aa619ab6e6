//! Push client tests over a real WebSocket against a local server.

mod support;

use std::sync::Arc;
use std::time::Duration;

use galaxie::adapter::galaxie::{push_url, TungsteniteConnector};
use galaxie::domain::RunId;
use galaxie::port::{DisconnectReason, PushConnector, PushHandle};
use galaxie::runtime::PushClient;
use galaxie::testkit;
use galaxie::testkit::push::{RecordingCallbacks, Reported};
use support::socket::{FakePushServer, Session, SessionEnd};
use tokio::sync::mpsc::UnboundedReceiver;

fn connector() -> Arc<dyn PushConnector> {
    Arc::new(TungsteniteConnector::new(Duration::from_secs(2)))
}

async fn next_report(rx: &mut UnboundedReceiver<Reported>) -> Reported {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a callback")
        .expect("callback channel closed")
}

async fn eventually<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn delivers_frames_then_stops_on_request() {
    let server = FakePushServer::start(vec![Session {
        frames: vec![
            r#"{"type": "lap_times", "data": [1, 2, 3]}"#.to_string(),
            testkit::domain::run_detail_frame("abc-123", 42),
            testkit::domain::vehicle_list_frame(&["Driver A", "Driver B"]),
        ],
        end: SessionEnd::AwaitClient,
    }])
    .await;

    let run_id = RunId::from("abc-123");
    let (callbacks, mut rx) = RecordingCallbacks::new();
    let client = PushClient::new(
        run_id.clone(),
        push_url(&server.base_url, &run_id),
        connector(),
        callbacks.clone(),
        testkit::config::reconnection(),
    );
    client.start();

    match next_report(&mut rx).await {
        Reported::RunDetail(id, event) => {
            assert_eq!(id, run_id);
            assert_eq!(event.lap_number(), Some(42));
        }
        other => panic!("expected run_detail, got {other:?}"),
    }
    match next_report(&mut rx).await {
        Reported::VehicleList(_, participants) => {
            assert_eq!(participants.len(), 2);
            assert_eq!(participants[1].display_name(), Some("Driver B"));
        }
        other => panic!("expected vehicle_list, got {other:?}"),
    }
    assert!(client.connected());
    assert_eq!(server.paths(), vec!["/ws/runs/abc-123/".to_string()]);

    client.stop().await;
    assert!(!client.connected());
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

#[tokio::test]
async fn reconnects_after_server_closes() {
    let server = FakePushServer::start(vec![
        Session {
            frames: vec![testkit::domain::run_detail_frame("r1", 1)],
            end: SessionEnd::Close,
        },
        Session {
            frames: vec![testkit::domain::run_detail_frame("r1", 2)],
            end: SessionEnd::AwaitClient,
        },
    ])
    .await;

    let run_id = RunId::from("r1");
    let (callbacks, mut rx) = RecordingCallbacks::new();
    let client = PushClient::new(
        run_id.clone(),
        push_url(&server.base_url, &run_id),
        connector(),
        callbacks.clone(),
        testkit::config::reconnection(),
    );
    client.start();

    let mut laps = Vec::new();
    for _ in 0..2 {
        if let Reported::RunDetail(_, event) = next_report(&mut rx).await {
            laps.extend(event.lap_number());
        }
    }
    assert_eq!(laps, vec![1, 2]);
    assert_eq!(server.paths().len(), 2);
    assert!(callbacks.disconnects().is_empty());

    client.stop().await;
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

#[tokio::test]
async fn reconnects_after_connection_drops() {
    let server = FakePushServer::start(vec![Session {
        frames: Vec::new(),
        end: SessionEnd::Drop,
    }])
    .await;

    let run_id = RunId::from("r1");
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = PushClient::new(
        run_id.clone(),
        push_url(&server.base_url, &run_id),
        connector(),
        callbacks.clone(),
        testkit::config::reconnection(),
    );
    client.start();

    eventually(|| server.paths().len() >= 2).await;
    eventually(|| client.connected()).await;

    client.stop().await;
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}

#[tokio::test]
async fn keeps_retrying_while_nothing_listens() {
    let run_id = RunId::from("r1");
    let (callbacks, _rx) = RecordingCallbacks::new();
    let client = PushClient::new(
        run_id.clone(),
        push_url("ws://127.0.0.1:1", &run_id),
        connector(),
        callbacks.clone(),
        testkit::config::reconnection(),
    );
    client.start();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!client.connected());
    assert!(client.is_running());

    client.stop().await;
    assert!(!client.is_running());
    assert_eq!(callbacks.disconnects(), vec![DisconnectReason::Requested]);
}
