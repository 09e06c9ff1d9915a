//! End-to-end tests against a loopback WebSocket server.
//!
//! Each test spawns a real `tokio-tungstenite` server on an ephemeral
//! port and drives a client (or feed adapter) through connect, drop,
//! reconnect, and shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;

use hydrolink::feeds::{TankDecoder, WateringCommand, WateringFeed};
use hydrolink::types::Reading;
use hydrolink::ws::{ConnectionState, FeedConfig, TelemetryCallback, TelemetryClient};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Connected,
    Reading(f64),
    Disconnected,
    Reconnecting(u32),
}

struct Recorder {
    tx: mpsc::UnboundedSender<Event>,
}

#[async_trait]
impl TelemetryCallback for Recorder {
    async fn on_reading(&self, reading: Reading) {
        let _ = self.tx.send(Event::Reading(reading.value.as_f64()));
    }

    async fn on_connected(&self) {
        let _ = self.tx.send(Event::Connected);
    }

    async fn on_disconnected(&self, _reason: Option<String>) {
        let _ = self.tx.send(Event::Disconnected);
    }

    async fn on_reconnecting(&self, attempt: u32, _delay: Duration) {
        let _ = self.tx.send(Event::Reconnecting(attempt));
    }
}

fn recorder() -> (Arc<Recorder>, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(Recorder { tx }), rx)
}

/// Fast backoff so reconnect tests finish quickly.
fn fast_config(url: &str, feed: &str) -> FeedConfig {
    FeedConfig::builder()
        .url(url)
        .feed(feed)
        .reconnect_delay(Duration::from_millis(50))
        .max_reconnect_delay(Duration::from_millis(200))
        .build()
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

fn tank_client(url: &str, callback: Arc<Recorder>) -> TelemetryClient {
    TelemetryClient::new(fast_config(url, "tank"), Arc::new(TankDecoder), callback)
        .expect("valid config")
}

#[tokio::test]
async fn readings_are_clamped_and_malformed_frames_ignored() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        for payload in [
            r#"{"amount": 150}"#,
            r#"{"amount": -5}"#,
            "not json at all",
            r#"{"other": 1}"#,
            r#"{"amount": 73.2}"#,
        ] {
            ws.send(Message::Text(payload.to_string())).await.unwrap();
        }
        // keep the socket open until the client goes away
        while ws.next().await.is_some() {}
    });

    let (callback, mut rx) = recorder();
    let client = tank_client(&url, callback);
    client.start();

    assert_eq!(next_event(&mut rx).await, Event::Connected);
    assert_eq!(next_event(&mut rx).await, Event::Reading(100.0));
    assert_eq!(next_event(&mut rx).await, Event::Reading(0.0));
    // malformed frames produce no reading and do not drop the connection
    assert_eq!(next_event(&mut rx).await, Event::Reading(73.2));

    let cached = client.last_reading().expect("reading cached");
    assert!((cached.value.as_f64() - 73.2).abs() < f64::EPSILON);
    assert!(client.is_connected());

    client.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_server_drop_and_keeps_stale_cache() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        // first connection: one reading, then drop
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"amount": 40}"#.to_string()))
            .await
            .unwrap();
        drop(ws);

        // second connection: another reading, then hold
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"amount": 60}"#.to_string()))
            .await
            .unwrap();
        while ws.next().await.is_some() {}
    });

    let (callback, mut rx) = recorder();
    let client = tank_client(&url, callback);
    client.start();

    assert_eq!(next_event(&mut rx).await, Event::Connected);
    assert_eq!(next_event(&mut rx).await, Event::Reading(40.0));
    assert_eq!(next_event(&mut rx).await, Event::Disconnected);

    // the stale cache survives the disconnect
    assert_eq!(client.last_reading().map(|r| r.value.as_f64()), Some(40.0));

    assert_eq!(next_event(&mut rx).await, Event::Reconnecting(1));
    assert_eq!(next_event(&mut rx).await, Event::Connected);
    assert_eq!(next_event(&mut rx).await, Event::Reading(60.0));
    assert_eq!(client.reconnect_attempts(), 0);

    client.shutdown().await;
}

#[tokio::test]
async fn backoff_counter_advances_per_timer_and_resets_on_open() {
    // reserve a port, then leave it closed for the first two attempts
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("ws://{addr}");

    let (callback, mut rx) = recorder();
    let client = tank_client(&url, callback);
    client.start();

    assert_eq!(next_event(&mut rx).await, Event::Reconnecting(1));
    assert_eq!(next_event(&mut rx).await, Event::Reconnecting(2));
    // the first timer has fired, the second is pending
    assert_eq!(client.reconnect_attempts(), 1);
    assert!(client.reconnect_pending());

    // bring the server up on the reserved port before the timer fires
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"amount": 73.2}"#.to_string()))
            .await
            .unwrap();
        while ws.next().await.is_some() {}
    });

    loop {
        match next_event(&mut rx).await {
            Event::Connected => break,
            // tolerate extra failed attempts if binding lost the race
            Event::Reconnecting(_) => {}
            other => panic!("unexpected event before connect: {other:?}"),
        }
    }
    assert_eq!(client.reconnect_attempts(), 0);
    assert!(!client.reconnect_pending());
    assert_eq!(next_event(&mut rx).await, Event::Reading(73.2));

    client.shutdown().await;
}

#[tokio::test]
async fn shutdown_is_idempotent_and_silences_callbacks() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let (srv_tx, mut srv_rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"amount": 50}"#.to_string()))
            .await
            .unwrap();
        // wait for the test to ask for a post-shutdown frame
        srv_rx.recv().await;
        let _ = ws
            .send(Message::Text(r#"{"amount": 99}"#.to_string()))
            .await;
        sleep(Duration::from_millis(100)).await;
    });

    let (callback, mut rx) = recorder();
    let client = tank_client(&url, callback);
    client.start();

    assert_eq!(next_event(&mut rx).await, Event::Connected);
    assert_eq!(next_event(&mut rx).await, Event::Reading(50.0));

    client.shutdown().await;
    client.shutdown().await;
    assert_eq!(client.state(), ConnectionState::Stopped);
    assert!(!client.reconnect_pending());

    // frames arriving after shutdown must not produce callbacks
    srv_tx.send(()).unwrap();
    sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err(), "no events after shutdown");

    // the cache keeps its final value
    assert_eq!(client.last_reading().map(|r| r.value.as_f64()), Some(50.0));

    // restart after shutdown stays parked
    client.start();
    assert_eq!(client.state(), ConnectionState::Stopped);
}

#[tokio::test]
async fn watering_commands_only_flow_while_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let (srv_tx, mut srv_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"moisture": 45.0, "watering": false}"#.to_string(),
        ))
        .await
        .unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let _ = srv_tx.send(text);
            }
        }
    });

    let (callback, mut rx) = recorder();
    let feed = WateringFeed::new(fast_config(&url, "watering"), callback).unwrap();

    // dropped silently while not connected
    assert_eq!(feed.send_command(WateringCommand::start(120.0)), Ok(false));

    feed.start();
    assert_eq!(next_event(&mut rx).await, Event::Connected);
    assert_eq!(next_event(&mut rx).await, Event::Reading(45.0));

    assert_eq!(feed.send_command(WateringCommand::start(120.0)), Ok(true));
    let received = timeout(Duration::from_secs(5), srv_rx.recv())
        .await
        .expect("timed out waiting for command")
        .expect("server channel closed");
    let value: serde_json::Value = serde_json::from_str(&received).unwrap();
    assert_eq!(value["command"], "START");
    assert_eq!(value["amount"], 120.0);

    assert_eq!(feed.send_command(WateringCommand::stop()), Ok(true));
    let snapshot = feed.snapshot();
    assert_eq!(snapshot.moisture, Some(45.0));
    assert!(!snapshot.watering);

    feed.shutdown().await;
    assert_eq!(feed.send_command(WateringCommand::stop()), Ok(false));
}
