//! Integration tests for the WebSocket → OSC bridge.
//!
//! These tests run the real axum WebSocket adapter on an ephemeral port and
//! drive it with a tokio-tungstenite client:
//! 1. Every connection is acknowledged with a `connection` frame
//! 2. Events are translated and dispatched in arrival order
//! 3. A malformed frame yields exactly one `error` frame and the socket stays open
//! 4. The full path reaches a UDP socket as decodable OSC packets

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use microtonal_bridge::adapters::osc::{InMemoryOscSink, UdpOscWriter};
use microtonal_bridge::adapters::websocket::{websocket_router, ConnectionTracker, WebSocketState};
use microtonal_bridge::application::{addresses, BridgeRouter};
use microtonal_bridge::domain::osc::{decode, OscArg};
use microtonal_bridge::ports::OscSink;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// Test Infrastructure
// =============================================================================

async fn spawn_bridge(sink: Arc<dyn OscSink>) -> (SocketAddr, Arc<ConnectionTracker>) {
    let tracker = Arc::new(ConnectionTracker::new());
    let state = WebSocketState::new(Arc::new(BridgeRouter::new(sink)), Arc::clone(&tracker));
    let app = websocket_router().with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (addr, tracker)
}

async fn open(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}/", addr)).await.unwrap();
    socket
}

async fn next_json(socket: &mut Socket) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("socket closed")
        .unwrap();
    match frame {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {:?}", other),
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket.send(Message::Text(value.to_string())).await.unwrap();
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn connection_is_acknowledged() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, tracker) = spawn_bridge(sink).await;

    let mut socket = open(addr).await;
    let ack = next_json(&mut socket).await;

    assert_eq!(ack["type"], "connection");
    assert_eq!(ack["status"], "connected");
    assert_eq!(ack["message"], "Connected to OSC bridge");
    assert!(ack["timestamp"].as_i64().unwrap() > 0);
    assert_eq!(tracker.live_count().await, 1);
}

#[tokio::test]
async fn note_on_is_forwarded_with_defaults() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, _) = spawn_bridge(sink.clone()).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    send_json(
        &mut socket,
        json!({
            "type": "note_on",
            "noteId": 5,
            "frequency": 293.66,
            "velocity": 0,
            "noteName": "D",
            "octave": 1,
            "tetSystem": "19-TET",
            "timestamp": 1
        }),
    )
    .await;

    eventually(|| sink.message_count() == 1).await;
    let message = &sink.messages()[0];
    assert_eq!(message.address, addresses::NOTE_ON);
    assert_eq!(
        message.args,
        vec![
            OscArg::Int(5),
            OscArg::Float(293.66),
            OscArg::Float(127.0),
            OscArg::Str("19-TET".into()),
            OscArg::Int(1),
            OscArg::Str("D".into()),
        ]
    );
}

#[tokio::test]
async fn malformed_frame_gets_one_error_and_socket_stays_open() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, tracker) = spawn_bridge(sink.clone()).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    socket.send(Message::Text("{not json".into())).await.unwrap();
    let error = next_json(&mut socket).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["message"], "Error processing message");
    assert!(!error["error"].as_str().unwrap().is_empty());
    assert_eq!(sink.message_count(), 0);

    send_json(&mut socket, json!({"type": "octave_change", "octaveShift": -1})).await;
    eventually(|| sink.message_count() == 1).await;

    // no second error frame
    let extra = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(extra.is_err(), "unexpected frame: {:?}", extra);
    assert_eq!(tracker.live_count().await, 1);
}

#[tokio::test]
async fn unknown_type_is_dropped_silently() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, _) = spawn_bridge(sink.clone()).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    send_json(&mut socket, json!({"type": "pitch_bend", "amount": 3})).await;
    send_json(&mut socket, json!({"type": "scale_change", "scaleName": "major"})).await;

    eventually(|| sink.message_count() == 1).await;
    assert_eq!(sink.messages()[0].address, addresses::SCALE);
    let extra = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(extra.is_err());
}

#[tokio::test]
async fn binary_frames_are_decoded_as_json() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, _) = spawn_bridge(sink.clone()).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    let payload = json!({"type": "octave_change", "octaveShift": 2}).to_string();
    socket.send(Message::Binary(payload.into_bytes())).await.unwrap();

    eventually(|| sink.message_count() == 1).await;
    assert_eq!(
        sink.messages()[0].args,
        vec![OscArg::Int(2), OscArg::Str("31-TET".into())]
    );
}

#[tokio::test]
async fn closing_unregisters_the_connection() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, tracker) = spawn_bridge(sink).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;
    assert_eq!(tracker.live_count().await, 1);

    socket.close(None).await.unwrap();

    for _ in 0..200 {
        if tracker.live_count().await == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection was never unregistered");
}

#[tokio::test]
async fn events_from_one_client_keep_their_order() {
    let sink = Arc::new(InMemoryOscSink::new());
    let (addr, _) = spawn_bridge(sink.clone()).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    for shift in 1..=20 {
        send_json(&mut socket, json!({"type": "octave_change", "octaveShift": shift})).await;
    }

    eventually(|| sink.message_count() == 20).await;
    let shifts: Vec<_> = sink.messages().iter().map(|m| m.args[0].clone()).collect();
    let expected: Vec<_> = (1..=20).map(OscArg::Int).collect();
    assert_eq!(shifts, expected);
}

#[tokio::test]
async fn polyphony_reaches_udp_as_osc_packets() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (handle, writer) = UdpOscWriter::bind(
        "127.0.0.1:0",
        &receiver.local_addr().unwrap().to_string(),
    )
    .await
    .unwrap();
    tokio::spawn(writer.run());

    let (addr, _) = spawn_bridge(Arc::new(handle)).await;
    let mut socket = open(addr).await;
    next_json(&mut socket).await;

    send_json(
        &mut socket,
        json!({
            "type": "polyphony_update",
            "activeNotesCount": 2,
            "activeFrequencies": [261.63, 329.63],
            "activeNoteIds": [1, 4],
            "tetSystem": "53-TET"
        }),
    )
    .await;

    let mut buf = [0u8; 1024];
    let mut received = Vec::new();
    for _ in 0..3 {
        let (len, _) = tokio::time::timeout(Duration::from_secs(5), receiver.recv_from(&mut buf))
            .await
            .expect("timed out waiting for datagram")
            .unwrap();
        received.push(decode(&buf[..len]).unwrap());
    }

    assert_eq!(received[0].address, addresses::POLYPHONY);
    assert_eq!(
        received[0].args,
        vec![OscArg::Int(2), OscArg::Str("53-TET".into())]
    );
    assert_eq!(received[1].address, addresses::POLYPHONY_NOTE);
    assert_eq!(
        received[1].args,
        vec![OscArg::Int(0), OscArg::Float(261.63), OscArg::Int(1)]
    );
    assert_eq!(
        received[2].args,
        vec![OscArg::Int(1), OscArg::Float(329.63), OscArg::Int(4)]
    );
}
