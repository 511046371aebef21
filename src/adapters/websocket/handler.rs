//! WebSocket upgrade handler for keyboard connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Register the connection and send the `connection` acknowledgement
//! 2. Read frames one at a time, routing each before reading the next
//! 3. Reply with an `error` frame for anything that fails to decode
//! 4. Unregister on close or transport error
//!
//! Each connection has exactly one consumer loop, so a client's frames
//! reach the OSC sink in the order they arrived.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};

use crate::application::BridgeRouter;

use super::{
    connections::{ClientId, ConnectionTracker},
    frame::{decode_binary_frame, decode_frame, process_frame, FrameOutcome},
    messages::ServerMessage,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub router: Arc<BridgeRouter>,
    pub tracker: Arc<ConnectionTracker>,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(router: Arc<BridgeRouter>, tracker: Arc<ConnectionTracker>) -> Self {
        Self { router, tracker }
    }
}

/// Typed view of what the socket delivered.
#[derive(Debug)]
enum SocketEvent {
    Text(String),
    Binary(Vec<u8>),
    /// Protocol-level ping/pong; answered by axum.
    Control,
    Closed,
    Failed(axum::Error),
}

impl From<Option<Result<Message, axum::Error>>> for SocketEvent {
    fn from(received: Option<Result<Message, axum::Error>>) -> Self {
        match received {
            Some(Ok(Message::Text(text))) => SocketEvent::Text(text),
            Some(Ok(Message::Binary(bytes))) => SocketEvent::Binary(bytes),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => SocketEvent::Control,
            Some(Ok(Message::Close(_))) | None => SocketEvent::Closed,
            Some(Err(e)) => SocketEvent::Failed(e),
        }
    }
}

/// Handle WebSocket upgrade requests from keyboard pages.
///
/// Route: `GET /`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    State(state): State<WebSocketState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, remote, state))
}

/// Handle an established WebSocket connection until it closes.
async fn handle_socket(mut socket: WebSocket, remote: SocketAddr, state: WebSocketState) {
    let (client_id, live) = state.tracker.register(remote).await;
    tracing::info!(
        client_id = %client_id,
        remote_addr = %remote,
        live_connections = live,
        "Client connected"
    );

    send_message(&mut socket, &client_id, &ServerMessage::connected()).await;

    loop {
        let outcome = match SocketEvent::from(socket.recv().await) {
            SocketEvent::Text(text) => process_frame(&state.router, decode_frame(&text)).await,
            SocketEvent::Binary(bytes) => {
                process_frame(&state.router, decode_binary_frame(&bytes)).await
            }
            SocketEvent::Control => continue,
            SocketEvent::Closed => {
                tracing::debug!(client_id = %client_id, "Client closed connection");
                break;
            }
            SocketEvent::Failed(e) => {
                tracing::warn!(client_id = %client_id, "WebSocket error: {}", e);
                break;
            }
        };

        if let FrameOutcome::Rejected(reply) = outcome {
            if let ServerMessage::Error(err) = &reply {
                tracing::warn!(
                    client_id = %client_id,
                    remote_addr = %remote,
                    "Error processing message: {}",
                    err.error
                );
            }
            send_message(&mut socket, &client_id, &reply).await;
        }
    }

    state.tracker.mark_closing(&client_id).await;
    let live = state.tracker.unregister(&client_id).await;
    tracing::info!(client_id = %client_id, live_connections = live, "Client disconnected");
}

/// Send a JSON message over the WebSocket. Failures are logged only.
async fn send_message(socket: &mut WebSocket, client_id: &ClientId, msg: &ServerMessage) {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(client_id = %client_id, "Failed to serialize server message: {}", e);
            return;
        }
    };

    if let Err(e) = socket.send(Message::Text(json)).await {
        tracing::debug!(client_id = %client_id, "Failed to send message: {}", e);
    }
}

/// Create axum router for the keyboard WebSocket endpoint.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router().with_state(ws_state);
/// axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::osc::InMemoryOscSink;

    #[test]
    fn websocket_state_shares_tracker() {
        let tracker = Arc::new(ConnectionTracker::new());
        let router = Arc::new(BridgeRouter::new(Arc::new(InMemoryOscSink::new())));
        let state = WebSocketState::new(router, tracker.clone());

        assert!(Arc::ptr_eq(&state.tracker, &tracker));
    }

    #[test]
    fn socket_events_map_from_messages() {
        assert!(matches!(
            SocketEvent::from(Some(Ok(Message::Text("x".into())))),
            SocketEvent::Text(t) if t == "x"
        ));
        assert!(matches!(
            SocketEvent::from(Some(Ok(Message::Ping(vec![])))),
            SocketEvent::Control
        ));
        assert!(matches!(SocketEvent::from(None), SocketEvent::Closed));
        assert!(matches!(
            SocketEvent::from(Some(Ok(Message::Close(None)))),
            SocketEvent::Closed
        ));
    }

    #[test]
    fn websocket_router_creates_route() {
        let _router = websocket_router();
    }
}
