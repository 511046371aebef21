//! Live connection tracking for the keyboard socket.
//!
//! The tracker holds one entry per open connection, from accept until
//! close or error. No history is kept once a connection goes away.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

/// Unique identifier for a WebSocket client connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Create a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub client_id: ClientId,
    pub remote_address: SocketAddr,
    pub connected_at: Timestamp,
    /// False once teardown has started.
    pub is_alive: bool,
}

/// Registry of currently open connections.
///
/// Uses `RwLock` since reads (counts, lookups) outnumber accepts/closes.
#[derive(Default)]
pub struct ConnectionTracker {
    connections: RwLock<HashMap<ClientId, ConnectionState>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection.
    ///
    /// Returns the assigned id and the live count including this one.
    pub async fn register(&self, remote_address: SocketAddr) -> (ClientId, usize) {
        let client_id = ClientId::new();
        let mut connections = self.connections.write().await;
        connections.insert(
            client_id,
            ConnectionState {
                client_id,
                remote_address,
                connected_at: Timestamp::now(),
                is_alive: true,
            },
        );
        (client_id, connections.len())
    }

    /// Flag a connection as shutting down.
    pub async fn mark_closing(&self, client_id: &ClientId) {
        if let Some(state) = self.connections.write().await.get_mut(client_id) {
            state.is_alive = false;
        }
    }

    /// Remove a connection. Returns the remaining live count.
    ///
    /// Unknown ids are ignored, so a double close cannot drive the count
    /// below the number of open connections.
    pub async fn unregister(&self, client_id: &ClientId) -> usize {
        let mut connections = self.connections.write().await;
        connections.remove(client_id);
        connections.len()
    }

    /// Number of open connections.
    pub async fn live_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
