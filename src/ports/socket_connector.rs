//! SocketConnector port - Opens client connections to the bridge.
//!
//! A connection is exposed as a pair of channels so the reconnecting
//! client can drive it from a single loop: commands go out on
//! `outbound`, lifecycle and inbound frames come back on `inbound`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::client::ClientError;

/// Command sent to an open link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    /// Transmit one text frame.
    Text(String),
    /// Close the connection.
    Close,
}

/// Event reported by an open link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A text frame arrived from the bridge.
    Text(String),
    /// The connection closed (either side).
    Closed,
    /// The connection failed; it will not deliver further events.
    Error(String),
}

/// An open connection to the bridge.
#[derive(Debug)]
pub struct ClientLink {
    pub outbound: mpsc::UnboundedSender<LinkCommand>,
    pub inbound: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Port for opening a connection to the bridge's socket endpoint.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// Open a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Connect` when the connection cannot be opened.
    async fn connect(&self, url: &str) -> Result<ClientLink, ClientError>;
}
