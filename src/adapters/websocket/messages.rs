//! WebSocket message types sent from the bridge to keyboard clients.
//!
//! Client → server frames are the keyboard events in
//! [`crate::domain::events`]; this module holds the server side:
//! - `connection` - Sent once right after accept
//! - `error` - Sent in place of forwarding when a frame cannot be decoded

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Human-readable text of the connection acknowledgement.
pub const CONNECTED_TEXT: &str = "Connected to OSC bridge";

/// Human-readable text of the decode error frame.
pub const PROCESSING_ERROR_TEXT: &str = "Error processing message";

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established successfully.
    Connection(ConnectionMessage),

    /// A frame from this client could not be processed.
    Error(ErrorMessage),
}

impl ServerMessage {
    /// The acknowledgement sent immediately after accept.
    pub fn connected() -> Self {
        ServerMessage::Connection(ConnectionMessage {
            status: ConnectionStatus::Connected,
            message: CONNECTED_TEXT.to_string(),
            timestamp: Timestamp::now(),
        })
    }

    /// Error frame carrying the decode failure description.
    pub fn processing_error(error: impl ToString) -> Self {
        ServerMessage::Error(ErrorMessage {
            message: PROCESSING_ERROR_TEXT.to_string(),
            error: error.to_string(),
            timestamp: Timestamp::now(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
}

/// Sent when a client connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionMessage {
    pub status: ConnectionStatus,
    pub message: String,
    pub timestamp: Timestamp,
}

/// Error message sent to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    pub error: String,
    pub timestamp: Timestamp,
}
