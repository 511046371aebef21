//! Client error types.

use thiserror::Error;

/// Errors raised while connecting to or transmitting on a bridge link.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Not connected to the bridge")]
    NotConnected,

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Link writer has shut down")]
    LinkClosed,
}

impl ClientError {
    pub fn connect(url: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::Connect {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
