//! OscSink port - Destination for outbound control messages.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::osc::ControlMessage;

/// Errors a sink can report when accepting a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("OSC writer is no longer running")]
    Closed,

    #[error("OSC send failed: {0}")]
    Transport(String),
}

/// Port for delivering control messages to the synthesizer side.
///
/// Implementations must preserve call order: messages accepted from one
/// caller in sequence are transmitted in that sequence.
#[async_trait]
pub trait OscSink: Send + Sync {
    /// Accept one message for transmission.
    ///
    /// Success means the message was handed to the transport, not that it
    /// was delivered. UDP gives no delivery guarantee.
    async fn send(&self, message: ControlMessage) -> Result<(), SinkError>;
}
