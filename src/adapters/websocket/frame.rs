//! Inbound frame processing, independent of the socket itself.

use thiserror::Error;

use crate::application::{BridgeRouter, DispatchReport};
use crate::domain::events::{classify, Inbound};

use super::messages::ServerMessage;

/// Errors decoding an inbound frame.
///
/// The Display text is what the client sees in the `error` field.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Frame has no event: payload is null")]
    Null,
}

/// Result of handling one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The frame was decoded and handed to the router.
    Routed(DispatchReport),
    /// The frame was not forwarded; send this reply to the client.
    Rejected(ServerMessage),
}

/// Decode a text payload as JSON and classify it.
pub fn decode_frame(text: &str) -> Result<Inbound, FrameError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_null() {
        return Err(FrameError::Null);
    }
    Ok(classify(value))
}

/// Decode a binary payload as UTF-8 JSON and classify it.
pub fn decode_binary_frame(bytes: &[u8]) -> Result<Inbound, FrameError> {
    decode_frame(std::str::from_utf8(bytes)?)
}

/// Route a decoded frame, or build the error reply for a bad one.
pub async fn process_frame(
    router: &BridgeRouter,
    decoded: Result<Inbound, FrameError>,
) -> FrameOutcome {
    match decoded {
        Ok(inbound) => FrameOutcome::Routed(router.route(inbound).await),
        Err(e) => FrameOutcome::Rejected(ServerMessage::processing_error(&e)),
    }
}
