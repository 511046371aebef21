//! In-memory OSC sink for testing.
//!
//! Records every message it accepts so tests can assert on the exact
//! translated output of the router without opening sockets.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::domain::osc::ControlMessage;
use crate::ports::{OscSink, SinkError};

/// Recording sink.
///
/// # Example
///
/// ```ignore
/// let sink = Arc::new(InMemoryOscSink::new());
/// let router = BridgeRouter::new(sink.clone());
///
/// router.dispatch(&event).await;
/// assert_eq!(sink.message_count(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryOscSink {
    sent: Mutex<Vec<ControlMessage>>,
    fail: bool,
}

impl InMemoryOscSink {
    /// Creates an empty sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that refuses every message with `SinkError::Closed`.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    // === Test Helpers ===

    /// Returns all accepted messages in arrival order.
    pub fn messages(&self) -> Vec<ControlMessage> {
        self.lock().clone()
    }

    /// Returns accepted messages sent to `address`.
    pub fn messages_to(&self, address: &str) -> Vec<ControlMessage> {
        self.lock()
            .iter()
            .filter(|m| m.address == address)
            .cloned()
            .collect()
    }

    /// Returns count of accepted messages.
    pub fn message_count(&self) -> usize {
        self.lock().len()
    }

    /// Clears all recorded messages.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ControlMessage>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OscSink for InMemoryOscSink {
    async fn send(&self, message: ControlMessage) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Closed);
        }
        self.lock().push(message);
        Ok(())
    }
}
