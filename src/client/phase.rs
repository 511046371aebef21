//! Connection phase of the reconnecting client.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Where the client is in its connect cycle.
///
/// ```text
/// Disconnected ──> Connecting ──> Connected
///      ^               │              │
///      └───────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionPhase {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionPhase::Connected)
    }
}

impl StateMachine for ConnectionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionPhase::*;
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionPhase::*;
        match self {
            Disconnected => vec![Connecting],
            Connecting => vec![Connected, Disconnected],
            Connected => vec![Disconnected],
        }
    }
}
