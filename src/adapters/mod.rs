//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bridge to external systems:
//! - `websocket` - Keyboard connections (axum WebSocket upgrade)
//! - `osc` - Outbound control messages (UDP writer task, in-memory for tests)
//! - `http` - Static keyboard pages and directory listings

pub mod http;
pub mod osc;
pub mod websocket;
