//! Reconnecting keyboard client.
//!
//! The browser-side half of the bridge, as a library: a supervisor task
//! keeps one WebSocket link open, reconnecting after a fixed delay up to a
//! capped number of attempts, while typed senders stamp every event with
//! the keyboard's TET system and a timestamp.
//!
//! ```text
//! KeyboardListeners ─notify─> KeyboardBridge ─send_*─> ReconnectingClient
//!                                                         │ LinkCommand
//!                                          SocketConnector ▼
//!                                                   WebSocket link
//! ```

mod connector;
mod error;
mod keyboard;
mod phase;
mod reconnecting;

pub use connector::WebSocketConnector;
pub use error::ClientError;
pub use keyboard::{detect_tet_system, KeyboardBridge, KeyboardListeners};
pub use phase::ConnectionPhase;
pub use reconnecting::{ClientEvent, ClientOptions, ClientStatus, ReconnectingClient};
