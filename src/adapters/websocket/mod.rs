//! WebSocket adapter for browser keyboard connections.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  JSON frames   ┌──────────────────────┐
//! │ keyboard page│ ─────────────▶ │ handler (1 loop/conn)│
//! └──────────────┘ ◀───────────── │  ack / error frames  │
//!                                 └──────────┬───────────┘
//!                                            │ Inbound
//!                                            ▼
//!                                 ┌──────────────────────┐
//!                                 │     BridgeRouter     │ ─▶ OscSink
//!                                 └──────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - Server → client message types
//! - [`connections`] - Live connection tracking
//! - [`frame`] - Frame decoding and routing, socket-independent
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod connections;
pub mod frame;
pub mod handler;
pub mod messages;

pub use connections::{ClientId, ConnectionState, ConnectionTracker};
pub use frame::{decode_frame, process_frame, FrameError, FrameOutcome};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ConnectionMessage, ConnectionStatus, ErrorMessage, ServerMessage};
