//! Application layer - Translation and dispatch.
//!
//! This layer maps keyboard events onto OSC control messages and hands
//! them to the `OscSink` port. It knows nothing about sockets.

pub mod bridge_router;

pub use bridge_router::{addresses, BridgeRouter, DispatchReport};
