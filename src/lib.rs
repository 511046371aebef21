//! Microtonal Bridge - WebSocket to OSC bridge for microtonal keyboards
//!
//! Browser keyboards send JSON note and control events over a WebSocket;
//! the bridge translates them into OSC 1.0 messages and sends them over
//! UDP to a DAW or synthesizer. A reconnecting client library for the
//! keyboard side lives in [`client`].

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
