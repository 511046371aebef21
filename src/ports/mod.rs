//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bridge logic and the outside world. Adapters implement these ports.
//!
//! - `OscSink` - Where translated control messages go (UDP in production)
//! - `SocketConnector` - How the keyboard client opens a bridge connection
//! - `KeyboardObserver` - What the keyboard UI notifies on note/scale/octave changes

mod keyboard_observer;
mod osc_sink;
mod socket_connector;

pub use keyboard_observer::{KeyboardObserver, OctaveDirection};
pub use osc_sink::{OscSink, SinkError};
pub use socket_connector::{ClientLink, LinkCommand, LinkEvent, SocketConnector};
