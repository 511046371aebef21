//! OSC control messages and their binary wire codec.
//!
//! A [`ControlMessage`] is an address path plus a positional list of typed
//! arguments. The receiving DAW patch binds arguments by position, so the
//! argument order produced by the router is part of the protocol.

mod codec;
mod message;

pub use codec::{decode, encode, CodecError};
pub use message::{ControlMessage, OscArg};
