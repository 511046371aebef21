//! Domain layer containing the bridge's protocol types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, validation errors)
//! - `events` - JSON keyboard event schema and the default table
//! - `osc` - Outbound control messages and the OSC wire codec

pub mod events;
pub mod foundation;
pub mod osc;
