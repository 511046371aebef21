//! OSC sink adapters.
//!
//! - [`udp_writer`] - Production sink: one UDP socket owned by a writer task
//! - [`in_memory`] - Recording sink for tests

pub mod in_memory;
pub mod udp_writer;

pub use in_memory::InMemoryOscSink;
pub use udp_writer::{OscUdpHandle, UdpOscWriter, WriterStats};
