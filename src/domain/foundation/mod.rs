//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and error types used by both the
//! bridge (server side) and the reconnecting keyboard client.

mod errors;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
