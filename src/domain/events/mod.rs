//! Keyboard event schema.
//!
//! The fixed set of JSON events a browser keyboard sends to the bridge,
//! plus the per-field default table the router applies.
//!
//! Every field is optional on the wire and decoded leniently: a field of
//! the wrong JSON type reads as absent instead of failing the frame.

pub mod defaults;
mod event;
mod inbound;
pub(crate) mod lenient;

pub use defaults::{truthy_or, Falsy};
pub use event::{
    CustomArg, CustomMessage, FrequencyData, KeyboardEvent, NoteOff, NoteOn, NoteRecord,
    OctaveChange, PolyphonyUpdate, ScaleChange,
};
pub use inbound::{classify, Inbound, KNOWN_EVENT_TYPES};
