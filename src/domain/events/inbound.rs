//! Classification of decoded socket frames.

use serde_json::Value;

use super::event::KeyboardEvent;

/// Event `type` values the bridge knows how to route.
pub const KNOWN_EVENT_TYPES: &[&str] = &[
    "note_on",
    "note_off",
    "frequency_data",
    "polyphony_update",
    "scale_change",
    "octave_change",
    "custom",
];

/// A decoded JSON frame, sorted into routable or not.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A known event ready for the router.
    Event(KeyboardEvent),
    /// Valid JSON whose `type` is missing or not in the vocabulary.
    Unknown { event_type: Option<String> },
}

/// Sorts a decoded JSON value into a known event or an unknown frame.
///
/// Non-object values and objects without a string `type` are unknown.
pub fn classify(value: Value) -> Inbound {
    let event_type = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);

    match event_type {
        Some(t) if KNOWN_EVENT_TYPES.contains(&t.as_str()) => {
            match serde_json::from_value::<KeyboardEvent>(value) {
                Ok(event) => Inbound::Event(event),
                Err(_) => Inbound::Unknown { event_type: Some(t) },
            }
        }
        other => Inbound::Unknown { event_type: other },
    }
}
