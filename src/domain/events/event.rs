//! Inbound keyboard events.
//!
//! Field names follow the browser's camelCase JSON. Producers (the
//! reconnecting client) always fill `tet_system` and `timestamp`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// All events a keyboard client can send to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyboardEvent {
    NoteOn(NoteOn),
    NoteOff(NoteOff),
    FrequencyData(FrequencyData),
    PolyphonyUpdate(PolyphonyUpdate),
    ScaleChange(ScaleChange),
    OctaveChange(OctaveChange),
    Custom(CustomMessage),
}

impl KeyboardEvent {
    /// The wire `type` value of this event.
    pub fn type_name(&self) -> &'static str {
        match self {
            KeyboardEvent::NoteOn(_) => "note_on",
            KeyboardEvent::NoteOff(_) => "note_off",
            KeyboardEvent::FrequencyData(_) => "frequency_data",
            KeyboardEvent::PolyphonyUpdate(_) => "polyphony_update",
            KeyboardEvent::ScaleChange(_) => "scale_change",
            KeyboardEvent::OctaveChange(_) => "octave_change",
            KeyboardEvent::Custom(_) => "custom",
        }
    }

    /// The TET system stamped on the event, if any.
    pub fn tet_system(&self) -> Option<&str> {
        let tet = match self {
            KeyboardEvent::NoteOn(e) => &e.tet_system,
            KeyboardEvent::NoteOff(e) => &e.tet_system,
            KeyboardEvent::FrequencyData(e) => &e.tet_system,
            KeyboardEvent::PolyphonyUpdate(e) => &e.tet_system,
            KeyboardEvent::ScaleChange(e) => &e.tet_system,
            KeyboardEvent::OctaveChange(e) => &e.tet_system,
            KeyboardEvent::Custom(e) => &e.tet_system,
        };
        tet.as_deref()
    }
}

/// A key was pressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOn {
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub note_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub velocity: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub note_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub octave: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// A key was released. Any `velocity` sent is ignored downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOff {
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub note_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub velocity: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub note_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Pitch information for a single position of the TET system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyData {
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub note_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub tet_position: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub octave: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Snapshot of every note currently sounding on one keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyphonyUpdate {
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub active_notes_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number_list")]
    pub active_frequencies: Vec<f64>,
    #[serde(default, deserialize_with = "lenient::int_list")]
    pub active_note_ids: Vec<i64>,
    #[serde(default, deserialize_with = "lenient::struct_list")]
    pub active_notes: Vec<NoteRecord>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// The keyboard switched to a different scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleChange {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub scale_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::value_list")]
    pub scale_notes: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub scale_length: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// The keyboard transposed by whole octaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OctaveChange {
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub octave_shift: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Free-form message addressed by the sender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMessage {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub osc_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::struct_list")]
    pub args: Vec<CustomArg>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub tet_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// One argument of a custom message, e.g. `{"type": "i", "value": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomArg {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub arg_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::any", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl CustomArg {
    pub fn new(arg_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            arg_type: Some(arg_type.into()),
            value: Some(value.into()),
        }
    }
}

/// A note that is currently sounding on a keyboard.
///
/// Identity is `id`; unique among one client's active notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub note_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub velocity: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}
