//! BridgeRouter - Translates keyboard events into OSC control messages.
//!
//! Each event maps to a fixed address and a fixed positional argument
//! list. Missing or falsy fields are replaced from the default table in
//! [`crate::domain::events::defaults`]. The resulting messages are sent
//! in order through the [`OscSink`] port.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::events::defaults::*;
use crate::domain::events::lenient::{as_int, as_number};
use crate::domain::events::{
    truthy_or, CustomArg, CustomMessage, FrequencyData, Inbound, KeyboardEvent, NoteOff, NoteOn,
    OctaveChange, PolyphonyUpdate, ScaleChange,
};
use crate::domain::osc::{ControlMessage, OscArg};
use crate::ports::OscSink;

/// OSC address paths the DAW patch listens on.
pub mod addresses {
    pub const NOTE_ON: &str = "/microtonal/note_on";
    pub const NOTE_OFF: &str = "/microtonal/note_off";
    pub const FREQ_DATA: &str = "/microtonal/freq_data";
    pub const POLYPHONY: &str = "/microtonal/polyphony";
    pub const POLYPHONY_NOTE: &str = "/microtonal/polyphony/note";
    pub const SCALE: &str = "/microtonal/scale";
    pub const OCTAVE: &str = "/microtonal/octave";
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages accepted by the sink.
    pub sent: usize,
    /// Messages the sink refused; these are logged and lost.
    pub dropped: usize,
}

/// Routes keyboard events to the OSC sink.
pub struct BridgeRouter {
    sink: Arc<dyn OscSink>,
    verbose: bool,
}

impl BridgeRouter {
    pub fn new(sink: Arc<dyn OscSink>) -> Self {
        Self {
            sink,
            verbose: false,
        }
    }

    /// Log a full dump of every inbound event at debug level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Route a classified frame. Unknown frames are logged and dropped.
    pub async fn route(&self, inbound: Inbound) -> DispatchReport {
        match inbound {
            Inbound::Event(event) => self.dispatch(&event).await,
            Inbound::Unknown { event_type } => {
                tracing::warn!(
                    event_type = event_type.as_deref().unwrap_or("<missing>"),
                    "Unknown event type, dropping"
                );
                DispatchReport::default()
            }
        }
    }

    /// Translate one event and send every resulting message in order.
    ///
    /// Sink failures never abort the event: the failed message is counted
    /// as dropped and the remaining messages are still attempted.
    pub async fn dispatch(&self, event: &KeyboardEvent) -> DispatchReport {
        if self.verbose {
            tracing::debug!(event = ?event, "Inbound event");
        }
        log_summary(event);

        let mut report = DispatchReport::default();
        for message in Self::translate(event) {
            let address = message.address.clone();
            match self.sink.send(message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::error!(address = %address, "Failed to send OSC message: {}", e);
                    report.dropped += 1;
                }
            }
        }
        report
    }

    /// Pure translation of one event into its control messages.
    pub fn translate(event: &KeyboardEvent) -> Vec<ControlMessage> {
        match event {
            KeyboardEvent::NoteOn(e) => vec![note_on(e)],
            KeyboardEvent::NoteOff(e) => vec![note_off(e)],
            KeyboardEvent::FrequencyData(e) => vec![frequency_data(e)],
            KeyboardEvent::PolyphonyUpdate(e) => polyphony(e),
            KeyboardEvent::ScaleChange(e) => vec![scale_change(e)],
            KeyboardEvent::OctaveChange(e) => vec![octave_change(e)],
            KeyboardEvent::Custom(e) => vec![custom(e)],
        }
    }
}

fn note_on(e: &NoteOn) -> ControlMessage {
    ControlMessage::new(addresses::NOTE_ON)
        .arg(int(e.note_id, DEFAULT_NOTE_ID))
        .arg(float(e.frequency, DEFAULT_FREQUENCY))
        .arg(truthy_or(e.velocity, DEFAULT_VELOCITY) as f32)
        .arg(tet(&e.tet_system))
        .arg(int(e.octave, DEFAULT_OCTAVE))
        .arg(string(&e.note_name, DEFAULT_NOTE_NAME))
}

fn note_off(e: &NoteOff) -> ControlMessage {
    ControlMessage::new(addresses::NOTE_OFF)
        .arg(int(e.note_id, DEFAULT_NOTE_ID))
        .arg(float(e.frequency, DEFAULT_FREQUENCY))
        // Release velocity is always zero, whatever the event says.
        .arg(0.0_f32)
        .arg(tet(&e.tet_system))
        .arg(string(&e.note_name, DEFAULT_NOTE_NAME))
}

fn frequency_data(e: &FrequencyData) -> ControlMessage {
    ControlMessage::new(addresses::FREQ_DATA)
        .arg(float(e.frequency, DEFAULT_FREQUENCY))
        .arg(string(&e.note_name, DEFAULT_NOTE_NAME))
        .arg(int(e.tet_position, DEFAULT_TET_POSITION))
        .arg(int(e.octave, DEFAULT_OCTAVE))
        .arg(tet(&e.tet_system))
}

fn polyphony(e: &PolyphonyUpdate) -> Vec<ControlMessage> {
    let mut messages = Vec::with_capacity(e.active_frequencies.len() + 1);
    messages.push(
        ControlMessage::new(addresses::POLYPHONY)
            .arg(int(e.active_notes_count, DEFAULT_ACTIVE_NOTES_COUNT))
            .arg(tet(&e.tet_system)),
    );

    // index is the array position, not the note id
    for (index, frequency) in e.active_frequencies.iter().enumerate() {
        let note_id = e.active_note_ids.get(index).copied();
        messages.push(
            ControlMessage::new(addresses::POLYPHONY_NOTE)
                .arg(saturate(index as i64))
                .arg(*frequency as f32)
                .arg(int(note_id, DEFAULT_NOTE_ID)),
        );
    }
    messages
}

fn scale_change(e: &ScaleChange) -> ControlMessage {
    ControlMessage::new(addresses::SCALE)
        .arg(string(&e.scale_name, DEFAULT_SCALE_NAME))
        .arg(tet(&e.tet_system))
        .arg(int(e.scale_length, DEFAULT_SCALE_LENGTH))
}

fn octave_change(e: &OctaveChange) -> ControlMessage {
    ControlMessage::new(addresses::OCTAVE)
        .arg(int(e.octave_shift, DEFAULT_OCTAVE_SHIFT))
        .arg(tet(&e.tet_system))
}

fn custom(e: &CustomMessage) -> ControlMessage {
    let address = string(&e.osc_address, DEFAULT_CUSTOM_ADDRESS);
    let args = e.args.iter().map(coerce_custom_arg).collect();
    ControlMessage::with_args(address, args)
}

/// Coerces one custom argument; malformed entries are never rejected.
fn coerce_custom_arg(arg: &CustomArg) -> OscArg {
    let tag = arg
        .arg_type
        .as_deref()
        .and_then(|t| t.chars().next())
        .unwrap_or(DEFAULT_CUSTOM_ARG_TYPE);
    let value = truthy_or(arg.value.clone(), Value::from(0));

    match tag {
        'i' => OscArg::Int(saturate(as_int(&value).unwrap_or(0))),
        's' => OscArg::Str(match value {
            Value::String(s) => s,
            other => other.to_string(),
        }),
        _ => OscArg::Float(as_number(&value).unwrap_or(0.0) as f32),
    }
}

fn int(value: Option<i64>, default: i64) -> i32 {
    saturate(truthy_or(value, default))
}

fn float(value: Option<f64>, default: f64) -> f32 {
    truthy_or(value, default) as f32
}

fn string(value: &Option<String>, default: &str) -> String {
    truthy_or(value.clone(), default.to_string())
}

fn tet(value: &Option<String>) -> String {
    string(value, DEFAULT_TET_SYSTEM)
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn log_summary(event: &KeyboardEvent) {
    let tet = event.tet_system().unwrap_or(DEFAULT_TET_SYSTEM);
    match event {
        KeyboardEvent::NoteOn(e) => tracing::info!(
            note = e.note_name.as_deref().unwrap_or(""),
            frequency = %format!("{:.2}", e.frequency.unwrap_or_default()),
            tet_system = tet,
            "NOTE_ON"
        ),
        KeyboardEvent::NoteOff(e) => tracing::info!(
            note = e.note_name.as_deref().unwrap_or(""),
            frequency = %format!("{:.2}", e.frequency.unwrap_or_default()),
            "NOTE_OFF"
        ),
        KeyboardEvent::PolyphonyUpdate(e) => tracing::info!(
            active_notes = e.active_notes_count.unwrap_or_default(),
            "POLYPHONY"
        ),
        KeyboardEvent::ScaleChange(e) => tracing::info!(
            scale = e.scale_name.as_deref().unwrap_or(""),
            tet_system = tet,
            "SCALE"
        ),
        KeyboardEvent::OctaveChange(e) => tracing::info!(
            octave_shift = %format!("{:+}", e.octave_shift.unwrap_or_default()),
            "OCTAVE"
        ),
        KeyboardEvent::FrequencyData(_) | KeyboardEvent::Custom(_) => {
            tracing::trace!(event_type = event.type_name(), tet_system = tet, "Event");
        }
    }
}
