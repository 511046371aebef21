//! KeyboardObserver port - Notifications from the keyboard UI.
//!
//! The UI layer exposes listener registration and calls these hooks
//! after it has played, stopped, transposed, or rescaled.

use serde_json::Value;

/// Direction of an octave transposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OctaveDirection {
    Up,
    Down,
    Reset,
}

/// Observer of keyboard UI actions.
///
/// All hooks default to no-ops so observers can pick what they need.
pub trait KeyboardObserver: Send + Sync {
    fn on_play_note(&self, _frequency: f64, _note_id: i64, _note_name: &str, _velocity: i64) {}

    fn on_stop_note(&self, _frequency: f64, _note_id: i64, _note_name: &str) {}

    fn on_transpose_octave(&self, _direction: OctaveDirection) {}

    fn on_apply_scale(&self, _scale_name: &str, _scale_notes: &[Value]) {}
}
