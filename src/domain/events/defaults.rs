//! Per-field default table.
//!
//! Defaults follow "falsy substitutes default": a field that is absent,
//! null, zero, NaN, or an empty string is replaced by its default. This
//! means a real `velocity: 0` or `octave: 0` can never reach the DAW as
//! sent; the DAW patch was built against this behavior, so it is kept.

/// TET system assumed when a producer cannot detect one.
pub const DEFAULT_TET_SYSTEM: &str = "31-TET";

pub const DEFAULT_NOTE_ID: i64 = 0;
pub const DEFAULT_FREQUENCY: f64 = 440.0;
pub const DEFAULT_VELOCITY: i64 = 127;
pub const DEFAULT_NOTE_NAME: &str = "C";
pub const DEFAULT_OCTAVE: i64 = 0;
pub const DEFAULT_TET_POSITION: i64 = 0;
pub const DEFAULT_ACTIVE_NOTES_COUNT: i64 = 0;
pub const DEFAULT_SCALE_NAME: &str = "chromatic";
pub const DEFAULT_SCALE_LENGTH: i64 = 12;
pub const DEFAULT_OCTAVE_SHIFT: i64 = 0;
pub const DEFAULT_CUSTOM_ADDRESS: &str = "/microtonal/custom";
pub const DEFAULT_CUSTOM_ARG_TYPE: char = 'f';

/// Values that count as "not provided" for defaulting purposes.
pub trait Falsy {
    fn is_falsy(&self) -> bool;
}

impl Falsy for i64 {
    fn is_falsy(&self) -> bool {
        *self == 0
    }
}

impl Falsy for f64 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for String {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for bool {
    fn is_falsy(&self) -> bool {
        !*self
    }
}

impl Falsy for serde_json::Value {
    fn is_falsy(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Bool(b) => !b,
            serde_json::Value::Number(n) => n.as_f64().map_or(true, |f| f.is_falsy()),
            serde_json::Value::String(s) => s.is_empty(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => false,
        }
    }
}

/// Returns the value unless it is absent or falsy, otherwise the default.
pub fn truthy_or<T: Falsy>(value: Option<T>, default: T) -> T {
    match value {
        Some(v) if !v.is_falsy() => v,
        _ => default,
    }
}
