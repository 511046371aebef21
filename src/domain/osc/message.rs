//! Control message value types.

use std::fmt;

/// A single typed OSC argument.
///
/// Only the three tags used by the microtonal vocabulary are supported.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    /// 32-bit big-endian signed integer (`i`).
    Int(i32),
    /// 32-bit big-endian IEEE float (`f`).
    Float(f32),
    /// NUL-terminated, 4-byte padded string (`s`).
    Str(String),
}

impl OscArg {
    /// The OSC type tag character for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
        }
    }
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(v) => write!(f, "i:{}", v),
            OscArg::Float(v) => write!(f, "f:{}", v),
            OscArg::Str(v) => write!(f, "s:{:?}", v),
        }
    }
}

impl From<i32> for OscArg {
    fn from(value: i32) -> Self {
        OscArg::Int(value)
    }
}

impl From<f32> for OscArg {
    fn from(value: f32) -> Self {
        OscArg::Float(value)
    }
}

impl From<String> for OscArg {
    fn from(value: String) -> Self {
        OscArg::Str(value)
    }
}

impl From<&str> for OscArg {
    fn from(value: &str) -> Self {
        OscArg::Str(value.to_string())
    }
}

/// An outbound OSC message: address path plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl ControlMessage {
    /// Creates a message with no arguments.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: Vec::new(),
        }
    }

    /// Creates a message with the given arguments.
    pub fn with_args(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Appends an argument, builder style.
    pub fn arg(mut self, arg: impl Into<OscArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The type tags of all arguments in order, e.g. `"iffsis"`.
    pub fn type_tags(&self) -> String {
        self.args.iter().map(OscArg::type_tag).collect()
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_argument_order() {
        let msg = ControlMessage::new("/microtonal/octave")
            .arg(2)
            .arg("31-TET");

        assert_eq!(msg.args, vec![OscArg::Int(2), OscArg::Str("31-TET".into())]);
        assert_eq!(msg.type_tags(), "is");
    }

    #[test]
    fn display_lists_typed_arguments() {
        let msg = ControlMessage::new("/x").arg(1).arg(0.5_f32).arg("a");
        assert_eq!(msg.to_string(), r#"/x i:1 f:0.5 s:"a""#);
    }
}
