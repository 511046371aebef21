//! OSC 1.0 message encoding and decoding on top of `rosc`.
//!
//! Only single messages with `i`, `f` and `s` arguments cross the bridge;
//! bundles and other argument types are rejected on decode.

use rosc::{OscMessage, OscPacket, OscType};
use thiserror::Error;

use super::message::{ControlMessage, OscArg};

/// Errors produced while encoding or decoding an OSC packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("OSC address cannot be empty")]
    EmptyAddress,

    #[error("OSC strings cannot contain NUL bytes")]
    EmbeddedNul,

    #[error("OSC bundles are not accepted")]
    Bundle,

    #[error("Unsupported OSC argument {0}")]
    UnsupportedType(String),

    #[error("{0} trailing bytes after last argument")]
    TrailingBytes(usize),

    #[error("Malformed OSC packet: {0}")]
    Osc(String),
}

impl From<rosc::OscError> for CodecError {
    fn from(err: rosc::OscError) -> Self {
        CodecError::Osc(format!("{:?}", err))
    }
}

impl From<&OscArg> for OscType {
    fn from(arg: &OscArg) -> Self {
        match arg {
            OscArg::Int(v) => OscType::Int(*v),
            OscArg::Float(v) => OscType::Float(*v),
            OscArg::Str(v) => OscType::String(v.clone()),
        }
    }
}

impl TryFrom<OscType> for OscArg {
    type Error = CodecError;

    fn try_from(value: OscType) -> Result<Self, Self::Error> {
        match value {
            OscType::Int(v) => Ok(OscArg::Int(v)),
            OscType::Float(v) => Ok(OscArg::Float(v)),
            OscType::String(v) => Ok(OscArg::Str(v)),
            other => Err(CodecError::UnsupportedType(format!("{:?}", other))),
        }
    }
}

impl From<&ControlMessage> for OscMessage {
    fn from(message: &ControlMessage) -> Self {
        OscMessage {
            addr: message.address.clone(),
            args: message.args.iter().map(OscType::from).collect(),
        }
    }
}

impl TryFrom<OscMessage> for ControlMessage {
    type Error = CodecError;

    fn try_from(message: OscMessage) -> Result<Self, Self::Error> {
        if message.addr.is_empty() {
            return Err(CodecError::EmptyAddress);
        }
        let args = message
            .args
            .into_iter()
            .map(OscArg::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ControlMessage::with_args(message.addr, args))
    }
}

/// Encodes a control message into an OSC packet.
pub fn encode(message: &ControlMessage) -> Result<Vec<u8>, CodecError> {
    if message.address.is_empty() {
        return Err(CodecError::EmptyAddress);
    }
    let has_nul = message.address.contains('\0')
        || message
            .args
            .iter()
            .any(|arg| matches!(arg, OscArg::Str(s) if s.contains('\0')));
    if has_nul {
        return Err(CodecError::EmbeddedNul);
    }

    let packet = OscPacket::Message(OscMessage::from(message));
    Ok(rosc::encoder::encode(&packet)?)
}

/// Decodes an OSC packet into a control message.
pub fn decode(packet: &[u8]) -> Result<ControlMessage, CodecError> {
    let (rest, packet) = rosc::decoder::decode_udp(packet)?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes(rest.len()));
    }

    match packet {
        OscPacket::Message(message) => ControlMessage::try_from(message),
        OscPacket::Bundle(_) => Err(CodecError::Bundle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_known_packet_layout() {
        let msg = ControlMessage::new("/oscillator/4/frequency").arg(440.0_f32);
        let bytes = encode(&msg).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"/oscillator/4/frequency\0");
        expected.extend_from_slice(b",f\0\0");
        expected.extend_from_slice(&[0x43, 0xdc, 0x00, 0x00]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn pads_strings_to_four_byte_boundaries() {
        let msg = ControlMessage::new("/ab").arg("abcd").arg(1);
        let bytes = encode(&msg).unwrap();

        // "/ab\0" + ",si\0" + "abcd\0\0\0\0" + int
        assert_eq!(bytes.len(), 4 + 4 + 8 + 4);
        assert_eq!(&bytes[8..16], b"abcd\0\0\0\0");
        assert_eq!(&bytes[16..], &[0, 0, 0, 1]);
    }

    #[test]
    fn encodes_zero_argument_message_with_bare_comma() {
        let bytes = encode(&ControlMessage::new("/ping")).unwrap();
        assert_eq!(bytes, b"/ping\0\0\0,\0\0\0".to_vec());
    }

    #[test]
    fn round_trips_note_on_shape() {
        let msg = ControlMessage::new("/microtonal/note_on")
            .arg(5)
            .arg(293.66_f32)
            .arg(127.0_f32)
            .arg("19-TET")
            .arg(0)
            .arg("D");

        let decoded = decode(&encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.type_tags(), "iffsis");
    }

    #[test]
    fn negative_ints_survive_round_trip() {
        let msg = ControlMessage::new("/microtonal/octave").arg(-2).arg("31-TET");
        assert_eq!(decode(&encode(&msg).unwrap()).unwrap(), msg);
    }

    #[test]
    fn rejects_empty_address() {
        assert_eq!(encode(&ControlMessage::new("")), Err(CodecError::EmptyAddress));
    }

    #[test]
    fn rejects_embedded_nul() {
        let msg = ControlMessage::new("/x").arg("a\0b");
        assert_eq!(encode(&msg), Err(CodecError::EmbeddedNul));
    }

    #[test]
    fn decode_rejects_truncated_argument() {
        let mut bytes = encode(&ControlMessage::new("/x").arg(7)).unwrap();
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(decode(&bytes), Err(CodecError::Osc(_))));
    }

    #[test]
    fn decode_rejects_arguments_outside_the_vocabulary() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"/x\0\0");
        bytes.extend_from_slice(b",d\0\0");
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(decode(&bytes), Err(CodecError::UnsupportedType(_))));
    }

    #[test]
    fn decode_rejects_bundles() {
        let bundle = OscPacket::Bundle(rosc::OscBundle {
            timetag: rosc::OscTime { seconds: 0, fractional: 1 },
            content: vec![OscPacket::Message(OscMessage {
                addr: "/x".to_string(),
                args: vec![OscType::Int(1)],
            })],
        });
        let bytes = rosc::encoder::encode(&bundle).unwrap();
        assert_eq!(decode(&bytes), Err(CodecError::Bundle));
    }

    #[test]
    fn decode_rejects_unterminated_address() {
        assert!(decode(b"/abc").is_err());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = encode(&ControlMessage::new("/x").arg(1)).unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(decode(&bytes).is_err());
    }

    fn arg_strategy() -> impl Strategy<Value = OscArg> {
        prop_oneof![
            any::<i32>().prop_map(OscArg::Int),
            any::<f32>()
                .prop_filter("NaN never compares equal", |f| !f.is_nan())
                .prop_map(OscArg::Float),
            "\\PC{0,24}".prop_map(OscArg::Str),
        ]
    }

    proptest! {
        #[test]
        fn arguments_round_trip_exactly(
            address in "/[a-z_]{1,12}(/[a-z_]{1,12}){0,3}",
            args in prop::collection::vec(arg_strategy(), 0..8),
        ) {
            let msg = ControlMessage::with_args(address, args);
            let bytes = encode(&msg).unwrap();
            prop_assert_eq!(bytes.len() % 4, 0);
            prop_assert_eq!(decode(&bytes).unwrap(), msg);
        }
    }
}
