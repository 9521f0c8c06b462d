//! Message codec: the single authority for both wire representations.
//!
//! Serial frames are binary: a one-byte discriminant followed by one
//! 4-byte little-endian window per field, in the order given by
//! [`Message::schema`]. Floats are IEEE-754 bit images, integers are
//! plain `u32`, booleans use byte 0 of their window (non-zero means
//! true) with the remaining bytes written as zero.
//!
//! GUI frames are textual: one JSON object per line, serialized from
//! the message itself. The two layouts are fully independent.
//!
//! All functions here are pure; transports stay dumb byte pumps.

use crate::core::message::{FieldKind, FieldValue, Message};
use crate::domain::error::{ComError, ComResult, ProtocolError};

/// Width of every field window on the serial wire.
pub const FIELD_WIDTH: usize = 4;

/// Decode one field window.
///
/// Only the first [`FIELD_WIDTH`] bytes of `window` are interpreted;
/// shorter input is a protocol fault.
pub fn decode_field(window: &[u8], kind: FieldKind) -> Result<FieldValue, ProtocolError> {
    if window.len() < FIELD_WIDTH {
        return Err(ProtocolError::Truncated {
            needed: FIELD_WIDTH,
            got: window.len(),
        });
    }

    let bytes: [u8; FIELD_WIDTH] = window[..FIELD_WIDTH]
        .try_into()
        .map_err(|_| ProtocolError::Truncated {
            needed: FIELD_WIDTH,
            got: window.len(),
        })?;

    let value = match kind {
        FieldKind::Float => FieldValue::Float(f32::from_le_bytes(bytes)),
        FieldKind::Int => FieldValue::Int(u32::from_le_bytes(bytes)),
        FieldKind::Bool => FieldValue::Bool(bytes[0] != 0),
    };

    Ok(value)
}

/// Append the wire image of one field value to `out`.
pub fn encode_field(value: FieldValue, out: &mut Vec<u8>) {
    match value {
        FieldValue::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Bool(v) => out.extend_from_slice(&[u8::from(v), 0, 0, 0]),
    }
}

/// Total wire length of a frame for `discriminant`, or `None` for an
/// unknown discriminant.
pub fn frame_len(discriminant: u8) -> Option<usize> {
    Message::schema(discriminant).map(|schema| 1 + schema.len() * FIELD_WIDTH)
}

/// Decode one complete binary frame into a message.
///
/// The buffer must contain exactly one frame: short input and
/// trailing bytes are both protocol faults, and no partially
/// populated message is ever produced.
pub fn decode_frame(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let discriminant = *bytes.first().ok_or(ProtocolError::Truncated { needed: 1, got: 0 })?;

    let schema =
        Message::schema(discriminant).ok_or(ProtocolError::UnknownDiscriminant(discriminant))?;

    let expected = 1 + schema.len() * FIELD_WIDTH;
    if bytes.len() < expected {
        return Err(ProtocolError::Truncated {
            needed: expected,
            got: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(ProtocolError::TrailingBytes(bytes.len() - expected));
    }

    let mut fields = Vec::with_capacity(schema.len());
    for (index, kind) in schema.iter().enumerate() {
        let start = 1 + index * FIELD_WIDTH;
        fields.push(decode_field(&bytes[start..start + FIELD_WIDTH], *kind)?);
    }

    Message::from_fields(discriminant, &fields)
        .ok_or(ProtocolError::UnknownDiscriminant(discriminant))
}

/// Encode a message into its binary frame.
///
/// Exact inverse of [`decode_frame`] for every valid message.
pub fn encode_frame(msg: &Message) -> Vec<u8> {
    let fields = msg.fields();
    let mut frame = Vec::with_capacity(1 + fields.len() * FIELD_WIDTH);
    frame.push(msg.discriminant());
    for field in fields {
        encode_field(field, &mut frame);
    }
    frame
}

/// Encode a message as one newline-terminated JSON line for the GUI.
pub fn encode_text(msg: &Message) -> ComResult<String> {
    let mut line = serde_json::to_string(msg)
        .map_err(|e| ComError::Protocol(ProtocolError::Text(e.to_string())))?;
    line.push('\n');
    Ok(line)
}
