//! Low-level wire reader for schema-typed payloads.
//!
//! Payloads are sequences of `(key, value)` pairs where the key packs a
//! field number and a wire form: varint (0), 64-bit (1), length-delimited
//! (2) or 32-bit (5). [`decode_message`] walks a payload against a
//! [`MessageDescriptor`] and renders a structured mapping that contains
//! every descriptor field, defaulted ones included, under the protocol's
//! original field identifiers. Field numbers the descriptor does not know
//! are skipped by wire form, never guessed at.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};

use super::{FieldDescriptor, FieldKind, MessageDescriptor};
use crate::{PilotError, Result};

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
pub(crate) const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// Cursor over one raw payload.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| PilotError::decode("payload truncated mid-field"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.byte()?;
            if shift >= 64 {
                return Err(PilotError::decode("varint exceeds 64 bits"));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read the next field key: `(field number, wire form)`.
    pub(crate) fn key(&mut self) -> Result<(u32, u8)> {
        let key = self.varint()?;
        let number = u32::try_from(key >> 3)
            .map_err(|_| PilotError::decode("field number out of range"))?;
        if number == 0 {
            return Err(PilotError::decode("field number 0 is reserved"));
        }
        Ok((number, (key & 0x7) as u8))
    }

    pub(crate) fn len_delimited(&mut self) -> Result<&'a [u8]> {
        let len = usize::try_from(self.varint()?)
            .map_err(|_| PilotError::decode("length-delimited field too long"))?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| PilotError::decode("length-delimited field overruns payload"))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, wire_form: u8) -> Result<()> {
        match wire_form {
            WIRE_VARINT => {
                self.varint()?;
            }
            WIRE_FIXED64 => {
                self.advance(8)?;
            }
            WIRE_LEN => {
                self.len_delimited()?;
            }
            WIRE_FIXED32 => {
                self.advance(4)?;
            }
            other => {
                return Err(PilotError::decode(format!("unknown wire form {other}")));
            }
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) -> Result<()> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| PilotError::decode("payload truncated mid-field"))?;
        self.pos = end;
        Ok(())
    }
}

/// Decode one payload into a structured mapping.
///
/// Every field the descriptor names appears in the result; fields absent
/// from the wire keep their default rendering. Scalar fields are last-wins,
/// repeated fields accumulate in wire order.
pub(crate) fn decode_message(
    descriptor: &MessageDescriptor,
    data: &[u8],
) -> Result<Map<String, Value>> {
    let mut rendered = Map::new();
    for field in descriptor.fields {
        rendered.insert(field.name.to_string(), default_value(field));
    }

    let mut reader = WireReader::new(data);
    while !reader.at_end() {
        let (number, wire_form) = reader.key()?;
        match descriptor.field(number) {
            None => reader.skip(wire_form)?,
            Some(field) => {
                let value = decode_value(field, wire_form, &mut reader)?;
                if field.repeated {
                    match rendered.get_mut(field.name) {
                        Some(Value::Array(items)) => items.push(value),
                        _ => {
                            rendered.insert(field.name.to_string(), Value::Array(vec![value]));
                        }
                    }
                } else {
                    rendered.insert(field.name.to_string(), value);
                }
            }
        }
    }
    Ok(rendered)
}

fn decode_value(
    field: &FieldDescriptor,
    wire_form: u8,
    reader: &mut WireReader<'_>,
) -> Result<Value> {
    match field.kind {
        FieldKind::Uint32 => {
            expect_form(field, wire_form, WIRE_VARINT)?;
            let raw = reader.varint()?;
            let value = u32::try_from(raw).map_err(|_| {
                PilotError::decode(format!("field '{}' overflows u32: {raw}", field.name))
            })?;
            Ok(Value::from(value))
        }
        FieldKind::Bool => {
            expect_form(field, wire_form, WIRE_VARINT)?;
            Ok(Value::from(reader.varint()? != 0))
        }
        FieldKind::String => {
            expect_form(field, wire_form, WIRE_LEN)?;
            let bytes = reader.len_delimited()?;
            let text = std::str::from_utf8(bytes).map_err(|_| {
                PilotError::decode(format!("field '{}' is not valid UTF-8", field.name))
            })?;
            Ok(Value::from(text))
        }
        FieldKind::Bytes => {
            expect_form(field, wire_form, WIRE_LEN)?;
            Ok(Value::from(BASE64.encode(reader.len_delimited()?)))
        }
        FieldKind::Message(inner) => {
            expect_form(field, wire_form, WIRE_LEN)?;
            let bytes = reader.len_delimited()?;
            Ok(Value::Object(decode_message(inner, bytes)?))
        }
    }
}

fn expect_form(field: &FieldDescriptor, got: u8, want: u8) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(PilotError::decode(format!(
            "field '{}' has wire form {got}, expected {want}",
            field.name
        )))
    }
}

fn default_value(field: &FieldDescriptor) -> Value {
    if field.repeated {
        return Value::Array(Vec::new());
    }
    match field.kind {
        FieldKind::Uint32 => Value::from(0u32),
        FieldKind::Bool => Value::from(false),
        FieldKind::String => Value::from(""),
        FieldKind::Bytes => Value::from(""),
        FieldKind::Message(_) => Value::Null,
    }
}
