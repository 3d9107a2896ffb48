//! Raw frame layouts.
//!
//! Every captured frame starts with a type tag. Tag 1 is a fire-and-forget
//! request with the envelope immediately after the tag; tag 2 is a request
//! expecting a response, with a 2-byte big-endian sequence number between
//! the tag and the envelope; tag 3 is a response, whose inner envelope name
//! must be empty (the paired request's name selects the response schema).
//! Any other tag is a decode error.

use tracing::trace;

use crate::schema::{WIRE_LEN, WRAPPER, WireReader};
use crate::{PilotError, Result};

const TAG_ONEWAY: u8 = 1;
const TAG_PAIRED: u8 = 2;
const TAG_RESPONSE: u8 = 3;

/// Envelope carried by every frame: the dotted protocol name plus the
/// opaque payload bytes for that name.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
}

/// Split a request frame into its envelope.
pub(crate) fn split_request(frame: &[u8]) -> Result<Envelope> {
    let (&tag, rest) =
        frame.split_first().ok_or_else(|| PilotError::decode("empty request frame"))?;
    match tag {
        TAG_ONEWAY => unwrap_envelope(rest),
        TAG_PAIRED => {
            let body = rest
                .get(2..)
                .ok_or_else(|| PilotError::decode("paired request frame lacks sequence number"))?;
            trace!(sequence = u16::from_be_bytes([rest[0], rest[1]]), "paired request");
            unwrap_envelope(body)
        }
        other => Err(PilotError::decode(format!("{other}: unknown request type"))),
    }
}

/// Validate a response frame and return its payload bytes.
pub(crate) fn split_response(frame: &[u8]) -> Result<Vec<u8>> {
    let (&tag, rest) =
        frame.split_first().ok_or_else(|| PilotError::decode("empty response frame"))?;
    if tag != TAG_RESPONSE {
        return Err(PilotError::decode(format!("{tag}: unknown response type")));
    }
    let envelope = unwrap_envelope(rest)?;
    if !envelope.name.is_empty() {
        return Err(PilotError::decode(format!("{}: unexpected response name", envelope.name)));
    }
    Ok(envelope.data)
}

fn unwrap_envelope(bytes: &[u8]) -> Result<Envelope> {
    let mut name = String::new();
    let mut data = Vec::new();

    let mut reader = WireReader::new(bytes);
    while !reader.at_end() {
        let (number, wire_form) = reader.key()?;
        match WRAPPER.field(number) {
            Some(field) if wire_form == WIRE_LEN => {
                let raw = reader.len_delimited()?;
                if field.name == "name" {
                    name = std::str::from_utf8(raw)
                        .map_err(|_| PilotError::decode("envelope name is not valid UTF-8"))?
                        .to_string();
                } else {
                    data = raw.to_vec();
                }
            }
            Some(field) => {
                return Err(PilotError::decode(format!(
                    "envelope field '{}' has wire form {wire_form}",
                    field.name
                )));
            }
            None => reader.skip(wire_form)?,
        }
    }

    Ok(Envelope { name, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{oneway_frame, paired_frame, response_frame, wrapper};

    #[test]
    fn oneway_frame_splits_at_byte_one() {
        let frame = oneway_frame(".lq.Lobby.heatbeat", b"\x08\x01");
        let envelope = split_request(&frame).unwrap();
        assert_eq!(envelope.name, ".lq.Lobby.heatbeat");
        assert_eq!(envelope.data, b"\x08\x01");
    }

    #[test]
    fn paired_frame_skips_sequence_number() {
        let frame = paired_frame(0x1234, ".lq.Lobby.oauth2Login", b"");
        let envelope = split_request(&frame).unwrap();
        assert_eq!(envelope.name, ".lq.Lobby.oauth2Login");
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn unknown_request_tags_fail() {
        for tag in [0u8, 3, 4, 0xFF] {
            let mut frame = vec![tag];
            frame.extend(wrapper(".lq.Lobby.heatbeat", b""));
            let err = split_request(&frame).unwrap_err();
            assert!(matches!(err, PilotError::Decode { .. }), "tag {tag}");
        }
        assert!(matches!(split_request(&[]), Err(PilotError::Decode { .. })));
    }

    #[test]
    fn response_frame_requires_tag_three_and_empty_name() {
        let frame = response_frame(b"\x08\x07");
        assert_eq!(split_response(&frame).unwrap(), b"\x08\x07");

        let mut wrong_tag = response_frame(b"");
        wrong_tag[0] = 2;
        assert!(matches!(split_response(&wrong_tag), Err(PilotError::Decode { .. })));

        let mut named = vec![3u8];
        named.extend(wrapper(".lq.ResCommon", b""));
        assert!(matches!(split_response(&named), Err(PilotError::Decode { .. })));
    }
}
