//! Test fixtures: hand-rolled frame encoders and a scripted capture
//! source.
//!
//! The crate never encodes protocol traffic in production, so the encoders
//! live here, next to the tests that need synthetic frames.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::capture::{CaptureSource, CapturedFrame, Direction};
use crate::Result;

pub(crate) fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Encode a varint-form field.
pub(crate) fn field_varint(number: u32, value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(u64::from(number) << 3, &mut out);
    encode_varint(value, &mut out);
    out
}

/// Encode a length-delimited field.
pub(crate) fn field_bytes(number: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(u64::from(number) << 3 | 2, &mut out);
    encode_varint(payload.len() as u64, &mut out);
    out.extend_from_slice(payload);
    out
}

/// Encode the frame envelope: name at field 1, payload at field 2.
pub(crate) fn wrapper(name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = field_bytes(1, name.as_bytes());
    out.extend(field_bytes(2, data));
    out
}

/// Fire-and-forget request frame (tag 1).
pub(crate) fn oneway_frame(name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = vec![1u8];
    out.extend(wrapper(name, data));
    out
}

/// Response-expecting request frame (tag 2) with its sequence number.
pub(crate) fn paired_frame(sequence: u16, name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = vec![2u8];
    out.extend(sequence.to_be_bytes());
    out.extend(wrapper(name, data));
    out
}

/// Response frame (tag 3): empty envelope name, payload at field 2.
pub(crate) fn response_frame(data: &[u8]) -> Vec<u8> {
    let mut out = vec![3u8];
    out.extend(wrapper("", data));
    out
}

/// Captured item with a fixed interception timestamp.
pub(crate) fn captured(
    direction: Direction,
    request: Vec<u8>,
    response: Option<Vec<u8>>,
) -> CapturedFrame {
    CapturedFrame {
        direction,
        request,
        response,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

/// Capture source that replays a fixed script and counts live pops, so
/// tests can assert the live channel was not touched.
pub(crate) struct ScriptedSource {
    frames: VecDeque<CapturedFrame>,
    live_pops: usize,
}

impl ScriptedSource {
    pub(crate) fn new(frames: Vec<CapturedFrame>) -> Self {
        Self { frames: frames.into(), live_pops: 0 }
    }

    pub(crate) fn live_pops(&self) -> usize {
        self.live_pops
    }
}

#[async_trait::async_trait]
impl CaptureSource for ScriptedSource {
    async fn pop(&mut self, _timeout: Duration) -> Result<Option<CapturedFrame>> {
        self.live_pops += 1;
        Ok(self.frames.pop_front())
    }
}
