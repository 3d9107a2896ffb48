//! Capture sidecar boundary.
//!
//! Wire traffic is intercepted out-of-process and queued by a capture
//! sidecar; this crate only ever pops from that queue. [`CaptureSource`]
//! abstracts over where the queue lives: a live sidecar connection
//! ([`SidecarSource`]) or a recorded dump on disk ([`ReplaySource`]).

mod replay;
mod sidecar;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{PilotError, Result};

pub use replay::ReplaySource;
pub use sidecar::SidecarSource;

/// Which way a captured request traveled, relative to the game client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

impl FromStr for Direction {
    type Err = PilotError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("inbound") {
            Ok(Direction::Inbound)
        } else if s.eq_ignore_ascii_case("outbound") {
            Ok(Direction::Outbound)
        } else {
            Err(PilotError::capture(format!("unknown capture direction '{s}'")))
        }
    }
}

/// One captured unit: the raw request frame, the paired response frame if
/// the sidecar saw one, and the out-of-band metadata it recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub direction: Direction,
    pub request: Vec<u8>,
    pub response: Option<Vec<u8>>,
    pub timestamp: DateTime<Utc>,
}

/// Blocking pop with timeout over the sidecar's frame queue.
#[async_trait::async_trait]
pub trait CaptureSource: Send {
    /// Wait up to `timeout` for the next captured frame. `Ok(None)` means
    /// the timeout lapsed with nothing queued.
    async fn pop(&mut self, timeout: Duration) -> Result<Option<CapturedFrame>>;
}

/// On-the-wire record format the sidecar emits, one JSON object per line.
/// Frame bytes travel base64-encoded; the timestamp is seconds since the
/// Unix epoch as recorded at interception time.
#[derive(Debug, Deserialize)]
struct CaptureRecord {
    request_direction: String,
    request: String,
    response: Option<String>,
    timestamp: f64,
}

impl CaptureRecord {
    fn into_frame(self) -> Result<CapturedFrame> {
        use base64::Engine as _;
        let b64 = base64::engine::general_purpose::STANDARD;

        let direction = self.request_direction.parse()?;
        let request = b64
            .decode(&self.request)
            .map_err(|e| PilotError::capture_with_source("bad base64 request", Box::new(e)))?;
        let response = match &self.response {
            None => None,
            Some(encoded) => Some(b64.decode(encoded).map_err(|e| {
                PilotError::capture_with_source("bad base64 response", Box::new(e))
            })?),
        };
        let timestamp = timestamp_from_seconds(self.timestamp)?;

        Ok(CapturedFrame { direction, request, response, timestamp })
    }
}

fn timestamp_from_seconds(seconds: f64) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(PilotError::capture(format!("non-finite capture timestamp {seconds}")));
    }
    let micros = (seconds * 1e6).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return Err(PilotError::capture(format!("capture timestamp out of range: {seconds}")));
    }
    DateTime::from_timestamp_micros(micros as i64)
        .ok_or_else(|| PilotError::capture(format!("capture timestamp out of range: {seconds}")))
}

fn parse_record_line(line: &str) -> Result<CapturedFrame> {
    let record: CaptureRecord = serde_json::from_str(line)
        .map_err(|e| PilotError::capture_with_source("malformed capture record", Box::new(e)))?;
    record.into_frame()
}
