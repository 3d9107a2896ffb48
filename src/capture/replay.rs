//! Replay source for recorded capture dumps.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use super::{CaptureSource, CapturedFrame, parse_record_line};
use crate::{PilotError, Result};

/// Replays a capture dump (one JSON record per line) from disk, in recorded
/// order. The whole dump is parsed at open time so malformed records fail
/// the open, not a navigation run already in flight.
#[derive(Debug)]
pub struct ReplaySource {
    frames: VecDeque<CapturedFrame>,
}

impl ReplaySource {
    /// Open a recorded capture dump.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PilotError::capture_with_source(
                format!("could not read capture dump {}", path.display()),
                Box::new(e),
            )
        })?;
        let source = Self::from_lines(&text)?;
        info!("opened capture dump {}: {} frames", path.display(), source.remaining());
        Ok(source)
    }

    /// Build a replay from record lines already in memory.
    pub fn from_lines(text: &str) -> Result<Self> {
        let frames = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_record_line)
            .collect::<Result<VecDeque<_>>>()?;
        Ok(Self { frames })
    }

    /// Build a replay directly from captured frames.
    pub fn from_frames(frames: impl IntoIterator<Item = CapturedFrame>) -> Self {
        Self { frames: frames.into_iter().collect() }
    }

    /// Frames not yet popped.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl CaptureSource for ReplaySource {
    /// Pops the next recorded frame. A replay never blocks: once the dump
    /// is exhausted every pop reports an empty queue regardless of timeout.
    async fn pop(&mut self, timeout: Duration) -> Result<Option<CapturedFrame>> {
        if timeout.is_zero() {
            return Ok(None);
        }
        Ok(self.frames.pop_front())
    }
}
