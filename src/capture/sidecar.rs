//! Live connection to the capture sidecar.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};

use super::{CaptureSource, CapturedFrame, parse_record_line};
use crate::{PilotError, Result};

/// Streams captured frames from the out-of-process sidecar over TCP,
/// one JSON record per line.
pub struct SidecarSource {
    reader: BufReader<TcpStream>,
    /// Partial line carried across timed-out pops; `read_until` appends to
    /// it, so a timeout never loses bytes already received.
    line: Vec<u8>,
}

impl SidecarSource {
    /// Connect to a running capture sidecar.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            PilotError::capture_with_source("could not reach capture sidecar", Box::new(e))
        })?;
        if let Ok(peer) = stream.peer_addr() {
            info!("connected to capture sidecar at {peer}");
        }
        Ok(Self { reader: BufReader::new(stream), line: Vec::new() })
    }
}

#[async_trait::async_trait]
impl CaptureSource for SidecarSource {
    async fn pop(&mut self, timeout: Duration) -> Result<Option<CapturedFrame>> {
        if timeout.is_zero() {
            return Ok(None);
        }

        let read = tokio::time::timeout(timeout, self.reader.read_until(b'\n', &mut self.line));
        match read.await {
            Err(_elapsed) => Ok(None),
            Ok(Ok(0)) => Err(PilotError::capture("capture sidecar closed the stream")),
            Ok(Ok(_)) => {
                if self.line.last() != Some(&b'\n') {
                    return Err(PilotError::capture("capture stream ended mid-record"));
                }
                let line = std::mem::take(&mut self.line);
                let text = String::from_utf8(line).map_err(|e| {
                    PilotError::capture_with_source("capture record is not UTF-8", Box::new(e))
                })?;
                debug!("sidecar record: {} bytes", text.len());
                parse_record_line(text.trim_end()).map(Some)
            }
            Ok(Err(e)) => Err(e.into()),
        }
    }
}
