//! Decoded message record.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::capture::Direction;

/// One decoded protocol exchange, as popped from the channel.
///
/// `response` is present exactly when the captured item paired the request
/// with a response frame; fire-and-forget calls and server notifications
/// carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Travel direction recorded by the capture sidecar.
    pub direction: Direction,
    /// Dotted protocol name, e.g. `.lq.Lobby.heatbeat`.
    pub name: String,
    /// Request payload rendered with every schema field present.
    pub request: Map<String, Value>,
    /// Response payload, if the exchange had a response leg.
    pub response: Option<Map<String, Value>>,
    /// Interception time recorded by the sidecar.
    pub timestamp: DateTime<Utc>,
}
