//! Error types for capture decoding and screen navigation.
//!
//! All errors are fatal for the operation in progress: nothing in this crate
//! retries internally. Retry policy, if any, belongs to the calling
//! automation script, which can consult [`PilotError::is_retryable`].
//!
//! Errors raised while a screen is on display carry the screenshot taken at
//! failure time so a run can be diagnosed post-mortem without re-driving the
//! client. Decoding errors for unknown protocol surface carry the raw
//! undecoded bytes instead.

use thiserror::Error;

use crate::browser::Screenshot;

/// Result type alias for navigation and decoding operations.
pub type Result<T, E = PilotError> = std::result::Result<T, E>;

/// Main error type for capture decoding and screen navigation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PilotError {
    /// A captured frame could not be decoded: unrecognized type tag,
    /// malformed response envelope, or an undecodable payload.
    #[error("frame decode failed: {detail}")]
    Decode { detail: String },

    /// A message name has no entry in the schema registry. Distinct from
    /// [`PilotError::Decode`]: it signals that the protocol surface changed.
    /// The undecoded payload is preserved for triage.
    #[error("unknown API surface '{name}' ({} raw bytes)", raw.len())]
    SchemaGap { name: String, raw: Vec<u8> },

    /// A second identity-bearing message reported a different account id
    /// than the one already established for this session.
    #[error("inconsistent account ids: {established} then {observed}")]
    IdentityConflict { established: i64, observed: i64 },

    /// Initial visual confirmation failed for a newly constructed screen.
    #[error("could not detect '{screen}' screen")]
    NotDetected { screen: &'static str, screenshot: Screenshot },

    /// A message name outside all recognized catalogs appeared while a
    /// screen was settling.
    #[error("unexpected message '{name}' while settling")]
    Inconsistent { name: String, screenshot: Screenshot },

    /// A deadline was exceeded while waiting for a message, a visual
    /// target, or settling completion.
    #[error("operation timed out")]
    Timeout { screenshot: Screenshot },

    /// An operation was invoked on a presentation that has been superseded
    /// by a later transition.
    #[error("presentation has been superseded")]
    Stale,

    /// The capture sidecar connection failed or delivered a malformed
    /// record.
    #[error("capture transport failure: {reason}")]
    Capture {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The browser driver or template store failed.
    #[error("browser driver failure: {reason}")]
    Driver {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PilotError {
    /// Returns whether a caller may reasonably retry the failed operation.
    ///
    /// Protocol-shape errors are never retryable: re-running the same
    /// capture stream decodes to the same result.
    pub fn is_retryable(&self) -> bool {
        match self {
            PilotError::Timeout { .. } => true,
            PilotError::Capture { .. } => true,
            PilotError::Driver { .. } => true,
            PilotError::Decode { .. } => false,
            PilotError::SchemaGap { .. } => false,
            PilotError::IdentityConflict { .. } => false,
            PilotError::NotDetected { .. } => false,
            PilotError::Inconsistent { .. } => false,
            PilotError::Stale => false,
        }
    }

    /// Screenshot attached at failure time, if this error carries one.
    pub fn screenshot(&self) -> Option<&Screenshot> {
        match self {
            PilotError::NotDetected { screenshot, .. }
            | PilotError::Inconsistent { screenshot, .. }
            | PilotError::Timeout { screenshot } => Some(screenshot),
            _ => None,
        }
    }

    /// Helper constructor for frame decode errors.
    pub fn decode(detail: impl Into<String>) -> Self {
        PilotError::Decode { detail: detail.into() }
    }

    /// Helper constructor for capture transport errors.
    pub fn capture(reason: impl Into<String>) -> Self {
        PilotError::Capture { reason: reason.into(), source: None }
    }

    /// Helper constructor for capture transport errors with a source.
    pub fn capture_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PilotError::Capture { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for browser driver errors.
    pub fn driver(reason: impl Into<String>) -> Self {
        PilotError::Driver { reason: reason.into(), source: None }
    }
}

impl From<std::io::Error> for PilotError {
    fn from(err: std::io::Error) -> Self {
        PilotError::Capture { reason: "i/o failure".to_string(), source: Some(Box::new(err)) }
    }
}
