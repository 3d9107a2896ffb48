//! Message channel client.
//!
//! Pulls raw frames from the capture sidecar on demand, decodes them
//! against the schema registry and tracks the session's account identity.
//! A private put-back stack gives callers single-slot lookahead: a dequeued
//! message can be un-consumed and will be replayed, unchanged, before the
//! live channel is touched again.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, trace};

use super::frame;
use super::message::Message;
use crate::capture::{CaptureSource, CapturedFrame};
use crate::schema::SchemaRegistry;
use crate::{PilotError, Result};

/// Messages whose response carries the session's account id, with the key
/// path to walk into the decoded response.
///
/// The upstream catalog also lists the room-creation call here, but with a
/// key that merges two field names into one string; that entry is left out
/// until the intended path is confirmed against the live schema.
const IDENTITY_PATHS: &[(&str, &[&str])] = &[(".lq.Lobby.oauth2Login", &["account_id"])];

/// Decoding client over one captured wire session.
///
/// One client tracks one logical session: the account identity it observes
/// is set once and every later identity-bearing message must agree with it.
#[derive(Debug)]
pub struct ChannelClient<S: CaptureSource> {
    source: S,
    put_back: Vec<Message>,
    account_id: Option<i64>,
    registry: &'static SchemaRegistry,
}

impl<S: CaptureSource> ChannelClient<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            put_back: Vec::new(),
            account_id: None,
            registry: SchemaRegistry::global(),
        }
    }

    /// Pop the next message, waiting up to `timeout` for the live channel.
    ///
    /// A zero timeout returns `None` without any blocking attempt. Put-back
    /// messages are replayed first, newest first, without re-decoding.
    pub async fn dequeue(&mut self, timeout: Duration) -> Result<Option<Message>> {
        if timeout.is_zero() {
            return Ok(None);
        }
        if let Some(message) = self.put_back.pop() {
            trace!(name = %message.name, "replaying put-back message");
            return Ok(Some(message));
        }
        let Some(captured) = self.source.pop(timeout).await? else {
            return Ok(None);
        };
        self.decode(captured).map(Some)
    }

    /// Un-consume a message; the next dequeue returns it before the live
    /// channel is touched.
    pub fn put_back(&mut self, message: Message) {
        self.put_back.push(message);
    }

    /// Session account identity, once an identity-bearing message has been
    /// observed.
    pub fn account_id(&self) -> Option<i64> {
        self.account_id
    }

    fn decode(&mut self, captured: CapturedFrame) -> Result<Message> {
        let envelope = frame::split_request(&captured.request)?;
        let response_payload = match &captured.response {
            None => None,
            Some(bytes) => Some(frame::split_response(bytes)?),
        };

        let schema = self.registry.lookup(&envelope.name).ok_or_else(|| {
            PilotError::SchemaGap { name: envelope.name.clone(), raw: envelope.data.clone() }
        })?;
        let request = crate::schema::decode_message(schema.request, &envelope.data)?;
        let response = match response_payload {
            None => None,
            Some(payload) => {
                let descriptor = schema.response.ok_or_else(|| PilotError::SchemaGap {
                    name: envelope.name.clone(),
                    raw: payload.clone(),
                })?;
                Some(crate::schema::decode_message(descriptor, &payload)?)
            }
        };

        self.observe_identity(&envelope.name, response.as_ref())?;

        debug!(name = %envelope.name, direction = %captured.direction, "decoded message");
        Ok(Message {
            direction: captured.direction,
            name: envelope.name,
            request,
            response,
            timestamp: captured.timestamp,
        })
    }

    /// Extract and check the account id when `name` is identity-bearing.
    /// The identity field is only written after every check has passed, so
    /// a failing message leaves the session identity untouched.
    fn observe_identity(
        &mut self,
        name: &str,
        response: Option<&Map<String, Value>>,
    ) -> Result<()> {
        let Some((_, path)) = IDENTITY_PATHS.iter().find(|(candidate, _)| *candidate == name)
        else {
            return Ok(());
        };

        let response = response.ok_or_else(|| {
            PilotError::decode(format!("{name}: identity-bearing message without a response"))
        })?;

        let mut value = &Value::Null;
        let mut scope: &Map<String, Value> = response;
        for (index, key) in path.iter().enumerate() {
            value = scope.get(*key).ok_or_else(|| {
                PilotError::decode(format!("{name}: missing identity key '{key}'"))
            })?;
            if index + 1 < path.len() {
                scope = value.as_object().ok_or_else(|| {
                    PilotError::decode(format!("{name}: identity key '{key}' is not a mapping"))
                })?;
            }
        }
        let observed = value.as_i64().ok_or_else(|| {
            PilotError::decode(format!("{name}: identity value is not an integer"))
        })?;

        match self.account_id {
            None => {
                info!(account_id = observed, "session identity established");
                self.account_id = Some(observed);
            }
            Some(established) if established == observed => {}
            Some(established) => {
                return Err(PilotError::IdentityConflict { established, observed });
            }
        }
        Ok(())
    }
}
