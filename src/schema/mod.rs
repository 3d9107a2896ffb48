//! Protocol schema registry.
//!
//! Maps dotted protocol names to the descriptors used to decode their
//! payloads: `method name -> (request shape, response shape)` for service
//! calls and `type name -> (shape, none)` for server-push notifications.
//! Built exactly once from the embedded tables in [`catalog`] and never
//! mutated afterwards; repeated [`SchemaRegistry::global`] calls return the
//! same instance.

mod catalog;
mod wire;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{PilotError, Result};

pub(crate) use catalog::WRAPPER;
pub(crate) use wire::{WIRE_LEN, WireReader, decode_message};

/// Shape of one wire message: its protocol name and ordered fields.
#[derive(Debug)]
pub struct MessageDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    pub(crate) fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// One field of a message: wire number, protocol identifier, value shape.
#[derive(Debug)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: &'static str,
    pub kind: FieldKind,
    pub repeated: bool,
}

/// Value shape of a field.
#[derive(Debug)]
pub enum FieldKind {
    Uint32,
    Bool,
    String,
    Bytes,
    Message(&'static MessageDescriptor),
}

/// Decoding schemas for one registered protocol name.
#[derive(Debug)]
pub struct MethodSchema {
    pub request: &'static MessageDescriptor,
    pub response: Option<&'static MessageDescriptor>,
}

/// Immutable name-to-descriptor table for the known protocol surface.
#[derive(Debug)]
pub struct SchemaRegistry {
    entries: HashMap<&'static str, MethodSchema>,
}

impl SchemaRegistry {
    /// Shared registry instance, built on first use.
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            SchemaRegistry::build().expect("embedded schema tables are inconsistent")
        })
    }

    fn build() -> Result<Self> {
        let mut entries = HashMap::new();
        for &(name, request, response) in catalog::LOBBY_METHODS {
            validate_descriptor(request)?;
            validate_descriptor(response)?;
            let entry = MethodSchema { request, response: Some(response) };
            if entries.insert(name, entry).is_some() {
                return Err(PilotError::decode(format!("duplicate registry entry: {name}")));
            }
        }
        for &(name, shape) in catalog::NOTIFY_TYPES {
            validate_descriptor(shape)?;
            if entries.insert(name, MethodSchema { request: shape, response: None }).is_some() {
                return Err(PilotError::decode(format!("duplicate registry entry: {name}")));
            }
        }
        Ok(Self { entries })
    }

    /// Look up the schemas for a protocol name.
    pub fn lookup(&self, name: &str) -> Option<&MethodSchema> {
        self.entries.get(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty. Always false for the global instance.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_descriptor(descriptor: &MessageDescriptor) -> Result<()> {
    let mut seen = Vec::with_capacity(descriptor.fields.len());
    for field in descriptor.fields {
        if field.number == 0 {
            return Err(PilotError::decode(format!(
                "{}: field '{}' uses reserved number 0",
                descriptor.name, field.name
            )));
        }
        if seen.contains(&field.number) {
            return Err(PilotError::decode(format!(
                "{}: duplicate field number {}",
                descriptor.name, field.number
            )));
        }
        seen.push(field.number);
        if let FieldKind::Message(inner) = field.kind {
            validate_descriptor(inner)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_registry_builds_and_is_idempotent() {
        let first = SchemaRegistry::global();
        let second = SchemaRegistry::global();
        assert!(std::ptr::eq(first, second));
        assert!(!first.is_empty());
    }

    #[test]
    fn service_methods_have_response_schemas() {
        let registry = SchemaRegistry::global();
        let heatbeat = registry.lookup(".lq.Lobby.heatbeat").unwrap();
        assert!(heatbeat.response.is_some());

        let login = registry.lookup(".lq.Lobby.oauth2Login").unwrap();
        let response = login.response.unwrap();
        assert!(response.fields.iter().any(|f| f.name == "account_id"));
    }

    #[test]
    fn notifications_have_no_response_schema() {
        let registry = SchemaRegistry::global();
        let notify = registry.lookup(".lq.NotifyAccountUpdate").unwrap();
        assert!(notify.response.is_none());
    }

    #[test]
    fn unknown_names_miss() {
        assert!(SchemaRegistry::global().lookup(".lq.Lobby.fetchNothing").is_none());
    }
}
