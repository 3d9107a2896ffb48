//! Message channel: captured frames in, schema-typed records out.

mod client;
mod frame;
mod message;

pub use client::ChannelClient;
pub use message::Message;
