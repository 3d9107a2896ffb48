//! Protocol-aware automation core for a web mahjong client.
//!
//! Tilepilot navigates the game client by combining two signals: decoded
//! wire traffic, captured out-of-band by a sidecar process, and visual
//! markers matched against browser screenshots. The channel side turns raw
//! captured frames into schema-typed records; the presentation side holds
//! the automation's belief about which screen is displayed and only
//! advances it when protocol and pixels agree.
//!
//! # Features
//!
//! - **Typed capture decoding**: tagged frames to structured records via a
//!   compiled-in schema registry, with session-identity tracking
//! - **Lookahead**: per-client put-back stack for un-consuming messages
//! - **Screen state machines**: visual confirmation plus protocol settling
//!   behind a single deadline, with screenshot-carrying errors
//! - **Replayable**: run the same navigation against a live sidecar or a
//!   recorded capture dump
//!
//! # Example (replaying a capture dump)
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tilepilot::Tilepilot;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> tilepilot::Result<()> {
//!     let mut channel = Tilepilot::open("session.jsonl")?;
//!     while let Some(message) = channel.dequeue(Duration::from_secs(1)).await? {
//!         println!("{} {}", message.direction, message.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod capture;
pub mod channel;
mod error;
pub mod presentation;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod vision;

pub use browser::{Browser, Screenshot};
pub use capture::{CaptureSource, CapturedFrame, Direction, ReplaySource, SidecarSource};
pub use channel::{ChannelClient, Message};
pub use error::{PilotError, Result};
pub use presentation::{
    HomePresentation, Presentation, Rig, RoomHostPresentation, Screen, SharedRig,
};
pub use schema::SchemaRegistry;
pub use vision::{MatchPoint, Template, TemplateStore};

/// Unified entry point for capture channels.
///
/// Both constructors yield a [`ChannelClient`] over the chosen source; the
/// presentation layer takes the client from there.
pub struct Tilepilot;

impl Tilepilot {
    /// Connect to a running capture sidecar.
    pub async fn connect<A: tokio::net::ToSocketAddrs>(
        addr: A,
    ) -> Result<ChannelClient<SidecarSource>> {
        Ok(ChannelClient::new(SidecarSource::connect(addr).await?))
    }

    /// Open a recorded capture dump for offline replay.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<ChannelClient<ReplaySource>> {
        Ok(ChannelClient::new(ReplaySource::open(path)?))
    }
}
