//! Room host screen presentation.
//!
//! Reached from home via room creation. Confirmation and settling follow
//! the same contract as home, scoped to what the transition needs: the
//! room markers must all be visible and the creation acknowledgement must
//! arrive on the channel before the presentation counts as live.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{Lineage, Presentation, Rig, Screen, SharedRig, remaining};
use crate::browser::{Browser, Screenshot};
use crate::capture::CaptureSource;
use crate::vision::{Template, TemplateStore};
use crate::{PilotError, Result};

const MARKERS: [&str; 2] = ["template/room/marker0", "template/room/marker1"];
const ANCHOR: &str = "template/room/marker0";

const HEATBEAT: &str = ".lq.Lobby.heatbeat";
const CREATE_ROOM: &str = ".lq.Lobby.createRoom";

/// Delay between marker confirmation polls.
const CONFIRM_POLL: Duration = Duration::from_millis(200);

/// The automation's belief that the hosted-room screen is displayed.
#[derive(Debug)]
pub struct RoomHostPresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    rig: SharedRig<B, S, T>,
    lineage: Lineage,
    room_id: Option<u64>,
}

impl<B, S, T> RoomHostPresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    /// Wait for the room screen to finish loading in.
    pub(crate) async fn wait(rig: &SharedRig<B, S, T>, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        {
            let mut guard = rig.borrow_mut();
            let Rig { browser, templates, .. } = &mut *guard;
            let anchor = templates.open(ANCHOR, browser.zoom_ratio())?;
            anchor.wait_until(browser, deadline).await?;
        }

        loop {
            let screenshot = rig.borrow_mut().browser.screenshot().await?;
            if Self::confirm_markers(rig, &screenshot)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PilotError::Timeout { screenshot });
            }
            tokio::time::sleep(CONFIRM_POLL).await;
        }
    }

    /// Confirm the room belief and consume the creation acknowledgement.
    pub(crate) async fn settle(
        rig: SharedRig<B, S, T>,
        lineage: Lineage,
        timeout: Duration,
    ) -> Result<Self> {
        let deadline = Instant::now() + timeout;

        let screenshot = rig.borrow_mut().browser.screenshot().await?;
        if !Self::confirm_markers(&rig, &screenshot)? {
            return Err(PilotError::NotDetected { screen: "room", screenshot });
        }

        let room_id = Self::await_creation_ack(&rig, deadline, &screenshot).await?;
        info!(room_id, "room host presentation settled");
        Ok(Self { rig, lineage, room_id })
    }

    fn confirm_markers(rig: &SharedRig<B, S, T>, screenshot: &Screenshot) -> Result<bool> {
        let guard = rig.borrow();
        let zoom = guard.browser.zoom_ratio();
        for path in MARKERS {
            let marker = guard.templates.open(path, zoom)?;
            if !marker.matches(screenshot) {
                debug!(marker = path, "room marker not visible");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Consume channel traffic until the room-creation acknowledgement
    /// arrives. Heartbeats are skipped; anything else is a protocol
    /// inconsistency.
    async fn await_creation_ack(
        rig: &SharedRig<B, S, T>,
        deadline: Instant,
        screenshot: &Screenshot,
    ) -> Result<Option<u64>> {
        loop {
            let window = remaining(deadline);
            if window.is_zero() {
                return Err(PilotError::Timeout { screenshot: screenshot.clone() });
            }
            // Bind before matching so the rig borrow ends with the call.
            let popped = rig.borrow_mut().channel.dequeue(window).await?;
            let Some(message) = popped else {
                return Err(PilotError::Timeout { screenshot: screenshot.clone() });
            };
            match message.name.as_str() {
                HEATBEAT => {
                    info!(name = %message.name, "heartbeat while awaiting room ack");
                }
                CREATE_ROOM => {
                    let room_id = message
                        .response
                        .as_ref()
                        .and_then(|response| response.get("room"))
                        .and_then(|room| room.get("room_id"))
                        .and_then(Value::as_u64);
                    return Ok(room_id);
                }
                _ => {
                    return Err(PilotError::Inconsistent {
                        name: message.name,
                        screenshot: screenshot.clone(),
                    });
                }
            }
        }
    }

    /// Make this presentation the live one, retiring its predecessor.
    pub(crate) fn adopt(&self) {
        self.lineage.commit();
    }

    /// Room number reported by the creation acknowledgement, if the
    /// response carried one.
    pub fn room_id(&self) -> Option<u64> {
        self.room_id
    }

    /// Shared collaborators, for the next transition in the chain.
    #[allow(dead_code)]
    pub(crate) fn rig(&self) -> &SharedRig<B, S, T> {
        &self.rig
    }
}

impl<B, S, T> Presentation for RoomHostPresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    fn screen(&self) -> Screen {
        Screen::RoomHost
    }

    fn assert_live(&self) -> Result<()> {
        self.lineage.assert_live()
    }
}
