//! Home screen presentation.
//!
//! Home is confirmed visually (every marker template must match) and then
//! settled against the protocol: right after the screen appears the client
//! fires a burst of background lobby calls, and the presentation is not
//! ready until that burst has been validated and drained. Both phases of
//! the settling machine run once, during construction, against a single
//! overall deadline.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::room::RoomHostPresentation;
use super::{Lineage, Presentation, Rig, Screen, SharedRig, remaining};
use crate::browser::{Browser, Screenshot};
use crate::capture::CaptureSource;
use crate::vision::{Template, TemplateStore};
use crate::{PilotError, Result};

/// Markers that must all match for the screen to count as home.
const MARKERS: [&str; 3] =
    ["template/home/marker1", "template/home/marker2", "template/home/marker3"];

/// Anchor marker that shows first while home is still loading in.
const ANCHOR: &str = "template/home/marker0";

/// The friendly-match entry point; also the third home marker, so it is
/// guaranteed visible on a confirmed home screen.
const FRIENDLY_MATCH: &str = "template/home/marker3";

const CREATE_ROOM_BUTTON: &str = "template/home/create_room";
const CREATE_CONFIRM: &str = "template/home/room_creation/create";
const NOTIFICATION_CLOSE: &str = "template/home/notification_close";
const EVENT_CLOSE: &str = "template/home/event_close";

const HEATBEAT: &str = ".lq.Lobby.heatbeat";

/// Peek window after a daily-task fetch, probing whether the login burst
/// is over.
const LOOKAHEAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-call window while draining best-effort chatter in phase two.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Pause after dismissing an overlay so the UI can settle.
const DISMISS_PAUSE: Duration = Duration::from_secs(1);

/// Delay between marker confirmation polls.
const CONFIRM_POLL: Duration = Duration::from_millis(200);

/// What a message name means during the login burst (phase one).
enum LoginChatter {
    /// Recognized background call: log and move on.
    Benign,
    /// Login heartbeat; the second one ends the phase.
    LoginBeat,
    /// Daily-task fetch: probe whether the burst is already over.
    DailyTask,
}

fn login_chatter(name: &str) -> Option<LoginChatter> {
    match name {
        ".lq.Lobby.heatbeat"
        | ".lq.NotifyAccountUpdate"
        | ".lq.NotifyShopUpdate"
        | ".lq.Lobby.oauth2Auth"
        | ".lq.Lobby.oauth2Check"
        | ".lq.NotifyNewMail"
        | ".lq.Lobby.oauth2Login"
        | ".lq.Lobby.fetchLastPrivacy"
        | ".lq.Lobby.fetchServerTime"
        | ".lq.Lobby.fetchServerSettings"
        | ".lq.Lobby.fetchConnectionInfo"
        | ".lq.Lobby.fetchClientValue"
        | ".lq.Lobby.fetchFriendList"
        | ".lq.Lobby.fetchFriendApplyList"
        | ".lq.Lobby.fetchRecentFriend"
        | ".lq.Lobby.fetchMailInfo"
        | ".lq.Lobby.fetchReviveCoinInfo"
        | ".lq.Lobby.fetchTitleList"
        | ".lq.Lobby.fetchBagInfo"
        | ".lq.Lobby.fetchShopInfo"
        | ".lq.Lobby.fetchShopInterval"
        | ".lq.Lobby.fetchActivityList"
        | ".lq.Lobby.fetchAccountActivityData"
        | ".lq.Lobby.fetchActivityInterval"
        | ".lq.Lobby.fetchActivityBuff"
        | ".lq.Lobby.fetchVipReward"
        | ".lq.Lobby.fetchMonthTicketInfo"
        | ".lq.Lobby.fetchAchievement"
        | ".lq.Lobby.fetchSelfGamePointRank"
        | ".lq.Lobby.fetchCommentSetting"
        | ".lq.Lobby.fetchAccountSettings"
        | ".lq.Lobby.fetchModNicknameTime"
        | ".lq.Lobby.fetchMisc"
        | ".lq.Lobby.fetchAnnouncement"
        | ".lq.Lobby.fetchRollingNotice"
        | ".lq.Lobby.loginSuccess"
        | ".lq.Lobby.fetchCharacterInfo"
        | ".lq.Lobby.fetchAllCommonViews"
        | ".lq.Lobby.fetchCollectedGameRecordList" => Some(LoginChatter::Benign),
        ".lq.Lobby.loginBeat" => Some(LoginChatter::LoginBeat),
        ".lq.Lobby.fetchDailyTask" => Some(LoginChatter::DailyTask),
        _ => None,
    }
}

/// What a message name means while draining trailing chatter (phase two).
enum DrainChatter {
    Benign,
    DailyTask,
}

fn drain_chatter(name: &str) -> Option<DrainChatter> {
    match name {
        ".lq.Lobby.heatbeat"
        | ".lq.Lobby.updateClientValue"
        | ".lq.NotifyAccountUpdate"
        | ".lq.NotifyAnnouncementUpdate"
        | ".lq.Lobby.readAnnouncement"
        | ".lq.Lobby.doActivitySignIn" => Some(DrainChatter::Benign),
        ".lq.Lobby.fetchDailyTask" => Some(DrainChatter::DailyTask),
        _ => None,
    }
}

/// The automation's belief that the home screen is displayed.
#[derive(Debug)]
pub struct HomePresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    rig: SharedRig<B, S, T>,
    lineage: Lineage,
}

impl<B, S, T> HomePresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    /// Confirm that home is displayed and settle the login burst, starting
    /// a new presentation chain.
    ///
    /// Fails with [`PilotError::NotDetected`] if the current screenshot is
    /// not home; navigating *to* home is the operator's job, not this
    /// crate's.
    pub async fn enter(rig: SharedRig<B, S, T>, timeout: Duration) -> Result<Self> {
        Self::settle(rig, Lineage::root(), timeout).await
    }

    pub(crate) async fn settle(
        rig: SharedRig<B, S, T>,
        lineage: Lineage,
        timeout: Duration,
    ) -> Result<Self> {
        let deadline = Instant::now() + timeout;

        let screenshot = rig.borrow_mut().browser.screenshot().await?;
        if !Self::confirm_markers(&rig, &screenshot)? {
            return Err(PilotError::NotDetected { screen: "home", screenshot });
        }
        debug!("home markers confirmed, settling login chatter");

        Self::settle_login_burst(&rig, deadline, &screenshot).await?;
        Self::drain_trailing_chatter(&rig, &screenshot).await?;

        info!("home presentation settled");
        Ok(Self { rig, lineage })
    }

    /// Wait for home to finish loading in, dismissing any overlays that
    /// cover the markers, until full confirmation or the deadline lapses.
    pub async fn wait(rig: &SharedRig<B, S, T>, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        {
            let mut guard = rig.borrow_mut();
            let Rig { browser, templates, .. } = &mut *guard;
            let anchor = templates.open(ANCHOR, browser.zoom_ratio())?;
            anchor.wait_until(browser, deadline).await?;
        }

        let screenshot = rig.borrow_mut().browser.screenshot().await?;
        if Self::confirm_markers(rig, &screenshot)? {
            return Ok(());
        }

        Self::dismiss_overlays(rig, deadline).await?;

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

    /// Whether every home marker matches the screenshot. Short-circuits on
    /// the first miss.
    fn confirm_markers(rig: &SharedRig<B, S, T>, screenshot: &Screenshot) -> Result<bool> {
        let guard = rig.borrow();
        let zoom = guard.browser.zoom_ratio();
        for path in MARKERS {
            let marker = guard.templates.open(path, zoom)?;
            if !marker.matches(screenshot) {
                debug!(marker = path, "home marker not visible");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Phase one: validate the login burst until the second login beat, or
    /// until a daily-task probe shows the stream already went quiet.
    async fn settle_login_burst(
        rig: &SharedRig<B, S, T>,
        deadline: Instant,
        screenshot: &Screenshot,
    ) -> Result<()> {
        let mut login_beats = 0u32;
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
            match login_chatter(&message.name) {
                Some(LoginChatter::Benign) => {
                    info!(name = %message.name, "login chatter");
                }
                Some(LoginChatter::LoginBeat) => {
                    info!(name = %message.name, beats = login_beats + 1, "login beat");
                    login_beats += 1;
                    if login_beats == 2 {
                        return Ok(());
                    }
                }
                Some(LoginChatter::DailyTask) => {
                    info!(name = %message.name, "daily task fetch, probing for quiet");
                    if Self::stream_went_quiet(rig).await? {
                        return Ok(());
                    }
                }
                None => {
                    return Err(PilotError::Inconsistent {
                        name: message.name,
                        screenshot: screenshot.clone(),
                    });
                }
            }
        }
    }

    /// Probe the channel after a daily-task fetch. Heartbeats are
    /// discarded; anything else is pushed back for the settling loop to
    /// judge. Returns true when the peek window closes empty.
    async fn stream_went_quiet(rig: &SharedRig<B, S, T>) -> Result<bool> {
        loop {
            let peeked = rig.borrow_mut().channel.dequeue(LOOKAHEAD_TIMEOUT).await?;
            match peeked {
                None => return Ok(true),
                Some(message) if message.name == HEATBEAT => {
                    info!(name = %message.name, "discarding trailing heartbeat");
                }
                Some(message) => {
                    rig.borrow_mut().channel.put_back(message);
                    return Ok(false);
                }
            }
        }
    }

    /// Phase two: drain best-effort chatter with a short per-call window.
    /// An empty window with nothing special pending means settling is done.
    async fn drain_trailing_chatter(
        rig: &SharedRig<B, S, T>,
        screenshot: &Screenshot,
    ) -> Result<()> {
        loop {
            let popped = rig.borrow_mut().channel.dequeue(DRAIN_TIMEOUT).await?;
            let Some(message) = popped else {
                return Ok(());
            };
            match drain_chatter(&message.name) {
                Some(DrainChatter::Benign) => {
                    info!(name = %message.name, "trailing chatter");
                }
                Some(DrainChatter::DailyTask) => {
                    info!(name = %message.name, "daily task fetch while draining");
                    let peeked = rig.borrow_mut().channel.dequeue(LOOKAHEAD_TIMEOUT).await?;
                    match peeked {
                        None => return Ok(()),
                        Some(next) => rig.borrow_mut().channel.put_back(next),
                    }
                }
                None => {
                    return Err(PilotError::Inconsistent {
                        name: message.name,
                        screenshot: screenshot.clone(),
                    });
                }
            }
        }
    }

    /// Click the first overlay-dismiss target whose score clears its
    /// threshold, pause, and rescan; stop once neither overlay is
    /// detected.
    async fn dismiss_overlays(rig: &SharedRig<B, S, T>, deadline: Instant) -> Result<()> {
        let mut guard = rig.borrow_mut();
        let Rig { browser, templates, .. } = &mut *guard;
        let zoom = browser.zoom_ratio();
        let overlays =
            [templates.open(NOTIFICATION_CLOSE, zoom)?, templates.open(EVENT_CLOSE, zoom)?];

        'scan: loop {
            let screenshot = browser.screenshot().await?;
            if Instant::now() > deadline {
                return Err(PilotError::Timeout { screenshot });
            }
            for overlay in &overlays {
                let point = overlay.best_match(&screenshot);
                if point.score >= overlay.threshold() {
                    debug!(score = point.score, "dismissing overlay");
                    browser
                        .click_region(point.x, point.y, overlay.width(), overlay.height())
                        .await?;
                    tokio::time::sleep(DISMISS_PAUSE).await;
                    continue 'scan;
                }
            }
            return Ok(());
        }
    }

    /// Drive the room-creation click sequence and hand the session over to
    /// the resulting room-host presentation. On success this handle is
    /// permanently superseded.
    pub async fn create_room(
        &mut self,
        timeout: Duration,
    ) -> Result<RoomHostPresentation<B, S, T>> {
        self.assert_live()?;
        let deadline = Instant::now() + timeout;

        {
            let mut guard = self.rig.borrow_mut();
            let Rig { browser, templates, .. } = &mut *guard;
            let zoom = browser.zoom_ratio();

            let friendly = templates.open(FRIENDLY_MATCH, zoom)?;
            friendly.click(browser).await?;

            let create_room = templates.open(CREATE_ROOM_BUTTON, zoom)?;
            create_room.wait_until(browser, deadline).await?;
            create_room.click(browser).await?;

            let confirm = templates.open(CREATE_CONFIRM, zoom)?;
            confirm.wait_until(browser, deadline).await?;
            confirm.click(browser).await?;
        }

        RoomHostPresentation::wait(&self.rig, remaining(deadline)).await?;
        let room = RoomHostPresentation::settle(
            Rc::clone(&self.rig),
            self.lineage.successor(),
            remaining(deadline),
        )
        .await?;
        room.adopt();
        Ok(room)
    }
}

impl<B, S, T> Presentation for HomePresentation<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    fn screen(&self) -> Screen {
        Screen::Home
    }

    fn assert_live(&self) -> Result<()> {
        self.lineage.assert_live()
    }
}
