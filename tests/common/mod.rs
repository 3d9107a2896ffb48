//! Shared fixtures for integration tests: frame encoders, a stageable
//! capture source, and scripted browser/template fakes.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tilepilot::{
    Browser, CaptureSource, CapturedFrame, Direction, MatchPoint, Result, Screenshot, Template,
    TemplateStore,
};

/// Route settling logs through a subscriber when `RUST_LOG` asks for them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// --- frame encoding -----------------------------------------------------

pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn field_varint(number: u32, value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(u64::from(number) << 3, &mut out);
    encode_varint(value, &mut out);
    out
}

pub fn field_bytes(number: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(u64::from(number) << 3 | 2, &mut out);
    encode_varint(payload.len() as u64, &mut out);
    out.extend_from_slice(payload);
    out
}

pub fn wrapper(name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = field_bytes(1, name.as_bytes());
    out.extend(field_bytes(2, data));
    out
}

pub fn oneway_frame(name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = vec![1u8];
    out.extend(wrapper(name, data));
    out
}

pub fn paired_frame(sequence: u16, name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = vec![2u8];
    out.extend(sequence.to_be_bytes());
    out.extend(wrapper(name, data));
    out
}

pub fn response_frame(data: &[u8]) -> Vec<u8> {
    let mut out = vec![3u8];
    out.extend(wrapper("", data));
    out
}

pub fn captured(
    direction: Direction,
    request: Vec<u8>,
    response: Option<Vec<u8>>,
) -> CapturedFrame {
    CapturedFrame {
        direction,
        request,
        response,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

/// Fire-and-forget capture for a named call with an empty payload.
pub fn chatter(name: &str) -> CapturedFrame {
    captured(Direction::Outbound, oneway_frame(name, &[]), None)
}

/// Room-creation acknowledgement carrying the given room number.
pub fn create_room_ack(room_id: u64) -> CapturedFrame {
    let room = field_varint(1, room_id);
    captured(
        Direction::Outbound,
        paired_frame(42, ".lq.Lobby.createRoom", &field_varint(1, 4)),
        Some(response_frame(&field_bytes(2, &room))),
    )
}

/// The login burst a freshly shown home screen produces.
pub fn login_settle_stream() -> Vec<CapturedFrame> {
    vec![
        chatter(".lq.Lobby.heatbeat"),
        chatter(".lq.Lobby.fetchMailInfo"),
        chatter(".lq.Lobby.loginBeat"),
        chatter(".lq.Lobby.fetchBagInfo"),
        chatter(".lq.Lobby.loginBeat"),
    ]
}

// --- capture source -----------------------------------------------------

/// Capture source over a shared queue, so tests can stage more traffic
/// after a presentation has settled. Pops never block: an empty queue
/// reports an empty window immediately.
#[derive(Clone, Debug)]
pub struct SharedSource {
    queue: Arc<Mutex<VecDeque<CapturedFrame>>>,
}

impl SharedSource {
    pub fn new(frames: Vec<CapturedFrame>) -> Self {
        Self { queue: Arc::new(Mutex::new(frames.into())) }
    }

    /// Append traffic for the navigation code to find on its next pop.
    pub fn push(&self, frame: CapturedFrame) {
        self.queue.lock().unwrap().push_back(frame);
    }
}

#[async_trait::async_trait]
impl CaptureSource for SharedSource {
    async fn pop(&mut self, timeout: Duration) -> Result<Option<CapturedFrame>> {
        if timeout.is_zero() {
            return Ok(None);
        }
        Ok(self.queue.lock().unwrap().pop_front())
    }
}

// --- browser and templates ----------------------------------------------

/// Browser fake that renders the current screen label as its screenshot
/// and advances through a scripted list of screens, one per click.
#[derive(Debug)]
pub struct FakeBrowser {
    screen: &'static str,
    transitions: VecDeque<&'static str>,
    pub clicks: Vec<(u32, u32, u32, u32)>,
}

impl FakeBrowser {
    pub fn showing(screen: &'static str) -> Self {
        Self { screen, transitions: VecDeque::new(), clicks: Vec::new() }
    }

    pub fn with_transitions(screen: &'static str, transitions: Vec<&'static str>) -> Self {
        Self { screen, transitions: transitions.into(), clicks: Vec::new() }
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn screenshot(&mut self) -> Result<Screenshot> {
        Ok(Screenshot::new(self.screen.as_bytes().to_vec()))
    }

    async fn click_region(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        self.clicks.push((x, y, width, height));
        if let Some(next) = self.transitions.pop_front() {
            self.screen = next;
        }
        Ok(())
    }

    fn zoom_ratio(&self) -> f64 {
        1.0
    }
}

/// Template store keyed by logical path, where each template knows which
/// screen labels it is visible on.
#[derive(Debug)]
pub struct FakeTemplates {
    visible_on: HashMap<&'static str, &'static [&'static str]>,
}

impl FakeTemplates {
    pub fn new(entries: &[(&'static str, &'static [&'static str])]) -> Self {
        Self { visible_on: entries.iter().copied().collect() }
    }
}

impl TemplateStore for FakeTemplates {
    type Template = FakeTemplate;

    fn open(&self, path: &str, _zoom_ratio: f64) -> Result<FakeTemplate> {
        Ok(FakeTemplate { screens: self.visible_on.get(path).copied().unwrap_or(&[]) })
    }
}

pub struct FakeTemplate {
    screens: &'static [&'static str],
}

impl Template for FakeTemplate {
    fn matches(&self, screenshot: &Screenshot) -> bool {
        let label = std::str::from_utf8(screenshot.as_bytes()).unwrap_or("");
        self.screens.contains(&label)
    }

    fn best_match(&self, screenshot: &Screenshot) -> MatchPoint {
        let score = if self.matches(screenshot) { 1.0 } else { 0.0 };
        MatchPoint { x: 24, y: 18, score }
    }

    fn threshold(&self) -> f64 {
        0.8
    }

    fn width(&self) -> u32 {
        48
    }

    fn height(&self) -> u32 {
        20
    }
}

/// Standard template wiring for the home and room screens:
/// - all home markers are visible on `home`; the anchor marker also shows
///   through the notification overlay
/// - the overlay close button is visible only while the overlay is up
/// - the room-creation dialog buttons appear on their own screens
pub fn navigation_templates() -> FakeTemplates {
    FakeTemplates::new(&[
        ("template/home/marker0", &["home", "home_notice"]),
        ("template/home/marker1", &["home"]),
        ("template/home/marker2", &["home"]),
        ("template/home/marker3", &["home"]),
        ("template/home/notification_close", &["home_notice"]),
        ("template/home/event_close", &[]),
        ("template/home/create_room", &["friendly_menu"]),
        ("template/home/room_creation/create", &["create_dialog"]),
        ("template/room/marker0", &["room"]),
        ("template/room/marker1", &["room"]),
    ])
}

/// Same wiring with one home marker never matching, for confirmation
/// tests.
pub fn templates_missing_one_marker() -> FakeTemplates {
    FakeTemplates::new(&[
        ("template/home/marker0", &["home", "home_notice"]),
        ("template/home/marker1", &["home"]),
        ("template/home/marker2", &["home"]),
        ("template/home/marker3", &[]),
    ])
}
