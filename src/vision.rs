//! Template-matching boundary.
//!
//! Pixel correlation itself lives outside this crate. [`Template`] exposes
//! the scores and match decisions the navigation code consumes, plus two
//! provided behaviors built only on those primitives: waiting for a target
//! to appear ([`Template::wait_until`]) and clicking its best match
//! ([`Template::click`]). Implementations supply the matching engine;
//! the polling and deadline arithmetic stay here.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::browser::{Browser, Screenshot};
use crate::{PilotError, Result};

/// Delay between screenshot checks while polling for a visual target.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Location and score of the best correlation found for a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPoint {
    pub x: u32,
    pub y: u32,
    pub score: f64,
}

/// One visual target, already scaled to the browser's zoom ratio.
#[async_trait::async_trait]
pub trait Template: Send + Sync {
    /// Whether the template is present in the screenshot.
    fn matches(&self, screenshot: &Screenshot) -> bool;

    /// Best correlation over the whole screenshot, regardless of threshold.
    fn best_match(&self, screenshot: &Screenshot) -> MatchPoint;

    /// Minimum score at which a correlation counts as a detection.
    fn threshold(&self) -> f64;

    /// Template width in viewport pixels.
    fn width(&self) -> u32;

    /// Template height in viewport pixels.
    fn height(&self) -> u32;

    /// Poll screenshots until the template is visible or the deadline
    /// lapses. The lapse is fatal and carries the last screenshot.
    async fn wait_until(&self, browser: &mut dyn Browser, deadline: Instant) -> Result<()> {
        loop {
            let screenshot = browser.screenshot().await?;
            if self.matches(&screenshot) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PilotError::Timeout { screenshot });
            }
            trace!("target not visible yet, polling again");
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Click the template's best match in the current viewport.
    async fn click(&self, browser: &mut dyn Browser) -> Result<()> {
        let screenshot = browser.screenshot().await?;
        let point = self.best_match(&screenshot);
        browser.click_region(point.x, point.y, self.width(), self.height()).await
    }
}

/// Source of templates, keyed by logical path.
///
/// `open` scales the stored image by the given zoom ratio so match
/// coordinates line up with the live viewport.
pub trait TemplateStore: Send {
    type Template: Template;

    fn open(&self, path: &str, zoom_ratio: f64) -> Result<Self::Template>;
}
