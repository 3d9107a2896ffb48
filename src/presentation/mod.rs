//! Screen presentations.
//!
//! A presentation is the automation's current belief about which game
//! screen is displayed. While it is live it has exclusive use of the
//! browser, the template store and the message channel; a successful
//! transition to another screen constructs the successor first, then
//! permanently retires the old handle. Calls on a retired handle fail with
//! [`PilotError::Stale`] instead of racing the successor for the
//! collaborators.

mod home;
mod room;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::Browser;
use crate::capture::CaptureSource;
use crate::channel::ChannelClient;
use crate::vision::TemplateStore;
use crate::{PilotError, Result};

pub use home::HomePresentation;
pub use room::RoomHostPresentation;

/// The collaborators one automation session drives: browser, decoded
/// message channel, template store.
#[derive(Debug)]
pub struct Rig<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    pub browser: B,
    pub channel: ChannelClient<S>,
    pub templates: T,
}

impl<B, S, T> Rig<B, S, T>
where
    B: Browser,
    S: CaptureSource,
    T: TemplateStore,
{
    pub fn new(browser: B, channel: ChannelClient<S>, templates: T) -> Self {
        Self { browser, channel, templates }
    }

    /// Wrap the rig for use by a presentation chain. Single-threaded
    /// shared ownership: presentations hand the rig from one generation to
    /// the next without moving it.
    pub fn share(self) -> SharedRig<B, S, T> {
        Rc::new(RefCell::new(self))
    }
}

/// Shared handle to the session's collaborators.
pub type SharedRig<B, S, T> = Rc<RefCell<Rig<B, S, T>>>;

/// Kinds of screens the automation can hold a belief about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    RoomHost,
}

/// Common surface of every screen presentation.
pub trait Presentation {
    /// Which screen this presentation believes is displayed.
    fn screen(&self) -> Screen;

    /// Guard invoked at the top of every operation: fails once this
    /// presentation has been superseded by a transition.
    fn assert_live(&self) -> Result<()>;
}

/// Generation stamp tying a presentation to the session's live chain.
///
/// All presentations of one session share the `current` cell; a handle is
/// live while its own generation still equals the shared value. Committing
/// a successor bumps the shared value, retiring every earlier handle at
/// once.
#[derive(Debug)]
pub(crate) struct Lineage {
    current: Rc<Cell<u64>>,
    generation: u64,
}

impl Lineage {
    /// Start a new chain; the root generation is live immediately.
    pub(crate) fn root() -> Self {
        Self { current: Rc::new(Cell::new(0)), generation: 0 }
    }

    /// Stamp for the next presentation in this chain. Not live until
    /// [`Lineage::commit`] is called on it.
    pub(crate) fn successor(&self) -> Self {
        Self { current: Rc::clone(&self.current), generation: self.generation + 1 }
    }

    /// Make this generation the live one, retiring all predecessors.
    pub(crate) fn commit(&self) {
        self.current.set(self.generation);
    }

    pub(crate) fn assert_live(&self) -> Result<()> {
        if self.current.get() == self.generation { Ok(()) } else { Err(PilotError::Stale) }
    }
}

/// Time left until `deadline`, clamped at zero.
pub(crate) fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_lineage_is_live() {
        let root = Lineage::root();
        assert!(root.assert_live().is_ok());
    }

    #[test]
    fn committing_a_successor_retires_the_predecessor() {
        let root = Lineage::root();
        let next = root.successor();

        // Until the successor commits, the old handle stays live.
        assert!(root.assert_live().is_ok());
        assert!(next.assert_live().is_err());

        next.commit();
        assert!(matches!(root.assert_live(), Err(PilotError::Stale)));
        assert!(next.assert_live().is_ok());
    }

    #[test]
    fn chain_of_transitions_keeps_only_the_newest_live() {
        let first = Lineage::root();
        let second = first.successor();
        second.commit();
        let third = second.successor();
        third.commit();

        assert!(first.assert_live().is_err());
        assert!(second.assert_live().is_err());
        assert!(third.assert_live().is_ok());
    }
}
