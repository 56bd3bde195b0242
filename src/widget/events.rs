//! Typed lifecycle/action messages and the bus hosts subscribe to.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast::{Receiver, Sender};
use tracing::debug;

use crate::catalog::templates::Channel;
use crate::observability::metrics::get_metrics;
use crate::utils::channel;

static NEXT_SHARE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one widget instance within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShareId(u64);

impl ShareId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SHARE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    Social,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareEventKind {
    /// widget finished initializing
    Ready,
    /// a destination was opened
    Open { action: ShareAction, url: String },
    /// a URL was copied
    Copy { action: ShareAction, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEvent {
    pub share: ShareId,
    pub kind: ShareEventKind,
}

impl ShareEvent {
    pub fn name(&self) -> &'static str {
        match self.kind {
            ShareEventKind::Ready => "ready",
            ShareEventKind::Open { .. } => "open",
            ShareEventKind::Copy { .. } => "copy",
        }
    }
}

/// Broadcast bus for `ShareEvent`s. Clones share one channel, so a bus
/// handed to several widgets behaves like a page-level listener.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Sender<ShareEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { sender: channel::run() }
    }

    pub fn subscribe(&self) -> Receiver<ShareEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ShareEvent) {
        get_metrics().share_events.with_label_values(&[event.name()]).inc();
        let name = event.name();
        let _ = self.sender.send(event).map_err(|_| {
            debug!("no subscribers for '{}' event", name);
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// User interaction delivered by the host to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// a gift option (preset or custom) became checked
    GiftOptionChanged { value: String },
    /// the custom amount input changed
    CustomAmountChanged { value: String },
    /// the copy button was clicked
    CopyClicked,
    /// the URL box content was copied by the user
    UrlCopied,
    /// a channel action was clicked
    SocialClicked { channel: Channel },
    /// the email button was clicked
    EmailClicked,
    /// a click anywhere on the page
    DocumentClicked { inside_link: bool },
    /// a key press anywhere on the page
    DocumentKeyPressed { inside_link: bool },
}
