//! Session Events
//!
//! Event-based communication with the single UI subscriber. Events are
//! emitted at key points:
//! - Transport changes (play/pause, track loaded or failed)
//! - Queue edits
//! - Position updates (periodic while playing, and after every seek)
//! - Presentation updates for notification surfaces

use crate::types::NowPlaying;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Label shown for the current track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackLabel {
    /// Track loaded; its display name
    Name(String),

    /// Track failed; the message to show in its place
    Error(String),
}

/// Events emitted by the session controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Position update
    Progress {
        /// Current playback position
        position_ms: u64,
        /// Duration of the loaded track (0 when unknown)
        duration_ms: u64,
    },

    /// A track was loaded, or failed to load
    FileChanged {
        /// Track index in natural order
        track_index: usize,
        label: TrackLabel,
    },

    /// Output started or stopped
    PlaybackStateChanged { is_playing: bool },

    /// Human-readable failure description
    Error { message: String },

    /// Queue contents or cursor changed
    QueueChanged { queue: Vec<usize>, cursor: usize },

    /// Presentation surface should show or refresh this entry
    Presented(NowPlaying),

    /// Presentation surface should be removed
    Dismissed,
}

/// Delivers events to at most one subscriber
///
/// Events emitted while nobody is subscribed are dropped. A subscriber whose
/// receiver was dropped is detached on the next emit.
#[derive(Debug, Default)]
pub struct Notifier {
    subscriber: Option<UnboundedSender<SessionEvent>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new subscriber, replacing any previous one
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.subscriber.replace(tx).is_some() {
            debug!("Replacing previous session subscriber");
        }
        rx
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Send `event` to the subscriber, if any
    pub fn emit(&mut self, event: SessionEvent) {
        let Some(tx) = &self.subscriber else {
            return;
        };

        if tx.send(event).is_err() {
            debug!("Session subscriber went away, detaching");
            self.subscriber = None;
        }
    }
}
