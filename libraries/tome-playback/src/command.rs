//! Messages consumed by the session actor

use crate::error::Result;
use crate::events::SessionEvent;
use crate::types::SessionView;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tome_core::{Book, EngineEvent};

/// Listener commands
///
/// Fallible commands and queries carry a oneshot for the reply. Transport
/// commands never fail from the caller's point of view; failures surface
/// as [`SessionEvent::Error`].
#[derive(Debug)]
pub enum SessionCommand {
    LoadBook {
        book: Book,
        resume: bool,
        reply: oneshot::Sender<Result<bool>>,
    },
    Play,
    Pause,
    Stop,
    SeekTo(u64),
    Rewind,
    Forward,
    NextTrack,
    PreviousTrack,
    MoveToQueuePosition {
        position: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    ReorderQueue {
        from: usize,
        to: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    RemoveFromQueue {
        position: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    AddToQueue {
        track_index: usize,
        position: Option<usize>,
        reply: oneshot::Sender<Result<usize>>,
    },
    Subscribe {
        reply: oneshot::Sender<UnboundedReceiver<SessionEvent>>,
    },
    Unsubscribe,
    Inspect {
        reply: oneshot::Sender<SessionView>,
    },
}

/// Everything that can reach the session actor's inbox
///
/// Engine callbacks and ticker ticks carry the load epoch they were created
/// under; the controller discards them once the epoch has moved on.
#[derive(Debug)]
pub enum Inbound {
    Command(SessionCommand),
    Engine { epoch: u64, event: EngineEvent },
    Tick { epoch: u64, generation: u64 },

    /// Persist, release, and stop the actor; acknowledged when given a sender
    Shutdown(Option<oneshot::Sender<()>>),
}

impl From<SessionCommand> for Inbound {
    fn from(command: SessionCommand) -> Self {
        Self::Command(command)
    }
}
