//! Session actor
//!
//! Runs one [`SessionController`] on its own tokio task. UI commands, engine
//! callbacks, and ticker wake-ups all arrive on the same channel and are
//! applied strictly in arrival order.
//!
//! Snapshot writes leave the actor through a [`QueuedStore`], so progress
//! ticks and queue edits never wait on the disk. Shutdown waits for every
//! queued write before acknowledging.

use crate::command::{Inbound, SessionCommand};
use crate::config::SessionConfig;
use crate::controller::SessionController;
use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::types::SessionView;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tome_core::{AudioEngine, Book, SessionStore};
use tome_storage::QueuedStore;
use tracing::{debug, warn};

/// Spawns session actors
pub struct SessionService;

impl SessionService {
    /// Start a session actor on the current tokio runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime
    pub fn spawn(
        engine: impl AudioEngine + 'static,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> SessionHandle {
        let store: Arc<dyn SessionStore> = match QueuedStore::spawn(Arc::clone(&store)) {
            Ok(queued) => Arc::new(queued),
            Err(e) => {
                warn!("Snapshot writer unavailable, writing inline: {}", e);
                store
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let controller = SessionController::with_inbox(Box::new(engine), store, config, tx.clone());

        tokio::spawn(Self::run(controller, rx));

        SessionHandle {
            tx: tx.clone(),
            _guard: Arc::new(ShutdownGuard { tx }),
        }
    }

    async fn run(mut controller: SessionController, mut rx: UnboundedReceiver<Inbound>) {
        debug!("Session actor started");
        while let Some(inbound) = rx.recv().await {
            if !controller.dispatch(inbound) {
                break;
            }
        }
        debug!("Session actor stopped");
    }
}

/// Shuts the actor down when the last handle clone is dropped
#[derive(Debug)]
struct ShutdownGuard {
    tx: UnboundedSender<Inbound>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(Inbound::Shutdown(None));
    }
}

/// Cloneable command surface of a running session actor
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Inbound>,
    _guard: Arc<ShutdownGuard>,
}

impl SessionHandle {
    fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(command.into())
            .map_err(|_| SessionError::ServiceClosed)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(make(reply))?;
        rx.await.map_err(|_| SessionError::ServiceClosed)
    }

    /// See [`SessionController::load_book`]
    pub async fn load_book(&self, book: Book, resume: bool) -> Result<bool> {
        self.request(|reply| SessionCommand::LoadBook {
            book,
            resume,
            reply,
        })
        .await?
    }

    pub fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    pub fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.send(SessionCommand::SeekTo(position_ms))
    }

    pub fn rewind(&self) -> Result<()> {
        self.send(SessionCommand::Rewind)
    }

    pub fn forward(&self) -> Result<()> {
        self.send(SessionCommand::Forward)
    }

    pub fn next_track(&self) -> Result<()> {
        self.send(SessionCommand::NextTrack)
    }

    pub fn previous_track(&self) -> Result<()> {
        self.send(SessionCommand::PreviousTrack)
    }

    pub async fn move_to_queue_position(&self, position: usize) -> Result<()> {
        self.request(|reply| SessionCommand::MoveToQueuePosition { position, reply })
            .await?
    }

    pub async fn reorder_queue(&self, from: usize, to: usize) -> Result<()> {
        self.request(|reply| SessionCommand::ReorderQueue { from, to, reply })
            .await?
    }

    pub async fn remove_from_queue(&self, position: usize) -> Result<()> {
        self.request(|reply| SessionCommand::RemoveFromQueue { position, reply })
            .await?
    }

    /// Returns the queue position the entry landed at
    pub async fn add_to_queue(&self, track_index: usize, position: Option<usize>) -> Result<usize> {
        self.request(|reply| SessionCommand::AddToQueue {
            track_index,
            position,
            reply,
        })
        .await?
    }

    /// Attach as the single event subscriber
    pub async fn subscribe(&self) -> Result<UnboundedReceiver<SessionEvent>> {
        self.request(|reply| SessionCommand::Subscribe { reply })
            .await
    }

    pub fn unsubscribe(&self) -> Result<()> {
        self.send(SessionCommand::Unsubscribe)
    }

    /// Current state of every read accessor
    pub async fn inspect(&self) -> Result<SessionView> {
        self.request(|reply| SessionCommand::Inspect { reply }).await
    }

    /// Persist, release the engine, and stop the actor
    ///
    /// Requests issued afterwards fail with `ServiceClosed`.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack, rx) = oneshot::channel();
        self.tx
            .send(Inbound::Shutdown(Some(ack)))
            .map_err(|_| SessionError::ServiceClosed)?;
        rx.await.map_err(|_| SessionError::ServiceClosed)
    }
}
