//! Playback session controller
//!
//! Single authority over the active session. Owns the engine adapter, the
//! session state, the progress ticker, and the notifier. Every input (UI
//! command, engine callback, ticker wake-up) is applied here, one at a time,
//! through [`SessionController::dispatch`].
//!
//! Engine callbacks and ticks are tagged with the load epoch current when
//! they were created. The epoch advances on every engine release, so a
//! completion from a track that has since been replaced, or a tick that was
//! already queued when the ticker stopped, is discarded instead of touching
//! the new track.

use crate::command::{Inbound, SessionCommand};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::{Notifier, SessionEvent, TrackLabel};
use crate::queue::Removal;
use crate::session::SessionState;
use crate::ticker::ProgressTicker;
use crate::types::{NowPlaying, SessionPhase, SessionView};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tome_core::{AudioEngine, Book, EngineEvent, EngineEventCallback, SessionStore};
use tracing::{debug, info, warn};

const PLAYBACK_FAILED: &str = "Playback failed";

/// Playback session state machine
pub struct SessionController {
    config: SessionConfig,
    engine: Box<dyn AudioEngine>,
    store: Arc<dyn SessionStore>,
    notifier: Notifier,
    ticker: ProgressTicker,
    inbox: UnboundedSender<Inbound>,

    session: Option<SessionState>,
    phase: SessionPhase,
    duration_ms: u64,

    /// Bumped on every engine release
    load_epoch: u64,

    /// Play status last reported to the subscriber
    announced_playing: bool,
}

impl SessionController {
    /// Create a controller and the inbox its callbacks and ticks feed
    ///
    /// The receiver must be drained into [`Self::dispatch`] by the owner.
    pub fn new(
        engine: impl AudioEngine + 'static,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> (Self, UnboundedReceiver<Inbound>) {
        let (inbox, rx) = mpsc::unbounded_channel();
        let controller = Self::with_inbox(Box::new(engine), store, config, inbox);
        (controller, rx)
    }

    /// Create a controller that posts callbacks and ticks into `inbox`
    pub fn with_inbox(
        engine: Box<dyn AudioEngine>,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
        inbox: UnboundedSender<Inbound>,
    ) -> Self {
        let ticker = ProgressTicker::new(config.tick_interval(), inbox.clone());
        Self {
            config,
            engine,
            store,
            notifier: Notifier::new(),
            ticker,
            inbox,
            session: None,
            phase: SessionPhase::Empty,
            duration_ms: 0,
            load_epoch: 0,
            announced_playing: false,
        }
    }

    // ===== Dispatch =====

    /// Apply one inbox message; returns `false` once the controller has shut down
    pub fn dispatch(&mut self, inbound: Inbound) -> bool {
        match inbound {
            Inbound::Command(command) => self.handle_command(command),
            Inbound::Engine { epoch, event } => self.handle_engine_event(epoch, event),
            Inbound::Tick { epoch, generation } => self.handle_tick(epoch, generation),
            Inbound::Shutdown(ack) => {
                self.shutdown();
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
                return false;
            }
        }
        true
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::LoadBook {
                book,
                resume,
                reply,
            } => {
                let _ = reply.send(self.load_book(book, resume));
            }
            SessionCommand::Play => self.play(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::SeekTo(position_ms) => self.seek_to(position_ms),
            SessionCommand::Rewind => self.rewind(),
            SessionCommand::Forward => self.forward(),
            SessionCommand::NextTrack => self.next_track(),
            SessionCommand::PreviousTrack => self.previous_track(),
            SessionCommand::MoveToQueuePosition { position, reply } => {
                let _ = reply.send(self.move_to_queue_position(position));
            }
            SessionCommand::ReorderQueue { from, to, reply } => {
                let _ = reply.send(self.reorder_queue(from, to));
            }
            SessionCommand::RemoveFromQueue { position, reply } => {
                let _ = reply.send(self.remove_from_queue(position));
            }
            SessionCommand::AddToQueue {
                track_index,
                position,
                reply,
            } => {
                let _ = reply.send(self.add_to_queue(track_index, position));
            }
            SessionCommand::Subscribe { reply } => {
                let _ = reply.send(self.subscribe());
            }
            SessionCommand::Unsubscribe => self.unsubscribe(),
            SessionCommand::Inspect { reply } => {
                let _ = reply.send(self.view());
            }
        }
    }

    // ===== Book lifecycle =====

    /// Load `book` and open its current track, paused
    ///
    /// With `resume`, the stored snapshot for the book (if any) decides the
    /// queue, track, and position. Returns whether the track opened; a
    /// track that fails to open is reported through events and leaves the
    /// session in [`SessionPhase::Error`].
    ///
    /// # Errors
    /// Returns `SessionError::EmptyBook` without touching state if the book
    /// has no tracks
    pub fn load_book(&mut self, book: Book, resume: bool) -> Result<bool> {
        if book.is_empty() {
            return Err(SessionError::EmptyBook { name: book.name });
        }

        if self.session.is_some() {
            self.ticker.stop();
            self.persist();
        }
        self.release_engine();

        let snapshot = if resume {
            match self.store.load(&book.id) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Failed to read snapshot for {}: {}", book.id, e);
                    None
                }
            }
        } else {
            None
        };

        info!(
            "Loading book '{}' ({} tracks, resume: {})",
            book.name,
            book.len(),
            snapshot.is_some()
        );

        let session = match &snapshot {
            Some(snapshot) => SessionState::restore(book, snapshot),
            None => SessionState::fresh(book),
        };
        let start_ms = session.position_ms;
        self.session = Some(session);

        let loaded = self.load_track(start_ms);
        self.sync_playing();
        self.emit_queue_changed();
        Ok(loaded)
    }

    /// Pause, persist, release the engine, and forget the book
    pub fn stop(&mut self) {
        let Some(book_name) = self.session.as_ref().map(|s| s.book.name.clone()) else {
            return;
        };

        if self.phase == SessionPhase::Playing {
            self.pause();
        } else {
            self.persist();
        }
        self.release_engine();

        self.session = None;
        self.phase = SessionPhase::Empty;
        self.duration_ms = 0;
        self.sync_playing();
        self.notifier.emit(SessionEvent::Dismissed);
        info!("Stopped session for '{}'", book_name);
    }

    /// Cancel the ticker, persist, and release the engine
    ///
    /// Waits for the store to finish every pending write.
    pub fn shutdown(&mut self) {
        self.ticker.stop();
        self.persist();
        if let Err(e) = self.store.flush() {
            warn!("Failed to flush session store: {}", e);
        }
        self.release_engine();
        self.session = None;
        self.phase = SessionPhase::Empty;
        self.duration_ms = 0;
        debug!("Session controller shut down");
    }

    // ===== Transport =====

    pub fn play(&mut self) {
        if self.phase != SessionPhase::Paused {
            return;
        }

        if let Err(e) = self.engine.play() {
            self.fail_playback(&e.to_string());
            return;
        }

        self.phase = SessionPhase::Playing;
        self.ticker.start(self.load_epoch);
        self.sync_playing();
    }

    /// Pause output and persist immediately
    pub fn pause(&mut self) {
        if self.phase != SessionPhase::Playing {
            return;
        }

        self.ticker.stop();
        if let Err(e) = self.engine.pause() {
            warn!("Engine pause failed: {}", e);
        }
        self.phase = SessionPhase::Paused;
        self.persist();
        self.sync_playing();
    }

    /// Seek within the loaded track, clamped to its duration when known
    pub fn seek_to(&mut self, position_ms: u64) {
        if !self.phase.has_track() {
            return;
        }

        let position_ms = self.clamp_to_duration(position_ms);
        if let Err(e) = self.engine.seek_to(position_ms) {
            self.fail_playback(&e.to_string());
            return;
        }

        if let Some(session) = &mut self.session {
            session.position_ms = position_ms;
        }
        self.emit_progress(position_ms);
    }

    pub fn rewind(&mut self) {
        let skip = self.config.skip_ms;
        self.seek_to(self.current_position_ms().saturating_sub(skip));
    }

    pub fn forward(&mut self) {
        let skip = self.config.skip_ms;
        self.seek_to(self.current_position_ms().saturating_add(skip));
    }

    /// Advance the queue cursor; no-op on the last entry
    pub fn next_track(&mut self) {
        let was_playing = self.is_playing();
        let Some(session) = &mut self.session else {
            return;
        };
        if session.queue.advance().is_none() {
            return;
        }

        self.change_track(was_playing);
        self.emit_queue_changed();
        self.persist();
    }

    /// Step the queue cursor back, or restart the track on the first entry
    pub fn previous_track(&mut self) {
        let was_playing = self.is_playing();
        let Some(session) = &mut self.session else {
            return;
        };

        if session.queue.has_previous() {
            let _ = session.queue.set_cursor(session.queue.cursor() - 1);
            self.change_track(was_playing);
            self.emit_queue_changed();
            self.persist();
        } else if self.phase.has_track() {
            self.seek_to(0);
        } else {
            self.change_track(false);
        }
    }

    // ===== Queue =====

    /// Jump to `position` in the queue and load that track from the start
    ///
    /// # Errors
    /// `NoBookLoaded`, or `InvalidIndex` if `position` is out of range
    pub fn move_to_queue_position(&mut self, position: usize) -> Result<()> {
        let was_playing = self.is_playing();
        let session = self.session.as_mut().ok_or(SessionError::NoBookLoaded)?;
        session.queue.set_cursor(position)?;

        self.change_track(was_playing);
        self.emit_queue_changed();
        self.persist();
        Ok(())
    }

    /// Move a queue entry; the loaded track never changes
    ///
    /// # Errors
    /// `NoBookLoaded`, or `InvalidIndex` if either position is out of range
    pub fn reorder_queue(&mut self, from: usize, to: usize) -> Result<()> {
        let session = self.session.as_mut().ok_or(SessionError::NoBookLoaded)?;
        session.queue.reorder(from, to)?;

        debug!("Queue entry moved {} -> {}", from, to);
        self.emit_queue_changed();
        self.persist();
        Ok(())
    }

    /// Remove a queue entry, reloading if it was the loaded one
    ///
    /// # Errors
    /// `NoBookLoaded`, `InvalidIndex`, or `LastQueueEntry` when the queue
    /// holds a single entry
    pub fn remove_from_queue(&mut self, position: usize) -> Result<()> {
        let was_playing = self.is_playing();
        let session = self.session.as_mut().ok_or(SessionError::NoBookLoaded)?;

        if session.queue.remove(position)? == Removal::Current {
            self.change_track(was_playing);
        }
        self.emit_queue_changed();
        self.persist();
        Ok(())
    }

    /// Insert a track into the queue, or append with `None`
    ///
    /// Duplicates are allowed. Returns the queue position of the new entry.
    ///
    /// # Errors
    /// `NoBookLoaded`, or `InvalidIndex` if `track_index` is not a track of the book
    pub fn add_to_queue(&mut self, track_index: usize, position: Option<usize>) -> Result<usize> {
        let session = self.session.as_mut().ok_or(SessionError::NoBookLoaded)?;
        if !session.book.contains_index(track_index) {
            return Err(SessionError::InvalidIndex {
                index: track_index,
                len: session.book.len(),
            });
        }

        let landed = session.queue.insert(track_index, position);
        self.emit_queue_changed();
        self.persist();
        Ok(landed)
    }

    // ===== Asynchronous inputs =====

    /// Apply an engine callback raised under `epoch`
    pub fn handle_engine_event(&mut self, epoch: u64, event: EngineEvent) {
        if epoch != self.load_epoch || !self.phase.has_track() {
            debug!("Discarding stale engine event {:?} (epoch {})", event, epoch);
            return;
        }

        match event {
            EngineEvent::Completed => self.on_completed(),
            EngineEvent::Error(reason) => self.fail_playback(&reason),
        }
    }

    fn on_completed(&mut self) {
        let was_playing = self.is_playing();
        self.ticker.stop();

        let advanced = self
            .session
            .as_mut()
            .is_some_and(|session| session.queue.advance().is_some());

        if advanced {
            debug!("Track completed, advancing queue");
            self.change_track(was_playing);
            self.emit_queue_changed();
            self.persist();
        } else {
            info!("Reached end of queue");
            self.pause();
            // pause() is a no-op unless playing
            if !was_playing {
                self.persist();
            }
        }
    }

    /// Apply a ticker wake-up
    pub fn handle_tick(&mut self, epoch: u64, generation: u64) {
        if epoch != self.load_epoch
            || !self.ticker.is_current(generation)
            || self.phase != SessionPhase::Playing
        {
            debug!("Discarding stale tick (epoch {}, generation {})", epoch, generation);
            return;
        }

        let position_ms = self.engine.position_ms();
        let duration_ms = self.engine.duration_ms();
        if duration_ms > 0 {
            self.duration_ms = duration_ms;
        }
        if let Some(session) = &mut self.session {
            session.position_ms = position_ms;
        }

        self.emit_progress(position_ms);
        self.persist();
    }

    // ===== Subscription =====

    /// Attach the UI subscriber, replacing any previous one
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        self.notifier.subscribe()
    }

    pub fn unsubscribe(&mut self) {
        self.notifier.unsubscribe();
    }

    // ===== Accessors =====

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Position in the current track; live while a track is open
    pub fn current_position_ms(&self) -> u64 {
        if self.phase.has_track() {
            self.engine.position_ms()
        } else {
            self.session.as_ref().map_or(0, |s| s.position_ms)
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn current_track_index(&self) -> Option<usize> {
        self.session.as_ref().map(SessionState::current_track_index)
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.session.as_ref().map(|s| &s.book)
    }

    pub fn queue(&self) -> &[usize] {
        self.session.as_ref().map_or(&[], |s| s.queue.entries())
    }

    pub fn queue_cursor(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.queue.cursor())
    }

    /// Presentation entry for the loaded track
    pub fn now_playing(&self) -> Option<NowPlaying> {
        if !self.phase.has_track() {
            return None;
        }
        let session = self.session.as_ref()?;
        let index = session.current_track_index();
        let track = session.book.track(index)?;

        Some(NowPlaying {
            book_name: session.book.name.clone(),
            track_number: index + 1,
            track_count: session.book.len(),
            track_name: track.name.clone(),
            is_playing: self.is_playing(),
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            book: self.current_book().cloned(),
            current_track_index: self.current_track_index(),
            queue: self.queue().to_vec(),
            queue_cursor: self.queue_cursor(),
            position_ms: self.current_position_ms(),
            duration_ms: self.duration_ms,
            is_playing: self.is_playing(),
        }
    }

    // ===== Internals =====

    /// Open the track under the cursor at `start_ms`
    fn load_track(&mut self, start_ms: u64) -> bool {
        self.release_engine();

        let Some(session) = &mut self.session else {
            return false;
        };
        let index = session.current_track_index();
        let Some(track) = session.book.track(index).cloned() else {
            return false;
        };
        session.position_ms = start_ms;
        self.phase = SessionPhase::Loading;

        if !track.readable {
            self.fail_load(
                index,
                SessionError::TrackUnavailable {
                    index,
                    name: track.name,
                },
            );
            return false;
        }

        let on_event = self.event_callback();
        let duration_ms = match self.engine.load(&track.source, on_event) {
            Ok(duration_ms) => duration_ms,
            Err(e) => {
                self.fail_load(
                    index,
                    SessionError::EngineLoad {
                        name: track.name,
                        reason: e.to_string(),
                    },
                );
                return false;
            }
        };

        let start_ms = if duration_ms > 0 {
            start_ms.min(duration_ms)
        } else {
            start_ms
        };
        if start_ms > 0 {
            if let Err(e) = self.engine.seek_to(start_ms) {
                self.fail_load(
                    index,
                    SessionError::EngineLoad {
                        name: track.name,
                        reason: e.to_string(),
                    },
                );
                return false;
            }
        }

        if let Some(session) = &mut self.session {
            session.position_ms = start_ms;
        }
        self.duration_ms = duration_ms;
        self.phase = SessionPhase::Paused;
        debug!("Loaded track {} ({}) at {}ms", index, track.source.location(), start_ms);

        self.notifier.emit(SessionEvent::FileChanged {
            track_index: index,
            label: TrackLabel::Name(track.name),
        });
        self.emit_progress(start_ms);
        self.emit_presented();
        true
    }

    /// Reload the track under the cursor from the start, resuming if asked
    fn change_track(&mut self, resume: bool) {
        if self.load_track(0) && resume {
            self.play();
        }
        self.sync_playing();
    }

    fn fail_load(&mut self, index: usize, error: SessionError) {
        warn!("Track {} failed to load: {}", index, error);
        self.release_engine();
        self.phase = SessionPhase::Error;
        self.duration_ms = 0;

        let message = error.to_string();
        self.notifier.emit(SessionEvent::Error {
            message: message.clone(),
        });
        self.notifier.emit(SessionEvent::FileChanged {
            track_index: index,
            label: TrackLabel::Error(message),
        });
    }

    /// Handle a runtime failure of the loaded track; track and last position are kept
    fn fail_playback(&mut self, reason: &str) {
        let error = SessionError::EngineRuntime(reason.to_string());
        warn!("{}", error);

        let position_ms = self.engine.position_ms();
        if let Some(session) = &mut self.session {
            session.position_ms = position_ms;
        }
        self.release_engine();
        self.phase = SessionPhase::Error;
        self.duration_ms = 0;

        self.notifier.emit(SessionEvent::Error {
            message: error.to_string(),
        });
        if let Some(index) = self.current_track_index() {
            self.notifier.emit(SessionEvent::FileChanged {
                track_index: index,
                label: TrackLabel::Error(PLAYBACK_FAILED.to_string()),
            });
        }
        self.sync_playing();
    }

    /// Stop the ticker and close the engine handle, invalidating the epoch
    fn release_engine(&mut self) {
        self.ticker.stop();
        self.engine.release();
        self.load_epoch = self.load_epoch.wrapping_add(1);
    }

    fn event_callback(&self) -> EngineEventCallback {
        let inbox = self.inbox.clone();
        let epoch = self.load_epoch;
        Arc::new(move |event| {
            let _ = inbox.send(Inbound::Engine { epoch, event });
        })
    }

    /// Write the snapshot; failures are logged and swallowed
    fn persist(&mut self) {
        if self.phase.has_track() {
            let position_ms = self.engine.position_ms();
            if let Some(session) = &mut self.session {
                session.position_ms = position_ms;
            }
        }

        let Some(session) = &self.session else {
            return;
        };
        if let Err(e) = self.store.save(&session.snapshot()) {
            warn!("Failed to persist session for {}: {}", session.book.id, e);
        }
    }

    /// Report play status to the subscriber when it differs from the last report
    fn sync_playing(&mut self) {
        let is_playing = self.is_playing();
        if is_playing == self.announced_playing {
            return;
        }
        self.announced_playing = is_playing;
        self.notifier
            .emit(SessionEvent::PlaybackStateChanged { is_playing });
        self.emit_presented();
    }

    fn clamp_to_duration(&self, position_ms: u64) -> u64 {
        if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        }
    }

    fn emit_progress(&mut self, position_ms: u64) {
        self.notifier.emit(SessionEvent::Progress {
            position_ms,
            duration_ms: self.duration_ms,
        });
    }

    fn emit_presented(&mut self) {
        if let Some(now) = self.now_playing() {
            debug!("Now playing {}", now.summary());
            self.notifier.emit(SessionEvent::Presented(now));
        }
    }

    fn emit_queue_changed(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let event = SessionEvent::QueueChanged {
            queue: session.queue.entries().to_vec(),
            cursor: session.queue.cursor(),
        };
        self.notifier.emit(event);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.ticker.stop();
        self.engine.release();
    }
}
