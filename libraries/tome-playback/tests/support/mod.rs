//! Shared fixtures for session controller tests
//!
//! `FakeEngine` records every call and hands the registered callbacks back
//! to the test so engine events can be raised on demand. `RecordingStore`
//! counts writes on top of a `MemoryStore`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedReceiver;
use tome_core::{
    AudioEngine, Book, BookId, EngineError, EngineEvent, EngineEventCallback, SessionSnapshot,
    SessionStore, StoreError, Track, TrackSource,
};
use tome_playback::{Inbound, SessionConfig, SessionController, SessionEvent};
use tome_storage::MemoryStore;

pub const DEFAULT_DURATION_MS: u64 = 60_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ===== Engine =====

#[derive(Default)]
pub struct EngineState {
    pub loaded: Option<TrackSource>,
    pub loads: Vec<TrackSource>,
    pub callbacks: Vec<EngineEventCallback>,
    pub releases: usize,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub seeks: Vec<u64>,
    pub durations: HashMap<String, u64>,
    pub failing: HashSet<String>,
    pub fail_play: bool,
}

/// Scriptable engine; clones share state
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap()
    }

    pub fn fail_on(&self, location: &str) {
        self.state().failing.insert(location.to_string());
    }

    pub fn set_duration(&self, location: &str, duration_ms: u64) {
        self.state()
            .durations
            .insert(location.to_string(), duration_ms);
    }

    /// Simulate output running forward
    pub fn set_position(&self, position_ms: u64) {
        self.state().position_ms = position_ms;
    }

    pub fn load_count(&self) -> usize {
        self.state().loads.len()
    }

    pub fn release_count(&self) -> usize {
        self.state().releases
    }

    pub fn loaded_location(&self) -> Option<String> {
        self.state().loaded.as_ref().map(TrackSource::location)
    }

    /// Callback registered by the `n`th load (0-based)
    pub fn callback(&self, n: usize) -> EngineEventCallback {
        self.state().callbacks[n].clone()
    }

    /// Raise `event` through the most recent callback
    pub fn fire(&self, event: EngineEvent) {
        let callback = self
            .state()
            .callbacks
            .last()
            .cloned()
            .expect("nothing was loaded");
        callback(event);
    }
}

impl AudioEngine for FakeEngine {
    fn load(
        &mut self,
        source: &TrackSource,
        on_event: EngineEventCallback,
    ) -> Result<u64, EngineError> {
        let mut state = self.state();
        assert!(state.loaded.is_none(), "load without release");

        let location = source.location();
        state.loads.push(source.clone());
        if state.failing.contains(&location) {
            return Err(EngineError::load(format!("cannot decode {}", location)));
        }

        let duration_ms = state
            .durations
            .get(&location)
            .copied()
            .unwrap_or(DEFAULT_DURATION_MS);
        state.loaded = Some(source.clone());
        state.callbacks.push(on_event);
        state.playing = false;
        state.position_ms = 0;
        state.duration_ms = duration_ms;
        Ok(duration_ms)
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let mut state = self.state();
        if state.fail_play {
            return Err(EngineError::runtime("output device lost"));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.state().playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), EngineError> {
        let mut state = self.state();
        state.position_ms = position_ms;
        state.seeks.push(position_ms);
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.state().position_ms
    }

    fn duration_ms(&self) -> u64 {
        self.state().duration_ms
    }

    fn is_playing(&self) -> bool {
        self.state().playing
    }

    fn release(&mut self) {
        let mut state = self.state();
        if state.loaded.take().is_some() {
            state.releases += 1;
        }
        state.playing = false;
        state.position_ms = 0;
        state.duration_ms = 0;
    }
}

// ===== Store =====

/// Counts saves and flushes; can be told to fail saves
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    saves: AtomicUsize,
    flushes: AtomicUsize,
    fail_saves: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self, book_id: &str) -> Option<SessionSnapshot> {
        self.inner.load(&BookId::new(book_id)).unwrap()
    }

    pub fn seed(&self, snapshot: SessionSnapshot) {
        self.inner.save(&snapshot).unwrap();
    }
}

impl SessionStore for RecordingStore {
    fn load(&self, book_id: &BookId) -> tome_core::Result<Option<SessionSnapshot>> {
        self.inner.load(book_id)
    }

    fn save(&self, snapshot: &SessionSnapshot) -> tome_core::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(snapshot)
    }

    fn load_all(&self) -> tome_core::Result<Vec<SessionSnapshot>> {
        self.inner.load_all()
    }

    fn clear(&self, book_id: &BookId) -> tome_core::Result<bool> {
        self.inner.clear(book_id)
    }

    fn flush(&self) -> tome_core::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ===== Fixtures =====

pub const BOOK_ID: &str = "/books/odyssey";

pub fn track_location(index: usize) -> String {
    format!("{}/{:02}.mp3", BOOK_ID, index)
}

pub fn book(tracks: usize) -> Book {
    Book::new(
        "The Odyssey",
        BOOK_ID,
        (0..tracks)
            .map(|i| Track::new(format!("{:02}.mp3", i), TrackSource::file(track_location(i))))
            .collect(),
    )
}

// ===== Harness =====

/// Controller driven by hand: the test pumps the inbox explicitly
pub struct Harness {
    pub controller: SessionController,
    pub inbox: UnboundedReceiver<Inbound>,
    pub events: UnboundedReceiver<SessionEvent>,
    pub engine: FakeEngine,
    pub store: Arc<RecordingStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(RecordingStore::new())
    }

    pub fn with_store(store: Arc<RecordingStore>) -> Self {
        init_tracing();
        let engine = FakeEngine::new();
        let (mut controller, inbox) =
            SessionController::new(engine.clone(), store.clone(), SessionConfig::default());
        let events = controller.subscribe();

        Self {
            controller,
            inbox,
            events,
            engine,
            store,
        }
    }

    /// Harness with `tracks` tracks loaded fresh and events drained
    pub fn loaded(tracks: usize) -> Self {
        let mut harness = Self::new();
        assert!(harness.controller.load_book(book(tracks), false).unwrap());
        harness.drain_events();
        harness
    }

    /// Dispatch everything queued by callbacks and ticks
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(inbound) = self.inbox.try_recv() {
            self.controller.dispatch(inbound);
            handled += 1;
        }
        handled
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn count_state_changes(events: &[SessionEvent], playing: bool) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::PlaybackStateChanged { is_playing } if *is_playing == playing))
        .count()
}

pub fn progress_events(events: &[SessionEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Progress { position_ms, .. } => Some(*position_ms),
            _ => None,
        })
        .collect()
}
