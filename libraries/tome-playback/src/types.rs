//! Core types for session control

use serde::{Deserialize, Serialize};
use tome_core::Book;

/// Controller state machine phase
///
/// `Empty` is initial. Every track change passes through `Loading`; a failed
/// load or an engine error lands in `Error`, which stays addressable so
/// navigation can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No book loaded
    #[default]
    Empty,

    /// Book accepted, track being opened
    Loading,

    /// Track loaded, output paused
    Paused,

    /// Track loaded, output running
    Playing,

    /// Current track failed; no engine handle is open
    Error,
}

impl SessionPhase {
    /// Whether an engine handle is open in this phase
    pub fn has_track(self) -> bool {
        matches!(self, Self::Paused | Self::Playing)
    }
}

/// What a presentation surface shows for the active session
///
/// Rendered by notification areas and lock screens as `"{n}/{count}: {name}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub book_name: String,

    /// 1-based position of the track in natural file order
    pub track_number: usize,

    pub track_count: usize,

    pub track_name: String,

    pub is_playing: bool,
}

impl NowPlaying {
    /// One-line summary, e.g. `"3/12: chapter03.mp3"`
    pub fn summary(&self) -> String {
        format!("{}/{}: {}", self.track_number, self.track_count, self.track_name)
    }
}

/// Point-in-time copy of every read accessor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub book: Option<Book>,
    pub current_track_index: Option<usize>,
    pub queue: Vec<usize>,
    pub queue_cursor: usize,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
}
