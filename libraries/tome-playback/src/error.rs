//! Error types for session control

use thiserror::Error;

/// Session controller errors
///
/// Only input validation reaches callers as `Err`; engine failures are
/// reported through [`crate::SessionEvent::Error`] and never returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Book has no tracks
    #[error("Book '{name}' has no audio files")]
    EmptyBook { name: String },

    /// Track is unreadable or inaccessible
    #[error("File is not accessible: {name}")]
    TrackUnavailable { index: usize, name: String },

    /// Engine could not open the track
    #[error("Cannot load audio file: {name}: {reason}")]
    EngineLoad { name: String, reason: String },

    /// Engine failed after a successful load
    #[error("Playback error: {0}")]
    EngineRuntime(String),

    /// Queue or track index out of range
    #[error("Index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },

    /// Removal would leave the queue empty
    #[error("Cannot remove the last queue entry")]
    LastQueueEntry,

    /// Operation needs a loaded book
    #[error("No book loaded")]
    NoBookLoaded,

    /// Session service task has stopped
    #[error("Session service closed")]
    ServiceClosed,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
