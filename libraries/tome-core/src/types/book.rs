/// Book types: an ordered collection of tracks under a stable identity
use super::track::Track;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Book identifier
///
/// Stable folder or collection key. Session snapshots are stored under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Create a new book ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An audiobook split across many files
///
/// Track order is the natural file order; a track's index in `tracks`
/// is its identity for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub id: BookId,
    pub tracks: Vec<Track>,
}

impl Book {
    /// Create a book from its tracks in natural order
    pub fn new(name: impl Into<String>, id: impl Into<BookId>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            tracks,
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the book has no tracks at all
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index` in natural order
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Whether `index` names a track of this book
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.tracks.len()
    }

    /// Approximate book length, summed from file sizes
    pub fn total_bytes(&self) -> u64 {
        self.tracks.iter().map(|t| t.size_bytes).sum()
    }
}
