/// Track types supplied by the book catalog
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Where the audio engine reads a track from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum TrackSource {
    /// Local file path
    File(PathBuf),

    /// Opaque content URI resolved by the engine
    Uri(String),
}

impl TrackSource {
    /// Create a file source
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Create a URI source
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Human readable location, used in log lines
    pub fn location(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Uri(uri) => uri.clone(),
        }
    }
}

/// One playable audio file of a book
///
/// Immutable once the book is loaded into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name (usually the file name)
    pub name: String,

    /// File size in bytes (0 when unknown)
    pub size_bytes: u64,

    /// Whether the source could be opened for reading when the catalog scanned it
    pub readable: bool,

    /// Handle the engine adapter opens
    pub source: TrackSource,
}

impl Track {
    /// Create a readable track of unknown size
    pub fn new(name: impl Into<String>, source: TrackSource) -> Self {
        Self {
            name: name.into(),
            size_bytes: 0,
            readable: true,
            source,
        }
    }

    /// Build a track from a local file, probing size and readability
    ///
    /// A missing or unreadable file still yields a track; it is flagged
    /// unreadable so the controller can report it when it is reached.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string());

        let (size_bytes, is_file) = std::fs::metadata(path)
            .map(|m| (m.len(), m.is_file()))
            .unwrap_or((0, false));
        let readable = is_file && File::open(path).is_ok();

        Self {
            name,
            size_bytes,
            readable,
            source: TrackSource::File(path.to_path_buf()),
        }
    }

    /// Set the file size
    #[must_use]
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Mark the track as unreadable
    #[must_use]
    pub fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }
}
