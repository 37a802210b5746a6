/// Collaborator error types for Tome
use thiserror::Error;

/// Result type alias for session store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by an audio engine adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Opening or probing the source failed
    #[error("Engine load error: {0}")]
    Load(String),

    /// Decoding or transport control failed after a successful load
    #[error("Engine runtime error: {0}")]
    Runtime(String),

    /// The engine handle was already released
    #[error("Engine handle released")]
    Released,
}

impl EngineError {
    /// Create a load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

/// Errors raised by a session store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// A stored record exists but cannot be decoded
    #[error("Corrupt snapshot for {book_id}: {reason}")]
    Corrupt { book_id: String, reason: String },

    /// The background writer is no longer accepting work
    #[error("Snapshot writer stopped")]
    WriterStopped,
}

impl StoreError {
    /// Create a corrupt-record error
    pub fn corrupt(book_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            book_id: book_id.into(),
            reason: reason.into(),
        }
    }
}
