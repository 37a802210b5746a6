/// Collaborator traits for Tome
use crate::error::{EngineError, Result};
use crate::types::{BookId, SessionSnapshot, TrackSource};
use std::sync::Arc;

/// Asynchronous notification from a loaded engine handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The loaded track played to its end
    Completed,

    /// Decoding or output failed while the track was loaded
    Error(String),
}

/// Callback registered with the engine on every load
///
/// May be invoked from any thread. Implementations must stop invoking the
/// callback of a handle once it has been released.
pub type EngineEventCallback = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Audio engine adapter
///
/// Thin wrapper around one physical decode/playback engine. Holds at most
/// one loaded track; the session controller owns the adapter exclusively.
pub trait AudioEngine: Send {
    /// Open `source`, replacing nothing (callers release first)
    ///
    /// Returns the track duration in milliseconds (0 when unknown).
    ///
    /// # Errors
    /// Returns `EngineError::Load` if the source cannot be opened or probed
    fn load(
        &mut self,
        source: &TrackSource,
        on_event: EngineEventCallback,
    ) -> std::result::Result<u64, EngineError>;

    /// Start or resume output
    fn play(&mut self) -> std::result::Result<(), EngineError>;

    /// Pause output, keeping the position
    fn pause(&mut self) -> std::result::Result<(), EngineError>;

    /// Move the read position of the loaded track
    fn seek_to(&mut self, position_ms: u64) -> std::result::Result<(), EngineError>;

    /// Current position in milliseconds (0 when nothing is loaded)
    fn position_ms(&self) -> u64;

    /// Duration of the loaded track in milliseconds (0 when unknown)
    fn duration_ms(&self) -> u64;

    /// Whether output is running
    fn is_playing(&self) -> bool;

    /// Release the loaded track and every resource attached to it
    ///
    /// Calling this with nothing loaded is a no-op.
    fn release(&mut self);
}

/// Durable per-book snapshot storage
///
/// One record per book identity, overwritten on every save. Readers other
/// than the session controller may observe stale records.
pub trait SessionStore: Send + Sync {
    /// Read the snapshot stored for `book_id`
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read or the record is corrupt
    fn load(&self, book_id: &BookId) -> Result<Option<SessionSnapshot>>;

    /// Overwrite the record for `snapshot.book_identity`
    ///
    /// # Errors
    /// Returns an error if the record cannot be written
    fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Every decodable snapshot; corrupt records are skipped
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read
    fn load_all(&self) -> Result<Vec<SessionSnapshot>>;

    /// Remove the record for `book_id`, returning whether one existed
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written
    fn clear(&self, book_id: &BookId) -> Result<bool>;

    /// Block until every save accepted so far has reached the backing storage
    ///
    /// Stores that write synchronously have nothing to wait for.
    ///
    /// # Errors
    /// Returns an error if pending writes can no longer complete
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self, book_id: &BookId) -> Result<Option<SessionSnapshot>> {
        (**self).load(book_id)
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn load_all(&self) -> Result<Vec<SessionSnapshot>> {
        (**self).load_all()
    }

    fn clear(&self, book_id: &BookId) -> Result<bool> {
        (**self).clear(book_id)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}
