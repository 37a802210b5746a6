//! Session state: book, queue, and resume position

use crate::queue::PlayQueue;
use tome_core::{Book, SessionSnapshot};
use tracing::debug;

/// Authoritative in-memory record of the active session
///
/// The current track index is always derived from the queue cursor, never
/// stored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub book: Book,
    pub queue: PlayQueue,

    /// Last known position in the current track
    pub position_ms: u64,
}

impl SessionState {
    /// Natural order, first track, position zero
    pub fn fresh(book: Book) -> Self {
        let queue = PlayQueue::natural(book.len());
        Self {
            book,
            queue,
            position_ms: 0,
        }
    }

    /// Rebuild a session from a stored snapshot
    ///
    /// The track index is clamped into the book and the position to zero or
    /// more. A stored queue is only used when it has exactly one entry per
    /// track slot and every entry names a track; otherwise natural order is
    /// used with the cursor on the stored track. If a valid stored queue's
    /// cursor disagrees with the stored track, the cursor moves to the
    /// track when the queue holds it, and the position is dropped when it
    /// does not.
    ///
    /// `book` must not be empty.
    pub fn restore(book: Book, snapshot: &SessionSnapshot) -> Self {
        let track_count = book.len();
        let last = track_count.saturating_sub(1) as i64;
        let track_index = snapshot.current_track_index.clamp(0, last) as usize;
        let mut position_ms = snapshot.current_position_ms.max(0) as u64;

        let queue = match valid_queue(snapshot.queue_order.as_deref(), track_count) {
            Some(entries) => {
                let cursor = snapshot.queue_current_index.unwrap_or(0).max(0) as usize;
                let mut queue = PlayQueue::from_parts(entries, cursor);

                if queue.current() != Some(track_index) {
                    match queue.position_of(track_index) {
                        Some(position) => {
                            let _ = queue.set_cursor(position);
                        }
                        None => position_ms = 0,
                    }
                    debug!(
                        "Snapshot cursor disagreed with track {}; cursor now {}",
                        track_index,
                        queue.cursor()
                    );
                }
                queue
            }
            None => {
                let natural = PlayQueue::natural(track_count);
                let cursor = natural.position_of(track_index).unwrap_or(0);
                PlayQueue::from_parts(natural.entries().to_vec(), cursor)
            }
        };

        Self {
            book,
            queue,
            position_ms,
        }
    }

    /// Track index under the queue cursor
    pub fn current_track_index(&self) -> usize {
        self.queue.current().unwrap_or(0)
    }

    /// Persisted form of this session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(
            self.book.id.clone(),
            self.current_track_index() as i64,
            self.position_ms as i64,
        )
        .with_queue(self.queue.entries(), self.queue.cursor())
    }
}

fn valid_queue(stored: Option<&[i64]>, track_count: usize) -> Option<Vec<usize>> {
    let stored = stored?;
    if stored.is_empty() || stored.len() != track_count {
        return None;
    }

    stored
        .iter()
        .map(|&entry| usize::try_from(entry).ok().filter(|&e| e < track_count))
        .collect()
}
