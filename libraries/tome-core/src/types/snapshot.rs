/// Persisted session snapshot, one record per book
use super::book::BookId;
use serde::{Deserialize, Serialize};

/// Serialized form of a playback session
///
/// Indices and positions are signed so records written by older or
/// foreign writers can be read back and clamped instead of rejected.
/// `queue_order` and `queue_current_index` are absent in records written
/// before queue persistence existed; absence means "use natural order".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub book_identity: BookId,

    pub current_track_index: i64,

    pub current_position_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_order: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_current_index: Option<i64>,
}

impl SessionSnapshot {
    /// Snapshot without queue information
    pub fn new(book_identity: BookId, current_track_index: i64, current_position_ms: i64) -> Self {
        Self {
            book_identity,
            current_track_index,
            current_position_ms,
            queue_order: None,
            queue_current_index: None,
        }
    }

    /// Attach a queue and its cursor
    #[must_use]
    pub fn with_queue(mut self, queue: &[usize], cursor: usize) -> Self {
        self.queue_order = Some(queue.iter().map(|&i| i as i64).collect());
        self.queue_current_index = Some(cursor as i64);
        self
    }
}
