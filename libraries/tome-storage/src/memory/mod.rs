//! In-memory session store
//!
//! Used by embedders that persist elsewhere (or not at all) and by tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tome_core::{BookId, Result, SessionSnapshot, SessionStore};

/// Volatile session store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<BookId, SessionSnapshot>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BookId, SessionSnapshot>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, book_id: &BookId) -> Result<Option<SessionSnapshot>> {
        Ok(self.lock().get(book_id).cloned())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.lock()
            .insert(snapshot.book_identity.clone(), snapshot.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SessionSnapshot>> {
        let mut all: Vec<_> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.book_identity.cmp(&b.book_identity));
        Ok(all)
    }

    fn clear(&self, book_id: &BookId) -> Result<bool> {
        Ok(self.lock().remove(book_id).is_some())
    }
}
