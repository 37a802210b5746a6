//! Play queue with a cursor
//!
//! The queue holds track *indices* in playback order, independent of the
//! book's natural file order. Every mutation rewrites the cursor so that it
//! keeps pointing at the loaded entry unless the edit targets that entry:
//!
//! ```text
//! entries: [0, 1, 2]     reorder(0, 2)     entries: [1, 2, 0]
//! cursor:      ^                           cursor:   ^
//!          (track 1)                             (track 1)
//! ```
//!
//! Duplicates are allowed once `insert` adds an index already present.

use crate::error::{Result, SessionError};

/// Outcome of [`PlayQueue::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Another entry was removed; the loaded entry is unchanged
    Other,

    /// The entry under the cursor was removed; the cursor now names a new entry
    Current,
}

/// Ordered track indices plus the position of the loaded entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayQueue {
    entries: Vec<usize>,
    cursor: usize,
}

impl PlayQueue {
    /// Natural order `0..track_count`, cursor on the first entry
    pub fn natural(track_count: usize) -> Self {
        Self {
            entries: (0..track_count).collect(),
            cursor: 0,
        }
    }

    /// Queue from explicit entries; the cursor is clamped into range
    pub fn from_parts(entries: Vec<usize>, cursor: usize) -> Self {
        let cursor = cursor.min(entries.len().saturating_sub(1));
        Self { entries, cursor }
    }

    /// Entries in playback order
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// Position of the loaded entry
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Track index under the cursor
    pub fn current(&self) -> Option<usize> {
        self.entries.get(self.cursor).copied()
    }

    /// First queue position holding `track_index`
    pub fn position_of(&self, track_index: usize) -> Option<usize> {
        self.entries.iter().position(|&t| t == track_index)
    }

    /// Whether the cursor can move forward
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Whether the cursor can move back
    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    fn check(&self, position: usize) -> Result<()> {
        if position < self.entries.len() {
            Ok(())
        } else {
            Err(SessionError::InvalidIndex {
                index: position,
                len: self.entries.len(),
            })
        }
    }

    /// Point the cursor at `position`, returning the track index there
    pub fn set_cursor(&mut self, position: usize) -> Result<usize> {
        self.check(position)?;
        self.cursor = position;
        Ok(self.entries[position])
    }

    /// Move the cursor one entry forward, returning the new track index
    ///
    /// Returns `None` (cursor unchanged) when already on the last entry.
    pub fn advance(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Move the entry at `from` so it ends up at `to`
    ///
    /// This is an array move, not a swap.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check(from)?;
        self.check(to)?;

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);

        let cursor = self.cursor;
        if from == cursor {
            self.cursor = to;
        } else if from < cursor && cursor <= to {
            self.cursor -= 1;
        } else if to <= cursor && cursor < from {
            self.cursor += 1;
        }

        Ok(())
    }

    /// Remove the entry at `position`
    ///
    /// Refuses to empty the queue. Removing the loaded entry clamps the
    /// cursor to `min(cursor, len - 2)` where `len` is the length after
    /// removal, so `[0, 1, 2]` with the cursor on `1` ends as `[0, 2]` with
    /// the cursor on `0`.
    pub fn remove(&mut self, position: usize) -> Result<Removal> {
        self.check(position)?;
        if self.entries.len() == 1 {
            return Err(SessionError::LastQueueEntry);
        }

        self.entries.remove(position);

        if position == self.cursor {
            self.cursor = self.cursor.min(self.entries.len().saturating_sub(2));
            Ok(Removal::Current)
        } else {
            if position < self.cursor {
                self.cursor -= 1;
            }
            Ok(Removal::Other)
        }
    }

    /// Insert `track_index` at `position`, or append when `position` is
    /// `None` or past the end
    ///
    /// Returns the position the entry landed at.
    pub fn insert(&mut self, track_index: usize, position: Option<usize>) -> usize {
        match position {
            Some(position) if position < self.entries.len() => {
                self.entries.insert(position, track_index);
                if position <= self.cursor {
                    self.cursor += 1;
                }
                position
            }
            _ => {
                self.entries.push(track_index);
                self.entries.len() - 1
            }
        }
    }
}
