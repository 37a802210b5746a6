//! Tome Core
//!
//! Platform-agnostic types and collaborator traits shared by the Tome
//! audiobook session crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Book`, `Track`, `TrackSource`, `SessionSnapshot`
//! - **Collaborator Traits**: `AudioEngine` (decode/playback) and `SessionStore` (persistence)
//! - **Error Handling**: `EngineError` and `StoreError`
//!
//! # Example
//!
//! ```rust
//! use tome_core::types::{Book, SessionSnapshot, Track, TrackSource};
//!
//! let book = Book::new(
//!     "The Odyssey",
//!     "/audiobooks/odyssey",
//!     vec![
//!         Track::new("01 - Book One.mp3", TrackSource::file("/audiobooks/odyssey/01.mp3")),
//!         Track::new("02 - Book Two.mp3", TrackSource::file("/audiobooks/odyssey/02.mp3")),
//!     ],
//! );
//!
//! let snapshot = SessionSnapshot::new(book.id.clone(), 1, 90_000).with_queue(&[0, 1], 1);
//! assert_eq!(snapshot.queue_order, Some(vec![0, 1]));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{EngineError, Result, StoreError};
pub use traits::{AudioEngine, EngineEvent, EngineEventCallback, SessionStore};
pub use types::{Book, BookId, SessionSnapshot, Track, TrackSource};
