//! Tome Storage
//!
//! Session snapshot stores implementing [`tome_core::SessionStore`].
//!
//! # Architecture
//!
//! - **One record per book**: each save overwrites the snapshot for its book identity
//! - **Vertical Slicing**: each backend owns its own module
//! - **Best-effort reads**: a corrupt record is reported for that book only
//! - **Off-thread writes**: [`QueuedStore`] moves saves onto a writer thread
//!
//! # Example
//!
//! ```rust,no_run
//! use tome_core::{BookId, SessionSnapshot, SessionStore};
//! use tome_storage::JsonFileStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonFileStore::open("./data/sessions.json")?;
//!
//! let snapshot = SessionSnapshot::new(BookId::new("/audiobooks/odyssey"), 3, 125_000);
//! store.save(&snapshot)?;
//!
//! let restored = store.load(&snapshot.book_identity)?;
//! assert_eq!(restored, Some(snapshot));
//! # Ok(())
//! # }
//! ```

pub mod json_file;
pub mod memory;
pub mod queued;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use queued::QueuedStore;
