/// Domain types for Tome
pub mod book;
pub mod snapshot;
pub mod track;

pub use book::{Book, BookId};
pub use snapshot::SessionSnapshot;
pub use track::{Track, TrackSource};
