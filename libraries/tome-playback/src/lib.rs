//! Tome - Playback Session Controller
//!
//! Drives one audio engine through a user-editable play queue for a
//! multi-file audiobook, and persists enough state to resume exactly where
//! the listener left off.
//!
//! This crate provides:
//! - Session state machine (Empty, Loading, Paused, Playing, Error)
//! - Play queue with cursor-preserving reorder/remove/insert
//! - Snapshot restore with clamping and legacy-record fallback
//! - Periodic progress ticks with epoch/generation guards
//! - Single-subscriber event channel
//! - Async actor wrapper with a cloneable handle
//!
//! # Architecture
//!
//! `tome-playback` never touches audio or storage directly:
//! - Audio goes through [`tome_core::AudioEngine`]
//! - Snapshots go through [`tome_core::SessionStore`]
//! - UI state goes out as [`SessionEvent`]s
//!
//! # Example: Actor
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tome_core::{AudioEngine, Book};
//! use tome_playback::{SessionConfig, SessionService};
//!
//! # async fn example(engine: impl AudioEngine + 'static, book: Book) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::load()?;
//! let store = Arc::new(config.open_store()?);
//!
//! let session = SessionService::spawn(engine, store, config);
//! let mut events = session.subscribe().await?;
//!
//! session.load_book(book, true).await?;
//! session.play()?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod queue;
pub mod service;
pub mod session;
pub mod ticker;
pub mod types;

pub use command::{Inbound, SessionCommand};
pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::{Result, SessionError};
pub use events::{Notifier, SessionEvent, TrackLabel};
pub use queue::{PlayQueue, Removal};
pub use service::{SessionHandle, SessionService};
pub use session::SessionState;
pub use ticker::ProgressTicker;
pub use types::{NowPlaying, SessionPhase, SessionView};
