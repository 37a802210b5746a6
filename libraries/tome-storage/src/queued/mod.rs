//! Background-writing session store
//!
//! Wraps another store and applies its saves on a dedicated thread in the
//! order they were accepted, so a caller on an async runtime never waits on
//! file I/O to record progress.
//!
//! ```text
//! Session actor                 Snapshot writer thread
//!      │                                │
//!      │  save(snapshot)                │
//!      │───────────────────────────────>│ inner.save()
//!      │                                │ (disk I/O)
//!      │  flush()                       │
//!      │───────────────────────────────>│
//!      │<───────────────────────────────│ done
//! ```
//!
//! Reads and clears wait for every pending save first, so they never
//! observe an older record than the caller last saved.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tome_core::{BookId, Result, SessionSnapshot, SessionStore, StoreError};
use tracing::{debug, warn};

enum Job {
    Save(SessionSnapshot),
    Flush(Sender<()>),
}

/// Store whose saves run on a dedicated writer thread
///
/// Dropping the store closes the queue; the writer finishes every accepted
/// save and then exits. Call [`SessionStore::flush`] first when the caller
/// needs the writes to have landed.
pub struct QueuedStore {
    inner: Arc<dyn SessionStore>,
    jobs: Sender<Job>,
    _thread: JoinHandle<()>,
}

impl QueuedStore {
    /// Start the writer thread in front of `inner`
    ///
    /// # Errors
    /// Returns an error if the thread cannot be spawned
    pub fn spawn(inner: Arc<dyn SessionStore>) -> Result<Self> {
        let (jobs, rx) = unbounded();
        let writer = Arc::clone(&inner);

        let thread = thread::Builder::new()
            .name("snapshot-writer".to_string())
            .spawn(move || Self::writer_thread(writer.as_ref(), &rx))?;

        Ok(Self {
            inner,
            jobs,
            _thread: thread,
        })
    }

    fn writer_thread(store: &dyn SessionStore, jobs: &Receiver<Job>) {
        debug!("Snapshot writer started");

        while let Ok(job) = jobs.recv() {
            match job {
                Job::Save(snapshot) => {
                    if let Err(e) = store.save(&snapshot) {
                        warn!(
                            "Failed to write snapshot for {}: {}",
                            snapshot.book_identity, e
                        );
                    }
                }
                Job::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }

        debug!("Snapshot writer stopped");
    }

    fn submit(&self, job: Job) -> Result<()> {
        self.jobs.send(job).map_err(|_| StoreError::WriterStopped)
    }
}

impl SessionStore for QueuedStore {
    fn load(&self, book_id: &BookId) -> Result<Option<SessionSnapshot>> {
        self.flush()?;
        self.inner.load(book_id)
    }

    /// Queue the write; failures of the write itself are logged by the writer
    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.submit(Job::Save(snapshot.clone()))
    }

    fn load_all(&self) -> Result<Vec<SessionSnapshot>> {
        self.flush()?;
        self.inner.load_all()
    }

    fn clear(&self, book_id: &BookId) -> Result<bool> {
        self.flush()?;
        self.inner.clear(book_id)
    }

    fn flush(&self) -> Result<()> {
        let (done, wait) = bounded(1);
        self.submit(Job::Flush(done))?;
        wait.recv().map_err(|_| StoreError::WriterStopped)
    }
}
