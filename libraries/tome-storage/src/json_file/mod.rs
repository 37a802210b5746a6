//! JSON document store for session snapshots
//!
//! Keeps every book's snapshot in a single JSON object keyed by book
//! identity. Records are held decoded-lazily so one corrupt record never
//! hides the others. A document that does not parse at all is moved aside
//! to `<name>.corrupt-<n>` before any write can replace it.

use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tome_core::{BookId, Result, SessionSnapshot, SessionStore, StoreError};
use tracing::{debug, warn};

type Records = BTreeMap<String, Value>;

/// File-backed session store
///
/// Writes go to a sibling temporary file which is then renamed over the
/// document, so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating it lazily on first save
    ///
    /// An unparsable document is renamed to the first free
    /// `<name>.corrupt-<n>` sibling and the store starts empty, so no save
    /// can overwrite the records it still holds.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, or if an
    /// unparsable document cannot be moved aside
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(contents) => match parse_document(&contents) {
                Ok(records) => records,
                Err(e) => {
                    let moved = quarantine(&path)?;
                    warn!(
                        "Unreadable session store {:?} moved to {:?}: {}",
                        path, moved, e
                    );
                    Records::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Records::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("Opened session store {:?} ({} records)", path, records.len());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, records: &Records) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn parse_document(contents: &str) -> serde_json::Result<Records> {
    if contents.trim().is_empty() {
        return Ok(Records::new());
    }
    serde_json::from_str(contents)
}

/// Rename `path` to its first unused `.corrupt-<n>` sibling
fn quarantine(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().map(OsString::from).unwrap_or_default();
    let target = (1u32..)
        .map(|n| {
            let mut candidate = name.clone();
            candidate.push(format!(".corrupt-{n}"));
            path.with_file_name(candidate)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.with_extension("corrupt"));
    fs::rename(path, &target)?;
    Ok(target)
}

fn decode(book_id: &str, value: &Value) -> Result<SessionSnapshot> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::corrupt(book_id, e.to_string()))
}

impl SessionStore for JsonFileStore {
    fn load(&self, book_id: &BookId) -> Result<Option<SessionSnapshot>> {
        let records = self.lock();
        records
            .get(book_id.as_str())
            .map(|value| decode(book_id.as_str(), value))
            .transpose()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut records = self.lock();
        records.insert(
            snapshot.book_identity.as_str().to_string(),
            serde_json::to_value(snapshot)?,
        );
        self.flush(&records)
    }

    fn load_all(&self) -> Result<Vec<SessionSnapshot>> {
        let records = self.lock();
        let snapshots = records
            .iter()
            .filter_map(|(key, value)| match decode(key, value) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Skipping snapshot: {}", e);
                    None
                }
            })
            .collect();
        Ok(snapshots)
    }

    fn clear(&self, book_id: &BookId) -> Result<bool> {
        let mut records = self.lock();
        if records.remove(book_id.as_str()).is_none() {
            return Ok(false);
        }
        self.flush(&records)?;
        Ok(true)
    }
}
