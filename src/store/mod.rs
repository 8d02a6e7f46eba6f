//! Durable history store
//!
//! The history is one JSON array of combined records, rewritten in full on
//! every append through a temporary sibling file and an atomic rename, so a
//! reader never observes a partial write. A history that cannot be parsed
//! is moved aside (never deleted) and collection continues on a fresh one.
//!
//! Existing entries are carried as raw JSON values, so records written by
//! earlier versions of the collector keep their exact shape and key order.

mod types;

pub use types::{AppendOutcome, HistorySummary, StoreError};

use crate::collector::CombinedRecord;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// On-disk state of the history file
enum HistoryState {
    Missing,
    Loaded(Vec<Value>),
    Corrupt(String),
}

/// Moves the synced temp file over the history
type ReplaceFn = fn(&Path, &Path) -> io::Result<()>;

/// Append-only JSON history with atomic replacement
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    replace: ReplaceFn,
}

impl HistoryStore {
    /// Create a store for the given history file; nothing is touched until the first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            replace: rename_file,
        }
    }

    #[cfg(test)]
    fn with_replace(mut self, replace: ReplaceFn) -> Self {
        self.replace = replace;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and persist the whole history atomically
    ///
    /// Either the history grows by exactly one record or the call fails and
    /// the file is left as it was. A corrupt history is quarantined first
    /// and the record becomes the first entry of a fresh history.
    pub fn append(&self, record: &CombinedRecord) -> Result<AppendOutcome, StoreError> {
        let entry = serde_json::to_value(record)?;

        let (mut history, recovered_from) = match self.inspect() {
            HistoryState::Missing => (Vec::new(), None),
            HistoryState::Loaded(history) => (history, None),
            HistoryState::Corrupt(reason) => {
                tracing::warn!(path = ?self.path, reason = %reason, "History file is corrupt");
                let backup = self.quarantine()?;
                tracing::warn!(backup = ?backup, "Corrupt history moved aside, starting fresh");
                (Vec::new(), Some(backup))
            }
        };

        history.push(entry);
        let bytes = serde_json::to_vec_pretty(&history)?;
        self.commit(&bytes)?;

        tracing::debug!(
            path = ?self.path,
            records = history.len(),
            bytes = bytes.len(),
            "History persisted"
        );

        Ok(AppendOutcome {
            records: history.len(),
            recovered_from,
        })
    }

    /// Read the history as raw JSON entries without modifying anything
    pub fn load(&self) -> Result<Vec<Value>, StoreError> {
        match self.inspect() {
            HistoryState::Missing => Ok(Vec::new()),
            HistoryState::Loaded(history) => Ok(history),
            HistoryState::Corrupt(reason) => Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason,
            }),
        }
    }

    /// Read the history as typed records
    pub fn load_records(&self) -> Result<Vec<CombinedRecord>, StoreError> {
        self.load()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                    path: self.path.clone(),
                    reason: format!("entry {i}: {e}"),
                })
            })
            .collect()
    }

    /// Exact bytes of the persisted history
    pub fn read_bytes(&self) -> Result<Vec<u8>, StoreError> {
        fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// Overview of the history file and any quarantined copies
    pub fn summary(&self) -> Result<HistorySummary, StoreError> {
        let size_bytes = match fs::metadata(&self.path) {
            Ok(meta) => Some(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let history = self.load()?;
        let timestamp_of = |v: &Value| v.get("timestamp")?.as_str().map(str::to_string);

        Ok(HistorySummary {
            path: self.path.clone(),
            size_bytes,
            records: history.len(),
            first_timestamp: history.first().and_then(timestamp_of),
            last_timestamp: history.last().and_then(timestamp_of),
            backups: self.backups(),
        })
    }

    /// Quarantined copies next to the history file, sorted by name
    pub fn backups(&self) -> Vec<PathBuf> {
        let prefix = self.sibling_name(".bak").to_string_lossy().into_owned();
        let dir = self.dir();
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| is_backup_name(&e.file_name().to_string_lossy(), &prefix))
            .map(|e| e.path())
            .collect();
        backups.sort();
        backups
    }

    /// Read errors other than not-found count as corruption
    fn inspect(&self) -> HistoryState {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return HistoryState::Missing,
            Err(e) => return HistoryState::Corrupt(format!("read error: {e}")),
        };

        if bytes.is_empty() {
            return HistoryState::Loaded(Vec::new());
        }

        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(history) => HistoryState::Loaded(history),
            Err(e) => HistoryState::Corrupt(e.to_string()),
        }
    }

    /// Move the current file to the first free `<name>.bak`, `<name>.bak.1`, ...
    fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let mut backup = self.sibling(".bak");
        let mut n = 1u32;
        while backup.exists() {
            backup = self.sibling(&format!(".bak.{n}"));
            n += 1;
        }

        fs::rename(&self.path, &backup).map_err(|source| StoreError::Quarantine {
            path: self.path.clone(),
            source,
        })?;
        Ok(backup)
    }

    fn commit(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;

        let tmp = self.sibling(".tmp");
        if let Err(source) = write_synced(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write { path: tmp, source });
        }

        if let Err(source) = (self.replace)(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Replace {
                path: self.path.clone(),
                source,
            });
        }

        sync_dir(&dir);
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn sibling_name(&self, suffix: &str) -> OsString {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("history"));
        name.push(suffix);
        name
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        self.dir().join(self.sibling_name(suffix))
    }
}

fn rename_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// `<name>.bak` or `<name>.bak.<n>`
fn is_backup_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('.')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Make the rename itself durable; best-effort
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
