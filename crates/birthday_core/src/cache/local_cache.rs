//! JSON snapshot cache for birth records.
//!
//! # Responsibility
//! - Keep a local copy of the record list for use when the store is down.
//! - Track which record ids have local changes the store has not accepted.
//!
//! # Invariants
//! - `load` never fails: missing, unreadable or corrupt files yield an empty
//!   snapshot.
//! - `save` replaces the file atomically (write temp file, then rename).
//! - A disabled cache ignores `save` and always loads empty.

use crate::model::birth_record::{BirthRecord, BirthRecordId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug)]
pub enum CacheError {
    Io { path: PathBuf, source: io::Error },
    Encode(serde_json::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cache file `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode cache snapshot: {err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Cached record list plus ids pending a store write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default = "snapshot_format_version")]
    pub version: u32,
    #[serde(default)]
    pub records: Vec<BirthRecord>,
    /// Ids whose latest local change (insert, edit or delete) is not in the store.
    #[serde(default)]
    pub unsynced: BTreeSet<BirthRecordId>,
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            records: Vec::new(),
            unsynced: BTreeSet::new(),
        }
    }
}

impl CacheSnapshot {
    pub fn with_records(records: Vec<BirthRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn get(&self, id: BirthRecordId) -> Option<&BirthRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Inserts or wholesale-replaces the record with the same id.
    pub fn upsert(&mut self, record: BirthRecord) {
        match self.records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Removes a record, returning it when present.
    pub fn remove(&mut self, id: BirthRecordId) -> Option<BirthRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn mark_unsynced(&mut self, id: BirthRecordId) {
        self.unsynced.insert(id);
    }

    pub fn mark_synced(&mut self, id: BirthRecordId) {
        self.unsynced.remove(&id);
    }

    pub fn is_unsynced(&self, id: BirthRecordId) -> bool {
        self.unsynced.contains(&id)
    }

    /// Replaces the record list with store contents, keeping unsynced local
    /// versions and dropping records the store no longer has.
    pub fn merge_remote(&mut self, remote: Vec<BirthRecord>) {
        let mut merged = Vec::with_capacity(remote.len());
        for record in remote {
            if self.unsynced.contains(&record.id) {
                // Local version wins; a missing local copy means a pending delete.
                if let Some(local) = self.get(record.id) {
                    merged.push(local.clone());
                }
            } else {
                merged.push(record);
            }
        }
        for local in &self.records {
            let pending_insert = self.unsynced.contains(&local.id)
                && !merged.iter().any(|record| record.id == local.id);
            if pending_insert {
                merged.push(local.clone());
            }
        }
        self.records = merged;
    }
}

fn snapshot_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

/// File-backed snapshot cache.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: Option<PathBuf>,
}

impl LocalCache {
    /// Cache persisted at `path`. Parent directories are created on save.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Cache for non-interactive contexts: loads empty, saves nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the cached snapshot, swallowing every read or decode failure.
    pub fn load(&self) -> CacheSnapshot {
        let Some(path) = self.path.as_deref() else {
            return CacheSnapshot::default();
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("event=cache_load module=cache status=miss");
                return CacheSnapshot::default();
            }
            Err(err) => {
                warn!(
                    "event=cache_load module=cache status=error error_code=cache_read_failed error={}",
                    err
                );
                return CacheSnapshot::default();
            }
        };

        match serde_json::from_slice::<CacheSnapshot>(&bytes) {
            Ok(snapshot) => {
                debug!(
                    "event=cache_load module=cache status=ok records={} unsynced={}",
                    snapshot.records.len(),
                    snapshot.unsynced.len()
                );
                snapshot
            }
            Err(err) => {
                warn!(
                    "event=cache_load module=cache status=reset error_code=cache_corrupt error={}",
                    err
                );
                CacheSnapshot::default()
            }
        }
    }

    /// Persists the snapshot. No-op for a disabled cache.
    pub fn save(&self, snapshot: &CacheSnapshot) -> CacheResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let encoded = serde_json::to_vec_pretty(snapshot).map_err(CacheError::Encode)?;
        write_atomically(path, &encoded).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "event=cache_save module=cache status=ok records={} unsynced={}",
            snapshot.records.len(),
            snapshot.unsynced.len()
        );
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}
