//! Birthday use-case service.
//!
//! # Responsibility
//! - Keep the local cache and the relational store in step for every write.
//! - Turn store failures into user-facing status messages.
//! - Derive the upcoming list from the current records.
//!
//! # Invariants
//! - Local state is updated first and is never rolled back on store failure.
//! - A failed store write flags the record id as unsynced; only
//!   [`BirthdayService::resync`] clears that flag for failed writes.
//! - No store failure is returned as `Err`; `Err` is reserved for invalid
//!   requests (bad record, unknown id, duplicate id).

use crate::cache::local_cache::{CacheSnapshot, LocalCache};
use crate::calendar::upcoming::{upcoming_birthdays, UpcomingBirthday};
use crate::model::birth_record::{BirthRecord, BirthRecordId, RecordValidationError};
use crate::repo::birthday_repo::{BirthdayRepository, RepoError, RepoResult};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request-level errors. Store failures are reported via outcomes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Validation(RecordValidationError),
    NotFound(BirthRecordId),
    AlreadyExists(BirthRecordId),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "no birthday with id {id}"),
            Self::AlreadyExists(id) => write!(f, "a birthday with id {id} already exists"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for ServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Where the current record list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Remote,
    Cache,
}

/// Result of reloading records from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub source: RecordSource,
    pub record_count: usize,
    pub message: String,
}

/// Result of one add/edit/remove request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub record_id: BirthRecordId,
    /// Whether the store accepted the write.
    pub synced: bool,
    pub message: String,
}

/// Result of a manual resync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncReport {
    pub pushed: Vec<BirthRecordId>,
    pub deleted: Vec<BirthRecordId>,
    pub failed: Vec<(BirthRecordId, String)>,
}

impl ResyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn message(&self) -> String {
        if self.pushed.is_empty() && self.deleted.is_empty() && self.failed.is_empty() {
            return "Everything is already synced.".to_string();
        }
        let mut message = format!(
            "Synced {} change(s), removed {} record(s) from the store.",
            self.pushed.len(),
            self.deleted.len()
        );
        if !self.failed.is_empty() {
            message.push_str(&format!(" {} change(s) still unsynced.", self.failed.len()));
        }
        message
    }
}

/// Service facade over the relational store and the local cache.
pub struct BirthdayService<R: BirthdayRepository> {
    remote: Option<R>,
    cache: LocalCache,
    snapshot: CacheSnapshot,
}

impl<R: BirthdayRepository> BirthdayService<R> {
    /// Creates a service seeded from the cache contents.
    ///
    /// `remote = None` runs cache-only; every store call reports unavailable.
    pub fn new(remote: Option<R>, cache: LocalCache) -> Self {
        let snapshot = cache.load();
        Self {
            remote,
            cache,
            snapshot,
        }
    }

    /// Current records in store order, including unsynced local changes.
    pub fn records(&self) -> &[BirthRecord] {
        &self.snapshot.records
    }

    pub fn get(&self, id: BirthRecordId) -> Option<&BirthRecord> {
        self.snapshot.get(id)
    }

    pub fn is_unsynced(&self, id: BirthRecordId) -> bool {
        self.snapshot.is_unsynced(id)
    }

    pub fn unsynced_count(&self) -> usize {
        self.snapshot.unsynced.len()
    }

    /// Reloads records from the store, falling back to the cache on failure.
    pub fn refresh(&mut self) -> RefreshOutcome {
        match self.remote().and_then(|remote| remote.list_all()) {
            Ok(remote_records) => {
                self.snapshot.merge_remote(remote_records);
                let cache_note = self.persist_cache();
                let count = self.snapshot.records.len();
                info!(
                    "event=remote_read module=service status=ok records={}",
                    count
                );
                RefreshOutcome {
                    source: RecordSource::Remote,
                    record_count: count,
                    message: with_note(format!("Loaded {count} birthday(s)."), cache_note),
                }
            }
            Err(err) => {
                let count = self.snapshot.records.len();
                warn!(
                    "event=remote_read module=service status=error fallback=cache records={} error={}",
                    count, err
                );
                RefreshOutcome {
                    source: RecordSource::Cache,
                    record_count: count,
                    message: format!(
                        "Could not load birthdays from the store ({err}); showing {count} cached birthday(s)."
                    ),
                }
            }
        }
    }

    /// Adds a new record locally and in the store.
    pub fn add(&mut self, record: BirthRecord) -> Result<ActionOutcome, ServiceError> {
        record.validate()?;
        if self.snapshot.get(record.id).is_some() {
            return Err(ServiceError::AlreadyExists(record.id));
        }

        let id = record.id;
        let name = record.name.clone();
        let remote_result = self.remote().and_then(|remote| remote.insert(&record));
        self.snapshot.upsert(record);

        Ok(self.finish_write(id, "insert", remote_result, format!("Added {name}.")))
    }

    /// Replaces an existing record wholesale, locally and in the store.
    pub fn edit(&mut self, record: BirthRecord) -> Result<ActionOutcome, ServiceError> {
        record.validate()?;
        if self.snapshot.get(record.id).is_none() {
            return Err(ServiceError::NotFound(record.id));
        }

        let id = record.id;
        let name = record.name.clone();
        let remote_result = self.remote().and_then(|remote| push_record(remote, &record));
        self.snapshot.upsert(record);

        Ok(self.finish_write(id, "update", remote_result, format!("Updated {name}.")))
    }

    /// Removes a record locally and from the store.
    pub fn remove(&mut self, id: BirthRecordId) -> Result<ActionOutcome, ServiceError> {
        let Some(removed) = self.snapshot.remove(id) else {
            return Err(ServiceError::NotFound(id));
        };

        let remote_result = self.remote().and_then(|remote| delete_remote(remote, id));
        Ok(self.finish_write(
            id,
            "delete",
            remote_result,
            format!("Removed {}.", removed.name),
        ))
    }

    /// Retries every unsynced change against the store once.
    ///
    /// Records still present locally are pushed (update, or insert when the
    /// store lacks them); ids absent locally are deleted from the store.
    pub fn resync(&mut self) -> ResyncReport {
        let mut report = ResyncReport::default();
        let pending = self.snapshot.unsynced.iter().copied().collect::<Vec<_>>();

        for id in pending {
            let local = self.snapshot.get(id).cloned();
            let result = self.remote().and_then(|remote| match &local {
                Some(record) => push_record(remote, record),
                None => delete_remote(remote, id),
            });

            match result {
                Ok(()) => {
                    self.snapshot.mark_synced(id);
                    if local.is_some() {
                        report.pushed.push(id);
                    } else {
                        report.deleted.push(id);
                    }
                }
                Err(err) => {
                    warn!(
                        "event=resync module=service status=error id={} error={}",
                        id, err
                    );
                    report.failed.push((id, err.to_string()));
                }
            }
        }

        if let Some(note) = self.persist_cache() {
            warn!("event=resync module=service status=partial detail={}", note);
        }
        info!(
            "event=resync module=service status=done pushed={} deleted={} failed={}",
            report.pushed.len(),
            report.deleted.len(),
            report.failed.len()
        );
        report
    }

    /// Upcoming list sorted by days until next occurrence.
    ///
    /// Ties are broken by `(month, day)` order, then id.
    pub fn upcoming(&self, reference: NaiveDateTime) -> Vec<UpcomingBirthday> {
        let mut records = self.snapshot.records.clone();
        records.sort_by_key(|record| (record.month, record.day, record.id));
        upcoming_birthdays(records, reference)
    }

    fn remote(&self) -> RepoResult<&R> {
        self.remote
            .as_ref()
            .ok_or_else(|| RepoError::Unavailable("no birthday store configured".to_string()))
    }

    fn finish_write(
        &mut self,
        id: BirthRecordId,
        op: &str,
        remote_result: RepoResult<()>,
        success_message: String,
    ) -> ActionOutcome {
        let (synced, message) = match remote_result {
            Ok(()) => {
                self.snapshot.mark_synced(id);
                info!(
                    "event=remote_write module=service status=ok op={} id={}",
                    op, id
                );
                (true, success_message)
            }
            Err(err) => {
                self.snapshot.mark_unsynced(id);
                warn!(
                    "event=remote_write module=service status=error op={} id={} error={}",
                    op, id, err
                );
                (
                    false,
                    format!("{success_message} Saved locally only; store write failed: {err}"),
                )
            }
        };

        let cache_note = self.persist_cache();
        ActionOutcome {
            record_id: id,
            synced,
            message: with_note(message, cache_note),
        }
    }

    fn persist_cache(&self) -> Option<String> {
        match self.cache.save(&self.snapshot) {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    "event=cache_save module=service status=error error={}",
                    err
                );
                Some(format!("Local cache not updated: {err}"))
            }
        }
    }
}

/// Updates the record in the store, inserting it when the store lacks it.
fn push_record<R: BirthdayRepository>(remote: &R, record: &BirthRecord) -> RepoResult<()> {
    match remote.update(record) {
        Err(RepoError::NotFound(_)) => remote.insert(record),
        other => other,
    }
}

/// Deletes from the store; an already-missing row counts as deleted.
fn delete_remote<R: BirthdayRepository>(remote: &R, id: BirthRecordId) -> RepoResult<()> {
    match remote.delete_by_id(id) {
        Err(RepoError::NotFound(_)) => Ok(()),
        other => other,
    }
}

fn with_note(message: String, note: Option<String>) -> String {
    match note {
        Some(note) => format!("{message} {note}"),
        None => message,
    }
}
