use birthday_core::db::open_db_in_memory;
use birthday_core::{
    AgeTurning, BirthRecord, BirthRecordId, BirthdayRepository, BirthdayService, LocalCache,
    RecordSource, RepoError, RepoResult, ServiceError, SqliteBirthdayRepository,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::Cell;

/// Store wrapper that can be switched offline between calls.
struct SwitchableStore<'conn> {
    inner: SqliteBirthdayRepository<'conn>,
    offline: Cell<bool>,
}

impl<'conn> SwitchableStore<'conn> {
    fn new(inner: SqliteBirthdayRepository<'conn>) -> Self {
        Self {
            inner,
            offline: Cell::new(false),
        }
    }

    fn check(&self) -> RepoResult<()> {
        if self.offline.get() {
            return Err(RepoError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl BirthdayRepository for SwitchableStore<'_> {
    fn list_all(&self) -> RepoResult<Vec<BirthRecord>> {
        self.check()?;
        self.inner.list_all()
    }

    fn get(&self, id: BirthRecordId) -> RepoResult<Option<BirthRecord>> {
        self.check()?;
        self.inner.get(id)
    }

    fn insert(&self, record: &BirthRecord) -> RepoResult<()> {
        self.check()?;
        self.inner.insert(record)
    }

    fn update(&self, record: &BirthRecord) -> RepoResult<()> {
        self.check()?;
        self.inner.update(record)
    }

    fn delete_by_id(&self, id: BirthRecordId) -> RepoResult<()> {
        self.check()?;
        self.inner.delete_by_id(id)
    }
}

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn add_writes_to_store_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LocalCache::at(dir.path().join("cache.json"));
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let mut service = BirthdayService::new(Some(&repo), cache.clone());

    let record = BirthRecord::new("Ada", 10, 12, Some(1815)).unwrap();
    let outcome = service.add(record.clone()).unwrap();

    assert!(outcome.synced);
    assert_eq!(outcome.message, "Added Ada.");
    assert_eq!(repo.get(record.id).unwrap(), Some(record.clone()));
    assert_eq!(cache.load().records, vec![record]);
}

#[test]
fn add_rejects_duplicate_ids_and_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let mut service = BirthdayService::new(Some(&repo), LocalCache::disabled());

    let record = BirthRecord::new("Once", 1, 1, None).unwrap();
    service.add(record.clone()).unwrap();
    assert_eq!(
        service.add(record.clone()).unwrap_err(),
        ServiceError::AlreadyExists(record.id)
    );

    let mut invalid = BirthRecord::new("Bad", 1, 1, None).unwrap();
    invalid.day = 40;
    assert!(matches!(
        service.add(invalid),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn failed_store_write_keeps_local_state_and_flags_unsynced() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LocalCache::at(dir.path().join("cache.json"));
    let conn = open_db_in_memory().unwrap();
    let store = SwitchableStore::new(SqliteBirthdayRepository::try_new(&conn).unwrap());
    store.offline.set(true);
    let mut service = BirthdayService::new(Some(&store), cache.clone());

    let record = BirthRecord::new("Offline", 3, 3, None).unwrap();
    let outcome = service.add(record.clone()).unwrap();

    assert!(!outcome.synced);
    assert!(outcome.message.contains("Saved locally only"));
    assert!(outcome.message.contains("connection refused"));
    assert_eq!(service.records(), &[record.clone()]);
    assert!(service.is_unsynced(record.id));
    assert!(cache.load().is_unsynced(record.id));

    store.offline.set(false);
    assert!(store.get(record.id).unwrap().is_none());
}

#[test]
fn resync_pushes_pending_inserts_edits_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let store = SwitchableStore::new(SqliteBirthdayRepository::try_new(&conn).unwrap());
    let mut service = BirthdayService::new(Some(&store), LocalCache::disabled());

    let kept = BirthRecord::new("Kept", 1, 1, None).unwrap();
    let removed = BirthRecord::new("Removed", 2, 2, None).unwrap();
    service.add(kept.clone()).unwrap();
    service.add(removed.clone()).unwrap();

    store.offline.set(true);
    let added_offline = BirthRecord::new("Added offline", 3, 3, None).unwrap();
    service.add(added_offline.clone()).unwrap();
    let edited = BirthRecord::with_id(kept.id, "Kept renamed", 1, 1, Some(1999)).unwrap();
    service.edit(edited.clone()).unwrap();
    service.remove(removed.id).unwrap();
    assert_eq!(service.unsynced_count(), 3);

    let failed = service.resync();
    assert_eq!(failed.failed.len(), 3);
    assert!(!failed.is_clean());
    assert_eq!(service.unsynced_count(), 3);

    store.offline.set(false);
    let report = service.resync();
    assert!(report.is_clean());
    assert_eq!(report.pushed.len(), 2);
    assert_eq!(report.deleted, vec![removed.id]);
    assert_eq!(service.unsynced_count(), 0);

    let remote = store.list_all().unwrap();
    assert_eq!(remote, vec![edited, added_offline]);
}

#[test]
fn refresh_falls_back_to_cache_when_store_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LocalCache::at(dir.path().join("cache.json"));
    let conn = open_db_in_memory().unwrap();
    let store = SwitchableStore::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    let record = BirthRecord::new("Cached", 4, 4, None).unwrap();
    {
        let mut service = BirthdayService::new(Some(&store), cache.clone());
        service.add(record.clone()).unwrap();
    }

    store.offline.set(true);
    let mut service = BirthdayService::new(Some(&store), cache);
    let outcome = service.refresh();

    assert_eq!(outcome.source, RecordSource::Cache);
    assert_eq!(outcome.record_count, 1);
    assert!(outcome.message.contains("showing 1 cached birthday(s)"));
    assert_eq!(service.records(), &[record]);
}

#[test]
fn refresh_replaces_cache_with_store_contents() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let remote_only = BirthRecord::new("Remote", 5, 5, None).unwrap();
    repo.insert(&remote_only).unwrap();

    let mut service = BirthdayService::new(Some(&repo), LocalCache::disabled());
    let outcome = service.refresh();

    assert_eq!(outcome.source, RecordSource::Remote);
    assert_eq!(outcome.message, "Loaded 1 birthday(s).");
    assert_eq!(service.records(), &[remote_only]);
}

#[test]
fn cache_only_service_reports_missing_store() {
    let mut service: BirthdayService<SqliteBirthdayRepository<'_>> =
        BirthdayService::new(None, LocalCache::disabled());

    let outcome = service
        .add(BirthRecord::new("Solo", 6, 6, None).unwrap())
        .unwrap();
    assert!(!outcome.synced);
    assert!(outcome.message.contains("no birthday store configured"));
    assert_eq!(service.refresh().source, RecordSource::Cache);
}

#[test]
fn edit_and_remove_unknown_ids_are_rejected() {
    let mut service: BirthdayService<SqliteBirthdayRepository<'_>> =
        BirthdayService::new(None, LocalCache::disabled());
    let stranger = BirthRecord::new("Stranger", 1, 1, None).unwrap();

    assert_eq!(
        service.edit(stranger.clone()).unwrap_err(),
        ServiceError::NotFound(stranger.id)
    );
    assert_eq!(
        service.remove(stranger.id).unwrap_err(),
        ServiceError::NotFound(stranger.id)
    );
}

#[test]
fn upcoming_sorts_by_countdown() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let mut service = BirthdayService::new(Some(&repo), LocalCache::disabled());

    for (name, day, month, year) in [
        ("Early", 2, 1, None),
        ("Sam", 5, 5, Some(1985)),
        ("Late", 30, 12, Some(2000)),
    ] {
        service
            .add(BirthRecord::new(name, day, month, year).unwrap())
            .unwrap();
    }

    let rows = service.upcoming(at(2024, 5, 6));
    let summary = rows
        .iter()
        .map(|row| (row.record.name.as_str(), row.days_until, row.age_turning))
        .collect::<Vec<_>>();

    assert_eq!(
        summary,
        vec![
            ("Late", 238, AgeTurning::Known(24)),
            ("Early", 241, AgeTurning::Unknown),
            ("Sam", 364, AgeTurning::Known(40)),
        ]
    );
}
