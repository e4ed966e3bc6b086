use birthday_core::db::migrations::latest_version;
use birthday_core::db::open_db_in_memory;
use birthday_core::{BirthRecord, BirthdayRepository, RepoError, SqliteBirthdayRepository};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let record = BirthRecord::new("Ada", 10, 12, Some(1815))
        .unwrap()
        .in_timezone("Europe/London")
        .with_photo(Some("ada.png".to_string()));
    repo.insert(&record).unwrap();

    let loaded = repo.get(record.id).unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn insert_duplicate_id_returns_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let record = BirthRecord::new("Twice", 1, 1, None).unwrap();
    repo.insert(&record).unwrap();

    let err = repo.insert(&record).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == record.id));
}

#[test]
fn update_replaces_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let record = BirthRecord::new("Draft", 1, 2, Some(1990))
        .unwrap()
        .in_timezone("UTC")
        .with_photo(Some("old.png".to_string()));
    repo.insert(&record).unwrap();

    let replacement = BirthRecord::with_id(record.id, "Final", 3, 4, None)
        .unwrap()
        .in_timezone("Asia/Tokyo");
    repo.update(&replacement).unwrap();

    let loaded = repo.get(record.id).unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert_eq!(loaded.photo_url, None);
    assert_eq!(loaded.year, None);
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let record = BirthRecord::new("Missing", 1, 1, None).unwrap();
    let update_err = repo.update(&record).unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == record.id));

    let delete_err = repo.delete_by_id(record.id).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == record.id));
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let record = BirthRecord::new("Gone", 7, 7, None).unwrap();
    repo.insert(&record).unwrap();
    repo.delete_by_id(record.id).unwrap();

    assert!(repo.get(record.id).unwrap().is_none());
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn list_all_orders_by_month_then_day() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let december = BirthRecord::new("December", 1, 12, None).unwrap();
    let march_late = BirthRecord::new("March late", 30, 3, None).unwrap();
    let march_early = BirthRecord::new("March early", 2, 3, None).unwrap();
    let january = BirthRecord::new("January", 31, 1, None).unwrap();
    for record in [&december, &march_late, &march_early, &january] {
        repo.insert(record).unwrap();
    }

    let names = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|record| record.name)
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["January", "March early", "March late", "December"]
    );
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let mut record = BirthRecord::new("Valid", 1, 1, None).unwrap();
    record.month = 0;
    assert!(matches!(
        repo.insert(&record).unwrap_err(),
        RepoError::Validation(_)
    ));

    record.month = 1;
    repo.insert(&record).unwrap();
    record.name = "   ".to_string();
    assert!(matches!(
        repo.update(&record).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn read_rejects_corrupt_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO birthdays (id, name, day, month) VALUES ('not-a-uuid', 'Broken', 1, 1);",
        [],
    )
    .unwrap();

    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let err = repo.list_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBirthdayRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_works_through_shared_reference() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let by_ref = &repo;

    let record = BirthRecord::with_id(
        Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap(),
        "Ref",
        4,
        4,
        None,
    )
    .unwrap();
    BirthdayRepository::insert(&by_ref, &record).unwrap();
    assert_eq!(repo.list_all().unwrap(), vec![record]);
}
