//! Birthday repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the relational store used as the system of record.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `BirthRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `list_all` is ordered by `(month, day)` ascending, then `id`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::birth_record::{BirthRecord, BirthRecordId, RecordValidationError};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BIRTHDAY_SELECT_SQL: &str = "SELECT
    id,
    name,
    day,
    month,
    year,
    timezone,
    photo_url
FROM birthdays";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for birthday persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(BirthRecordId),
    AlreadyExists(BirthRecordId),
    InvalidData(String),
    /// Connection has not been migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Store could not be reached at all.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "birthday not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "birthday already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted birthday data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::Unavailable(reason) => write!(f, "birthday store unavailable: {reason}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Relational store interface for birth records.
pub trait BirthdayRepository {
    /// Lists every record ordered by `(month, day)` ascending.
    fn list_all(&self) -> RepoResult<Vec<BirthRecord>>;
    fn get(&self, id: BirthRecordId) -> RepoResult<Option<BirthRecord>>;
    fn insert(&self, record: &BirthRecord) -> RepoResult<()>;
    /// Replaces every field of an existing record.
    fn update(&self, record: &BirthRecord) -> RepoResult<()>;
    fn delete_by_id(&self, id: BirthRecordId) -> RepoResult<()>;
}

impl<R: BirthdayRepository + ?Sized> BirthdayRepository for &R {
    fn list_all(&self) -> RepoResult<Vec<BirthRecord>> {
        (**self).list_all()
    }

    fn get(&self, id: BirthRecordId) -> RepoResult<Option<BirthRecord>> {
        (**self).get(id)
    }

    fn insert(&self, record: &BirthRecord) -> RepoResult<()> {
        (**self).insert(record)
    }

    fn update(&self, record: &BirthRecord) -> RepoResult<()> {
        (**self).update(record)
    }

    fn delete_by_id(&self, id: BirthRecordId) -> RepoResult<()> {
        (**self).delete_by_id(id)
    }
}

/// SQLite-backed birthday repository.
pub struct SqliteBirthdayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBirthdayRepository<'conn> {
    /// Wraps a connection that has been migrated to the latest schema.
    ///
    /// Connections opened through `db::open_db*` always qualify.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl BirthdayRepository for SqliteBirthdayRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<BirthRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIRTHDAY_SELECT_SQL} ORDER BY month ASC, day ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_birthday_row(row)?);
        }

        Ok(records)
    }

    fn get(&self, id: BirthRecordId) -> RepoResult<Option<BirthRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_birthday_row(row)?));
        }

        Ok(None)
    }

    fn insert(&self, record: &BirthRecord) -> RepoResult<()> {
        record.validate()?;

        let result = self.conn.execute(
            "INSERT INTO birthdays (
                id,
                name,
                day,
                month,
                year,
                timezone,
                photo_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.day,
                record.month,
                record.year,
                record.timezone.as_str(),
                record.photo_url.as_deref(),
            ],
        );

        // Field checks already passed, so a constraint failure here is the key.
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::AlreadyExists(record.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, record: &BirthRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE birthdays
             SET
                name = ?1,
                day = ?2,
                month = ?3,
                year = ?4,
                timezone = ?5,
                photo_url = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                record.name.as_str(),
                record.day,
                record.month,
                record.year,
                record.timezone.as_str(),
                record.photo_url.as_deref(),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn delete_by_id(&self, id: BirthRecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM birthdays WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_birthday_row(row: &Row<'_>) -> RepoResult<BirthRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in birthdays.id"))
    })?;

    let record = BirthRecord {
        id,
        name: row.get("name")?,
        day: row.get("day")?,
        month: row.get("month")?,
        year: row.get("year")?,
        timezone: row.get("timezone")?,
        photo_url: row.get("photo_url")?,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("birthday {id_text}: {err}")))?;
    Ok(record)
}
