//! Relational birthday store: connection bootstrap and schema.
//!
//! # Responsibility
//! - Open the store file (or an in-memory store for tests) ready for use.
//! - Bring the `birthdays` table and its calendar index up to date.
//!
//! # Invariants
//! - A connection handed out by [`open_db`] or [`open_db_in_memory`] is at
//!   [`migrations::latest_version`].
//! - A store written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The store file was written by a newer build of the tracker.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A schema step failed; the store stays at `from_version`.
    Migration {
        from_version: u32,
        step: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "birthday store error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "birthday store uses schema version {db_version}, but this build only understands up to {latest_supported}; upgrade the tracker or point it at another store file"
            ),
            Self::Migration {
                from_version,
                step,
                source,
            } => write!(
                f,
                "birthday store upgrade `{step}` failed; store left at schema version {from_version}: {source}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
