//! Schema steps for the birthday store.
//!
//! | version | step | effect |
//! |---|---|---|
//! | 1 | `birthdays` | records table with day/month range checks |
//! | 2 | `calendar_index` | `(month, day, id)` index backing list order |
//!
//! # Invariants
//! - Versions are strictly increasing and never reused.
//! - All pending steps run in one transaction; a failed step leaves the
//!   store at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    step: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        step: "birthdays",
        sql: include_str!("0001_birthdays.sql"),
    },
    Migration {
        version: 2,
        step: "calendar_index",
        sql: include_str!("0002_calendar_index.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Upgrades the store to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        debug!(
            "event=db_migrate module=db status=skip version={}",
            from_version
        );
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut applied = 0usize;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        run_step(&tx, migration).map_err(|source| {
            error!(
                "event=db_migrate module=db status=error step={} version={} error={}",
                migration.step, migration.version, source
            );
            DbError::Migration {
                from_version,
                step: migration.step,
                source,
            }
        })?;
        applied += 1;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version, latest, applied
    );
    Ok(())
}

/// Schema version recorded in the store file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn run_step(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    conn.execute_batch(migration.sql)?;
    conn.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
}
