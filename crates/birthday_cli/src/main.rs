//! Command-line front end for the birthday tracker.
//!
//! # Responsibility
//! - Translate commands into form actions and service calls.
//! - Supply the reference instant (local wall-clock time) to the core.

mod config;
mod render;

use anyhow::{bail, Context, Result};
use birthday_core::db::open_db;
use birthday_core::{
    init_logging_with, parse_birth_date, BirthRecord, BirthRecordId, BirthdayRepository,
    BirthdayService, FormAction, FormState, LocalCache, LoggingOptions, RecordSource,
    SqliteBirthdayRepository, UpcomingBirthday,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "birthdays")]
#[command(about = "Track birthdays and see who is up next", version)]
struct Cli {
    /// Config file to use instead of ~/.config/birthdays/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new birthday
    Add {
        #[arg(short, long)]
        name: String,

        /// Birth date: 1985-05-05, 5/5/1985, 05-05 or "5 May 1985"
        #[arg(short, long)]
        date: String,

        /// Timezone label (defaults to default_timezone from config)
        #[arg(short, long)]
        timezone: Option<String>,

        /// Photo URL
        #[arg(short, long)]
        photo: Option<String>,
    },
    /// Replace fields of an existing birthday
    Edit {
        /// Record id or unique id prefix
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        timezone: Option<String>,

        #[arg(short, long, conflicts_with = "clear_photo")]
        photo: Option<String>,

        /// Remove the stored photo URL
        #[arg(long)]
        clear_photo: bool,
    },
    /// Delete a birthday
    Remove {
        /// Record id or unique id prefix
        id: String,
    },
    /// List upcoming birthdays, soonest first
    List {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
    },
    /// Show one birthday in detail
    Show {
        /// Record id or unique id prefix
        id: String,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
    },
    /// Retry store writes that previously failed
    Resync,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level()
    };
    let log_dir = config.log_dir()?;
    if let Err(err) = init_logging_with(
        level,
        &log_dir.to_string_lossy(),
        LoggingOptions {
            echo_warnings: true,
        },
    ) {
        eprintln!("warning: logging disabled: {err}");
    }

    let cache = if config.cache_enabled {
        LocalCache::at(config.cache_path()?)
    } else {
        LocalCache::disabled()
    };

    let database_path = config.database_path()?;
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = match open_db(&database_path) {
        Ok(conn) => Some(conn),
        Err(err) => {
            warn!(
                "event=cli_start module=cli status=degraded error_code=store_unavailable error={}",
                err
            );
            None
        }
    };
    let repo = conn
        .as_ref()
        .and_then(|conn| match SqliteBirthdayRepository::try_new(conn) {
            Ok(repo) => Some(repo),
            Err(err) => {
                warn!(
                    "event=cli_start module=cli status=degraded error_code=store_schema error={}",
                    err
                );
                None
            }
        });

    let mut service = BirthdayService::new(repo, cache);
    let refresh = service.refresh();
    info!(
        "event=cli_start module=cli status=ok source={:?} records={}",
        refresh.source, refresh.record_count
    );

    match cli.command {
        Commands::Add {
            name,
            date,
            timezone,
            photo,
        } => {
            let mut actions = vec![
                FormAction::SetName(name),
                FormAction::SetDate(parse_birth_date(&date)?),
            ];
            actions.extend(timezone.map(FormAction::SetTimezone));
            actions.extend(photo.map(FormAction::SetPhotoUrl));

            let record = submit_form(FormState::default(), actions, &config.default_timezone)?;
            let outcome = service.add(record)?;
            println!("{}", outcome.message);
        }
        Commands::Edit {
            id,
            name,
            date,
            timezone,
            photo,
            clear_photo,
        } => {
            let existing = find_record(&service, &id)?.clone();
            let mut actions = vec![FormAction::BeginEdit(existing)];
            actions.extend(name.map(FormAction::SetName));
            if let Some(date) = date {
                actions.push(FormAction::SetDate(parse_birth_date(&date)?));
            }
            actions.extend(timezone.map(FormAction::SetTimezone));
            actions.extend(photo.map(FormAction::SetPhotoUrl));
            if clear_photo {
                actions.push(FormAction::SetPhotoUrl(String::new()));
            }

            let record = submit_form(FormState::default(), actions, &config.default_timezone)?;
            let outcome = service.edit(record)?;
            println!("{}", outcome.message);
        }
        Commands::Remove { id } => {
            let target = find_record(&service, &id)?.id;
            let outcome = service.remove(target)?;
            println!("{}", outcome.message);
        }
        Commands::List { today } => {
            if refresh.source == RecordSource::Cache {
                eprintln!("{}", refresh.message);
            }
            let rows = service.upcoming(reference_instant(today));
            if rows.is_empty() {
                println!("No birthdays recorded yet. Add one with `birthdays add`.");
            }
            for row in &rows {
                println!(
                    "{}",
                    render::format_row(row, service.is_unsynced(row.record.id))
                );
            }
            if service.unsynced_count() > 0 {
                eprintln!(
                    "{} change(s) not saved to the store; run `birthdays resync`.",
                    service.unsynced_count()
                );
            }
        }
        Commands::Show { id, today } => {
            let record = find_record(&service, &id)?.clone();
            let unsynced = service.is_unsynced(record.id);
            let row = UpcomingBirthday::from_record(record, reference_instant(today));
            println!("{}", render::format_detail(&row, unsynced));
        }
        Commands::Resync => {
            let report = service.resync();
            println!("{}", report.message());
            for (id, reason) in &report.failed {
                eprintln!("  {id}: {reason}");
            }
            if !report.is_clean() {
                bail!("{} change(s) could not be synced", report.failed.len());
            }
        }
    }

    Ok(())
}

fn submit_form(
    initial: FormState,
    actions: Vec<FormAction>,
    default_timezone: &str,
) -> Result<BirthRecord> {
    let state = actions.into_iter().fold(initial, FormState::reduce);
    let record = state.submit(default_timezone)?;
    if !record.is_calendar_exact() {
        eprintln!(
            "warning: day {} does not exist in month {}; it will be counted as the following day(s) of the next month",
            record.day, record.month
        );
    }
    Ok(record)
}

/// Resolves a full id or a unique prefix of the simple (dashless) id form.
fn find_record<'a, R>(service: &'a BirthdayService<R>, needle: &str) -> Result<&'a BirthRecord>
where
    R: BirthdayRepository,
{
    if let Ok(id) = needle.parse::<BirthRecordId>() {
        return service
            .get(id)
            .with_context(|| format!("No birthday with id {id}"));
    }

    let prefix = needle.trim().replace('-', "").to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("Record id must not be empty");
    }
    let mut matches = service
        .records()
        .iter()
        .filter(|record| record.id.simple().to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record),
        (None, _) => bail!("No birthday matches id `{needle}`"),
        (Some(_), Some(_)) => bail!("Id `{needle}` is ambiguous; use more characters"),
    }
}

fn reference_instant(today: Option<NaiveDate>) -> NaiveDateTime {
    match today {
        Some(day) => day.and_time(NaiveTime::default()),
        None => Local::now().naive_local(),
    }
}

fn parse_day(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
