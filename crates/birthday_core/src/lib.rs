//! Core domain logic for the birthday tracker.
//! This crate is the single source of truth for record invariants and
//! anniversary arithmetic.

pub mod cache;
pub mod calendar;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cache::local_cache::{CacheError, CacheSnapshot, LocalCache};
pub use calendar::recurrence::{
    age_turning, days_until_next_occurrence, format_display_date, month_name, next_occurrence,
    AgeTurning,
};
pub use calendar::upcoming::{upcoming_birthdays, UpcomingBirthday};
pub use form::state::{parse_birth_date, BirthDate, FormAction, FormError, FormState};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingError,
    LoggingOptions,
};
pub use model::birth_record::{BirthRecord, BirthRecordId, RecordValidationError};
pub use repo::birthday_repo::{BirthdayRepository, RepoError, RepoResult, SqliteBirthdayRepository};
pub use service::birthday_service::{
    ActionOutcome, BirthdayService, RecordSource, RefreshOutcome, ResyncReport, ServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
