//! Upcoming-birthday projection.
//!
//! # Invariants
//! - Ordering is ascending by days until the next occurrence, recomputed on
//!   every call and never stored.
//! - Ties keep the input order (stable sort), so callers passing records in
//!   `(month, day)` order keep that order among same-day entries.

use crate::calendar::recurrence::{
    age_turning, days_until_next_occurrence, format_display_date, next_occurrence, AgeTurning,
};
use crate::model::birth_record::BirthRecord;
use chrono::{NaiveDate, NaiveDateTime};

/// Display row derived from one record and a reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingBirthday {
    pub record: BirthRecord,
    pub next_date: NaiveDate,
    pub days_until: i64,
    pub age_turning: AgeTurning,
    pub display_date: String,
}

impl UpcomingBirthday {
    pub fn from_record(record: BirthRecord, reference: NaiveDateTime) -> Self {
        Self {
            next_date: next_occurrence(&record, reference),
            days_until: days_until_next_occurrence(&record, reference),
            age_turning: age_turning(&record, reference),
            display_date: format_display_date(&record),
            record,
        }
    }

    pub fn is_today(&self) -> bool {
        self.days_until == 0
    }
}

/// Projects and sorts records into the upcoming list.
pub fn upcoming_birthdays(
    records: impl IntoIterator<Item = BirthRecord>,
    reference: NaiveDateTime,
) -> Vec<UpcomingBirthday> {
    let mut rows = records
        .into_iter()
        .map(|record| UpcomingBirthday::from_record(record, reference))
        .collect::<Vec<_>>();
    rows.sort_by_key(|row| row.days_until);
    rows
}
