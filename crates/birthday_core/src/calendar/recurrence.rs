//! Anniversary arithmetic over birth records.
//!
//! # Responsibility
//! - Compute the next occurrence of a record's day/month relative to an
//!   explicit reference instant.
//! - Derive countdown, turning age and display label from that occurrence.
//!
//! # Invariants
//! - Functions are pure: same record + same reference -> same result.
//! - The reference instant is always passed in; nothing reads the clock.
//! - Day/month overflow rolls forward (31 April -> 1 May, 29 February in a
//!   common year -> 1 March), so every function is total.

use crate::model::birth_record::BirthRecord;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::fmt::{Display, Formatter};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Age a person turns at their next occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeTurning {
    Known(i32),
    /// Birth year not recorded.
    Unknown,
}

impl AgeTurning {
    pub fn as_option(self) -> Option<i32> {
        match self {
            Self::Known(age) => Some(age),
            Self::Unknown => None,
        }
    }
}

impl Display for AgeTurning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(age) => write!(f, "{age}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Returns the record's anniversary date in `year`, rolling overflow forward.
pub fn anniversary_in(year: i32, month: u32, day: u32) -> NaiveDate {
    let month_index = i64::from(year) * 12 + i64::from(month) - 1;
    let normalized_year = month_index.div_euclid(12) as i32;
    let normalized_month = month_index.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(normalized_year, normalized_month, 1)
        .and_then(|first| first.checked_add_signed(Duration::days(i64::from(day) - 1)))
        // Only reachable outside chrono's representable range.
        .unwrap_or(NaiveDate::MAX)
}

/// Returns the date of the next anniversary on or after the reference day.
pub fn next_occurrence(record: &BirthRecord, reference: NaiveDateTime) -> NaiveDate {
    let today = reference.date();
    let candidate = anniversary_in(today.year(), record.month, record.day);
    if candidate < today {
        anniversary_in(today.year() + 1, record.month, record.day)
    } else {
        candidate
    }
}

/// Whole calendar days from the reference day to the next anniversary.
///
/// Returns 0 when the anniversary is the reference day itself.
pub fn days_until_next_occurrence(record: &BirthRecord, reference: NaiveDateTime) -> i64 {
    next_occurrence(record, reference)
        .signed_duration_since(reference.date())
        .num_days()
}

/// Age the person turns at the next occurrence.
///
/// An anniversary falling on the reference day is treated as not yet passed,
/// so the turning age agrees with [`days_until_next_occurrence`] returning 0.
/// Birth years after the reference year are not guarded; ages beyond the
/// `i32` range saturate.
pub fn age_turning(record: &BirthRecord, reference: NaiveDateTime) -> AgeTurning {
    let Some(birth_year) = record.year else {
        return AgeTurning::Unknown;
    };

    let today = reference.date();
    let mut age = i64::from(today.year()) - i64::from(birth_year);
    if anniversary_in(today.year(), record.month, record.day) >= today {
        age -= 1;
    }
    let age = (age + 1).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    AgeTurning::Known(age as i32)
}

/// Canonical English month name for 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Parses a month name or its three-letter prefix, case-insensitively.
pub fn parse_month_name(value: &str) -> Option<u32> {
    let needle = value.trim().to_ascii_lowercase();
    if needle.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.to_ascii_lowercase().starts_with(needle.as_str()))
        .map(|index| index as u32 + 1)
}

/// Formats `"{day} {Month}"`, e.g. `"5 May"`.
///
/// Months outside 1..=12 render as the bare label `"Month {n}"` instead of
/// failing; the day is omitted since the date cannot be placed.
pub fn format_display_date(record: &BirthRecord) -> String {
    match month_name(record.month) {
        Some(name) => format!("{} {}", record.day, name),
        None => format!("Month {}", record.month),
    }
}
