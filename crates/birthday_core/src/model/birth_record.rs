//! Birth record domain model.
//!
//! # Responsibility
//! - Define the single entity tracked by the application.
//! - Enforce field-level validation on construction, deserialization and
//!   repository writes.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another record.
//! - `name` is non-empty after trimming.
//! - `day` is within 1..=31 and `month` within 1..=12.
//! - `day` is NOT checked against the month's length; see
//!   [`BirthRecord::is_calendar_exact`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a birth record.
pub type BirthRecordId = Uuid;

/// Validation errors for [`BirthRecord`] invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    NilId,
    EmptyName,
    DayOutOfRange(u32),
    MonthOutOfRange(u32),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be nil"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::DayOutOfRange(day) => write!(f, "day ({day}) must be within 1..=31"),
            Self::MonthOutOfRange(month) => write!(f, "month ({month}) must be within 1..=12"),
        }
    }
}

impl Error for RecordValidationError {}

/// Canonical birthday entry.
///
/// Edits replace a record wholesale; there is no field-level patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BirthRecordWire")]
pub struct BirthRecord {
    pub id: BirthRecordId,
    pub name: String,
    pub day: u32,
    pub month: u32,
    /// Birth year. `None` means the age is unknown.
    pub year: Option<i32>,
    /// Free-text timezone label, display only.
    pub timezone: String,
    /// Unvalidated photo location, display only.
    pub photo_url: Option<String>,
}

impl BirthRecord {
    /// Creates a validated record with a generated id.
    pub fn new(
        name: impl Into<String>,
        day: u32,
        month: u32,
        year: Option<i32>,
    ) -> Result<Self, RecordValidationError> {
        Self::with_id(Uuid::new_v4(), name, day, month, year)
    }

    /// Creates a validated record with a caller-provided id.
    ///
    /// Used by storage and edit paths where identity already exists.
    pub fn with_id(
        id: BirthRecordId,
        name: impl Into<String>,
        day: u32,
        month: u32,
        year: Option<i32>,
    ) -> Result<Self, RecordValidationError> {
        let record = Self {
            id,
            name: name.into(),
            day,
            month,
            year,
            timezone: String::new(),
            photo_url: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Builder-style timezone setter.
    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Builder-style photo setter.
    pub fn with_photo(mut self, photo_url: Option<String>) -> Self {
        self.photo_url = photo_url;
        self
    }

    /// Checks all record invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.is_nil() {
            return Err(RecordValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(RecordValidationError::EmptyName);
        }
        if !(1..=31).contains(&self.day) {
            return Err(RecordValidationError::DayOutOfRange(self.day));
        }
        if !(1..=12).contains(&self.month) {
            return Err(RecordValidationError::MonthOutOfRange(self.month));
        }
        Ok(())
    }

    /// Returns whether `day` exists in `month` for at least one year.
    ///
    /// February 29 counts as exact. Records failing this check are still
    /// accepted; date arithmetic rolls the overflow into the next month.
    pub fn is_calendar_exact(&self) -> bool {
        let max_day = match self.month {
            2 => 29,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        };
        self.day <= max_day
    }

    /// Returns whether an age can be derived for this record.
    pub fn has_year(&self) -> bool {
        self.year.is_some()
    }
}

#[derive(Deserialize)]
struct BirthRecordWire {
    id: BirthRecordId,
    name: String,
    day: u32,
    month: u32,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    photo_url: Option<String>,
}

impl TryFrom<BirthRecordWire> for BirthRecord {
    type Error = RecordValidationError;

    fn try_from(wire: BirthRecordWire) -> Result<Self, Self::Error> {
        let record = Self {
            id: wire.id,
            name: wire.name,
            day: wire.day,
            month: wire.month,
            year: wire.year,
            timezone: wire.timezone,
            photo_url: wire.photo_url,
        };
        record.validate()?;
        Ok(record)
    }
}
