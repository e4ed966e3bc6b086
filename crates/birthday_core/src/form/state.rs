//! Immutable form state and its reducer.
//!
//! # Responsibility
//! - Hold raw user input for the add/edit form as a plain value.
//! - Apply edits through [`FormState::reduce`] and convert the result into a
//!   validated [`BirthRecord`] on submit.
//!
//! # Invariants
//! - `reduce` is pure: it consumes the old state and returns the next one.
//! - `FormAction::Reset` yields exactly `FormState::default()`.
//! - Submitting in edit mode keeps the edited record's id.

use crate::calendar::recurrence::parse_month_name;
use crate::model::birth_record::{BirthRecord, BirthRecordId, RecordValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date regex"));
static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:--)?(\d{1,2})-(\d{1,2})$").expect("valid month-day regex"));
static NUMERIC_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.](\d{1,2})(?:[/.](\d{4}))?$").expect("valid numeric date regex")
});
static WORDY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]+)\.?,?(?:\s+(\d{4}))?$").expect("valid wordy date regex")
});

/// Form submission errors, phrased for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingName,
    InvalidDay(String),
    InvalidMonth(String),
    InvalidYear(String),
    UnrecognizedDate(String),
    Record(RecordValidationError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "name is required"),
            Self::InvalidDay(value) => write!(f, "day `{value}` is not a number"),
            Self::InvalidMonth(value) => write!(f, "month `{value}` is not a month"),
            Self::InvalidYear(value) => write!(f, "year `{value}` is not a number"),
            Self::UnrecognizedDate(value) => write!(
                f,
                "date `{value}` not recognized; use YYYY-MM-DD, DD/MM[/YYYY], MM-DD or `5 May [1985]`"
            ),
            Self::Record(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Record(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for FormError {
    fn from(value: RecordValidationError) -> Self {
        match value {
            RecordValidationError::EmptyName => Self::MissingName,
            other => Self::Record(other),
        }
    }
}

/// Parsed day/month/optional-year triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDate {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

/// Raw field values of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub day: String,
    pub month: String,
    pub year: String,
    pub timezone: String,
    pub photo_url: String,
    /// Set while editing an existing record.
    pub editing: Option<BirthRecordId>,
}

/// One user interaction with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    SetName(String),
    SetDay(String),
    SetMonth(String),
    SetYear(String),
    SetTimezone(String),
    SetPhotoUrl(String),
    /// Fills day, month and year at once.
    SetDate(BirthDate),
    /// Loads an existing record for editing.
    BeginEdit(BirthRecord),
    Reset,
}

impl FormState {
    /// Form pre-filled from an existing record, in edit mode.
    pub fn from_record(record: &BirthRecord) -> Self {
        Self {
            name: record.name.clone(),
            day: record.day.to_string(),
            month: record.month.to_string(),
            year: record.year.map(|year| year.to_string()).unwrap_or_default(),
            timezone: record.timezone.clone(),
            photo_url: record.photo_url.clone().unwrap_or_default(),
            editing: Some(record.id),
        }
    }

    /// Returns the next state after applying `action`.
    #[must_use]
    pub fn reduce(self, action: FormAction) -> Self {
        match action {
            FormAction::SetName(name) => Self { name, ..self },
            FormAction::SetDay(day) => Self { day, ..self },
            FormAction::SetMonth(month) => Self { month, ..self },
            FormAction::SetYear(year) => Self { year, ..self },
            FormAction::SetTimezone(timezone) => Self { timezone, ..self },
            FormAction::SetPhotoUrl(photo_url) => Self { photo_url, ..self },
            FormAction::SetDate(date) => Self {
                day: date.day.to_string(),
                month: date.month.to_string(),
                year: date.year.map(|year| year.to_string()).unwrap_or_default(),
                ..self
            },
            FormAction::BeginEdit(record) => Self::from_record(&record),
            FormAction::Reset => Self::default(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Validates the fields and builds the record to persist.
    ///
    /// A blank timezone falls back to `default_timezone`. In edit mode the
    /// result replaces the edited record wholesale.
    pub fn submit(&self, default_timezone: &str) -> Result<BirthRecord, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let day_text = self.day.trim();
        let day = day_text
            .parse::<u32>()
            .map_err(|_| FormError::InvalidDay(day_text.to_string()))?;

        let month_text = self.month.trim();
        let month = month_text
            .parse::<u32>()
            .ok()
            .or_else(|| parse_month_name(month_text))
            .ok_or_else(|| FormError::InvalidMonth(month_text.to_string()))?;

        let year_text = self.year.trim();
        let year = if year_text.is_empty() {
            None
        } else {
            Some(
                year_text
                    .parse::<i32>()
                    .map_err(|_| FormError::InvalidYear(year_text.to_string()))?,
            )
        };

        let timezone = match self.timezone.trim() {
            "" => default_timezone.trim(),
            value => value,
        };
        let photo_url = match self.photo_url.trim() {
            "" => None,
            value => Some(value.to_string()),
        };

        let id = self.editing.unwrap_or_else(Uuid::new_v4);
        let record = BirthRecord::with_id(id, name, day, month, year)?
            .in_timezone(timezone)
            .with_photo(photo_url);
        Ok(record)
    }
}

/// Parses a free-form birth date.
///
/// Accepted shapes: `1985-05-05`, `05-05` / `--05-05` (month first),
/// `5/5` / `5.5.1985` (day first) and `5 May 1985` / `5 may`.
/// Range checks are left to record validation.
pub fn parse_birth_date(input: &str) -> Result<BirthDate, FormError> {
    let trimmed = input.trim();
    let unrecognized = || FormError::UnrecognizedDate(trimmed.to_string());

    if let Some(caps) = ISO_DATE_RE.captures(trimmed) {
        return Ok(BirthDate {
            year: Some(parse_number(&caps[1]).ok_or_else(unrecognized)?),
            month: parse_number(&caps[2]).ok_or_else(unrecognized)?,
            day: parse_number(&caps[3]).ok_or_else(unrecognized)?,
        });
    }

    if let Some(caps) = MONTH_DAY_RE.captures(trimmed) {
        return Ok(BirthDate {
            month: parse_number(&caps[1]).ok_or_else(unrecognized)?,
            day: parse_number(&caps[2]).ok_or_else(unrecognized)?,
            year: None,
        });
    }

    if let Some(caps) = NUMERIC_DATE_RE.captures(trimmed) {
        let year = match caps.get(3) {
            Some(value) => Some(parse_number(value.as_str()).ok_or_else(unrecognized)?),
            None => None,
        };
        return Ok(BirthDate {
            day: parse_number(&caps[1]).ok_or_else(unrecognized)?,
            month: parse_number(&caps[2]).ok_or_else(unrecognized)?,
            year,
        });
    }

    if let Some(caps) = WORDY_DATE_RE.captures(trimmed) {
        let month = parse_month_name(&caps[2])
            .ok_or_else(|| FormError::InvalidMonth(caps[2].to_string()))?;
        let year = match caps.get(3) {
            Some(value) => Some(parse_number(value.as_str()).ok_or_else(unrecognized)?),
            None => None,
        };
        return Ok(BirthDate {
            day: parse_number(&caps[1]).ok_or_else(unrecognized)?,
            month,
            year,
        });
    }

    Err(unrecognized())
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.parse().ok()
}
