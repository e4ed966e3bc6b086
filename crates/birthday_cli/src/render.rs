//! Plain-text rendering of upcoming birthdays.

use birthday_core::{AgeTurning, BirthRecord, UpcomingBirthday};

const SHORT_ID_LEN: usize = 8;

pub fn short_id(record: &BirthRecord) -> String {
    record.id.simple().to_string()[..SHORT_ID_LEN].to_string()
}

pub fn countdown_label(days_until: i64) -> String {
    match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {days} days"),
    }
}

fn age_label(age: AgeTurning) -> String {
    match age {
        AgeTurning::Known(age) => format!("turns {age}"),
        AgeTurning::Unknown => "age unknown".to_string(),
    }
}

/// One list line: id, name, date, countdown, age, timezone, sync marker.
pub fn format_row(row: &UpcomingBirthday, unsynced: bool) -> String {
    let mut line = format!(
        "{}  {:<24} {:<12} {:<14} {}",
        short_id(&row.record),
        row.record.name,
        row.display_date,
        countdown_label(row.days_until),
        age_label(row.age_turning),
    );
    if !row.record.timezone.is_empty() {
        line.push_str(&format!("  [{}]", row.record.timezone));
    }
    if unsynced {
        line.push_str("  (unsynced)");
    }
    line
}

/// Multi-line detail view for one record.
pub fn format_detail(row: &UpcomingBirthday, unsynced: bool) -> String {
    let record = &row.record;
    let mut lines = vec![
        format!("id:        {}", record.id),
        format!("name:      {}", record.name),
        format!(
            "birthday:  {}{}",
            row.display_date,
            record
                .year
                .map(|year| format!(" {year}"))
                .unwrap_or_default()
        ),
        format!(
            "next:      {} ({})",
            row.next_date.format("%Y-%m-%d"),
            countdown_label(row.days_until)
        ),
        format!("age:       {}", age_label(row.age_turning)),
    ];
    if !record.timezone.is_empty() {
        lines.push(format!("timezone:  {}", record.timezone));
    }
    if let Some(photo_url) = &record.photo_url {
        lines.push(format!("photo:     {photo_url}"));
    }
    if unsynced {
        lines.push("status:    not yet saved to the store (run `birthdays resync`)".to_string());
    }
    lines.join("\n")
}
