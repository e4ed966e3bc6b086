use birthday_core::{
    age_turning, days_until_next_occurrence, format_display_date, next_occurrence,
    upcoming_birthdays, AgeTurning, BirthRecord,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn at_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn may_fifth_1985() -> BirthRecord {
    BirthRecord::new("Sam", 5, 5, Some(1985)).unwrap()
}

#[test]
fn four_days_before_anniversary() {
    let record = may_fifth_1985();
    let reference = at(2024, 5, 1);

    assert_eq!(days_until_next_occurrence(&record, reference), 4);
    assert_eq!(age_turning(&record, reference), AgeTurning::Known(39));
}

#[test]
fn anniversary_today_counts_as_zero_days() {
    let record = may_fifth_1985();
    let reference = at(2024, 5, 5);

    assert_eq!(days_until_next_occurrence(&record, reference), 0);
    assert_eq!(age_turning(&record, reference), AgeTurning::Known(39));
}

#[test]
fn time_of_day_does_not_change_the_result() {
    let record = may_fifth_1985();
    let reference = at_time(2024, 5, 5, 23, 59);

    assert_eq!(days_until_next_occurrence(&record, reference), 0);
    assert_eq!(age_turning(&record, reference), AgeTurning::Known(39));
}

#[test]
fn day_after_anniversary_rolls_to_next_year() {
    let record = may_fifth_1985();
    let reference = at(2024, 5, 6);

    assert_eq!(days_until_next_occurrence(&record, reference), 364);
    assert_eq!(age_turning(&record, reference), AgeTurning::Known(40));
    assert_eq!(
        next_occurrence(&record, reference),
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    );
}

#[test]
fn missing_year_reports_unknown_age() {
    let record = BirthRecord::new("Kim", 15, 8, None).unwrap();

    for reference in [at(2024, 1, 1), at(2024, 8, 15), at(2031, 12, 31)] {
        assert_eq!(age_turning(&record, reference), AgeTurning::Unknown);
    }
    assert_eq!(AgeTurning::Unknown.to_string(), "unknown");
    assert_eq!(format_display_date(&record), "15 August");
}

#[test]
fn display_date_uses_month_names_and_falls_back_for_bad_months() {
    let record = may_fifth_1985();
    assert_eq!(format_display_date(&record), "5 May");

    let mut out_of_range = BirthRecord::new("Odd", 1, 1, None).unwrap();
    out_of_range.month = 13;
    let label = format_display_date(&out_of_range);
    assert_eq!(label, "Month 13");
}

#[test]
fn days_until_stays_within_one_year_for_every_day_and_month() {
    let references = [
        at(2023, 1, 1),
        at(2023, 2, 28),
        at(2023, 3, 1),
        at(2023, 12, 31),
        at(2024, 2, 29),
        at(2024, 3, 1),
        at(2024, 12, 31),
    ];

    for month in 1..=12 {
        for day in 1..=31 {
            let record = BirthRecord::new("Any", day, month, None).unwrap();
            for reference in references {
                let days = days_until_next_occurrence(&record, reference);
                assert!(
                    (0..=366).contains(&days),
                    "day={day} month={month} reference={reference} days={days}"
                );
            }
        }
    }
}

#[test]
fn implied_target_dates_follow_reference_shift() {
    let record = BirthRecord::new("Periodic", 20, 7, Some(1990)).unwrap();
    let first = at(2022, 3, 10);
    // 2023-03-10 -> 2024-03-10 crosses 2024-02-29.
    for (from, span) in [(first, 365), (at(2023, 3, 10), 366)] {
        let to = from + Duration::days(span);
        let target_from = from.date() + Duration::days(days_until_next_occurrence(&record, from));
        let target_to = to.date() + Duration::days(days_until_next_occurrence(&record, to));
        assert_eq!(target_to.signed_duration_since(target_from).num_days(), span);
    }
}

#[test]
fn leap_day_rolls_to_march_first_in_common_years() {
    let record = BirthRecord::new("Leap", 29, 2, Some(2000)).unwrap();

    assert_eq!(days_until_next_occurrence(&record, at(2023, 2, 28)), 1);
    assert_eq!(
        next_occurrence(&record, at(2023, 2, 28)),
        NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
    );
    assert_eq!(age_turning(&record, at(2023, 2, 28)), AgeTurning::Known(23));
    assert_eq!(days_until_next_occurrence(&record, at(2024, 2, 29)), 0);
    assert_eq!(age_turning(&record, at(2024, 2, 29)), AgeTurning::Known(24));
}

#[test]
fn future_birth_year_is_not_guarded() {
    let record = BirthRecord::new("Future", 1, 6, Some(2030)).unwrap();
    assert_eq!(age_turning(&record, at(2024, 1, 1)), AgeTurning::Known(-6));
}

#[test]
fn extreme_birth_years_saturate_instead_of_overflowing() {
    let ancient = BirthRecord::new("Ancient", 5, 5, Some(i32::MIN)).unwrap();
    assert_eq!(
        age_turning(&ancient, at(2024, 5, 1)),
        AgeTurning::Known(i32::MAX)
    );

    let distant = BirthRecord::new("Distant", 5, 5, Some(i32::MAX)).unwrap();
    assert_eq!(
        age_turning(&distant, at(2024, 5, 6)),
        AgeTurning::Known(2024 - i32::MAX + 1)
    );
}

#[test]
fn calculator_is_deterministic() {
    let record = may_fifth_1985();
    let reference = at_time(2024, 11, 3, 8, 30);

    assert_eq!(
        age_turning(&record, reference),
        age_turning(&record, reference)
    );
    assert_eq!(
        days_until_next_occurrence(&record, reference),
        days_until_next_occurrence(&record, reference)
    );
}

#[test]
fn upcoming_list_is_sorted_by_countdown_with_stable_ties() {
    let reference = at(2024, 5, 1);
    let january = BirthRecord::new("January", 10, 1, None).unwrap();
    let may_a = BirthRecord::new("May A", 5, 5, Some(1985)).unwrap();
    let may_b = BirthRecord::new("May B", 5, 5, None).unwrap();
    let today = BirthRecord::new("Today", 1, 5, Some(2000)).unwrap();

    let rows = upcoming_birthdays(
        vec![january.clone(), may_a.clone(), may_b.clone(), today.clone()],
        reference,
    );

    let names = rows
        .iter()
        .map(|row| row.record.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Today", "May A", "May B", "January"]);
    assert!(rows[0].is_today());
    assert_eq!(rows[0].age_turning, AgeTurning::Known(24));
    assert_eq!(rows[1].display_date, "5 May");
    assert_eq!(rows[3].days_until, 254);
}
