//! Wall-clock date helpers. All dates are local and timezone-naive.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

pub const ISO_DATE: &str = "%Y-%m-%d";

pub const DOW_LABEL: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// `YYYY-MM-DD`, zero padded.
pub fn to_iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, ISO_DATE).ok()
}

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// Monday = 0 .. Sunday = 6.
pub fn monday_index(date: NaiveDate) -> u32 {
    (date.weekday().num_days_from_sunday() + 6) % 7
}

pub fn start_of_week_monday(date: NaiveDate) -> NaiveDate {
    add_days(date, -(monday_index(date) as i64))
}

pub fn week_days(monday: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| add_days(monday, i as i64))
}

/// Add minutes to an "HH:MM" time, wrapping past midnight.
pub fn add_minutes_hhmm(hhmm: &str, minutes: i64) -> Option<String> {
    let t = NaiveTime::parse_from_str(hhmm, "%H:%M").ok()?;
    let (next, _) = t.overflowing_add_signed(Duration::minutes(minutes));
    Some(next.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn iso_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(to_iso_date(date), "2026-02-03");
        assert_eq!(parse_iso_date("2026-02-03"), Some(date));
        assert_eq!(parse_iso_date("2026-2-30"), None);
    }

    #[test]
    fn monday_index_maps_sunday_to_six() {
        assert_eq!(monday_index(d("2026-01-26")), 0); // Monday
        assert_eq!(monday_index(d("2026-01-31")), 5); // Saturday
        assert_eq!(monday_index(d("2026-02-01")), 6); // Sunday
    }

    #[test]
    fn start_of_week_is_always_monday() {
        let mut day = d("2023-12-20");
        for _ in 0..800 {
            let idx = monday_index(day);
            assert!(idx <= 6);
            let monday = start_of_week_monday(day);
            assert_eq!(monday_index(monday), 0);
            assert!(monday <= day && (day - monday).num_days() <= 6);
            day = add_days(day, 1);
        }
    }

    #[test]
    fn adding_a_week_crosses_month_and_leap_day() {
        assert_eq!(to_iso_date(add_days(d("2024-02-25"), 7)), "2024-03-03");
        assert_eq!(to_iso_date(add_days(d("2024-02-22"), 7)), "2024-02-29");
        assert_eq!(to_iso_date(add_days(d("2025-12-29"), 7)), "2026-01-05");
        assert_eq!(to_iso_date(add_days(d("2026-03-01"), -1)), "2026-02-28");
    }

    #[test]
    fn week_days_span_monday_to_sunday() {
        let days = week_days(d("2026-01-26"));
        assert_eq!(to_iso_date(days[0]), "2026-01-26");
        assert_eq!(to_iso_date(days[6]), "2026-02-01");
    }

    #[test]
    fn minutes_wrap_past_midnight() {
        assert_eq!(add_minutes_hhmm("18:00", 60).as_deref(), Some("19:00"));
        assert_eq!(add_minutes_hhmm("23:30", 60).as_deref(), Some("00:30"));
        assert_eq!(add_minutes_hhmm("7pm", 60), None);
    }
}
