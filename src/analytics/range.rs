//! Symbolic date ranges resolved against an explicit `now`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

use super::calendar::{add_days, parse_iso_date, start_of_week_monday, to_iso_date};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Choose both a start and an end date")]
    Missing,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Custom range is invalid: start date must be on or before end date.")]
    Inverted,
    #[error("Unknown range '{0}'")]
    Unknown(String),
}

/// Window selectors used by the insights view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// The last `n` days, today inclusive. `Last(0)` is an empty window
    /// starting tomorrow.
    Last(u32),
    /// Monday through Sunday of the current week.
    ThisWeek,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl RangeKind {
    /// Parse the bounds of a custom range. Inverted bounds are accepted here;
    /// see [`validate_custom`].
    pub fn custom(start: &str, end: &str) -> Result<Self, RangeError> {
        let start = parse_iso_date(start).ok_or_else(|| RangeError::InvalidDate(start.to_string()))?;
        let end = parse_iso_date(end).ok_or_else(|| RangeError::InvalidDate(end.to_string()))?;
        Ok(RangeKind::Custom { start, end })
    }

    pub fn label(&self) -> String {
        match self {
            RangeKind::Last(n) => format!("{}d", n),
            RangeKind::ThisWeek => "week".to_string(),
            RangeKind::Custom { .. } => "custom".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub start_iso: String,
    pub end_iso: String,
    /// Inclusive day count. Zero or negative for an inverted custom range.
    pub day_count: i64,
}

impl ResolvedRange {
    pub fn contains(&self, date_iso: &str) -> bool {
        within_inclusive(date_iso, &self.start_iso, &self.end_iso)
    }
}

pub fn resolve_range(kind: RangeKind, now: NaiveDateTime) -> ResolvedRange {
    let today = now.date();
    match kind {
        RangeKind::Last(n) => {
            ResolvedRange {
                start_iso: to_iso_date(add_days(today, -(n as i64) + 1)),
                end_iso: to_iso_date(today),
                day_count: n as i64,
            }
        }
        RangeKind::ThisWeek => {
            let monday = start_of_week_monday(today);
            ResolvedRange {
                start_iso: to_iso_date(monday),
                end_iso: to_iso_date(add_days(monday, 6)),
                day_count: 7,
            }
        }
        RangeKind::Custom { start, end } => ResolvedRange {
            start_iso: to_iso_date(start),
            end_iso: to_iso_date(end),
            day_count: (end - start).num_days() + 1,
        },
    }
}

/// Check custom bounds before resolving them. Kept apart from
/// [`resolve_range`], which resolves whatever it is given.
pub fn validate_custom(start: Option<&str>, end: Option<&str>) -> Result<RangeKind, RangeError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(RangeError::Missing);
    };
    if start.is_empty() || end.is_empty() {
        return Err(RangeError::Missing);
    }
    let kind = RangeKind::custom(start, end)?;
    match kind {
        RangeKind::Custom { start, end } if start > end => Err(RangeError::Inverted),
        _ => Ok(kind),
    }
}

/// Filters offered by the log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateMode {
    AllTime,
    Last7,
    ThisWeek,
    ThisMonth,
}

impl DateMode {
    pub fn label(&self) -> &'static str {
        match self {
            DateMode::AllTime => "All time",
            DateMode::Last7 => "Last 7 days",
            DateMode::ThisWeek => "This week",
            DateMode::ThisMonth => "This month",
        }
    }
}

impl FromStr for DateMode {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "all" | "all-time" => Ok(DateMode::AllTime),
            "last-7" | "7d" => Ok(DateMode::Last7),
            "this-week" | "week" => Ok(DateMode::ThisWeek),
            "this-month" | "month" => Ok(DateMode::ThisMonth),
            _ => Err(RangeError::Unknown(s.to_string())),
        }
    }
}

pub fn in_range(date_iso: &str, mode: DateMode, now: NaiveDateTime) -> bool {
    if mode == DateMode::AllTime {
        return true;
    }
    let Some(d) = parse_iso_date(date_iso) else {
        return false;
    };
    let today = now.date();

    match mode {
        DateMode::AllTime => true,
        DateMode::Last7 => d >= add_days(today, -6),
        DateMode::ThisMonth => d.year() == today.year() && d.month() == today.month(),
        DateMode::ThisWeek => {
            let monday = start_of_week_monday(today);
            d >= monday && d <= add_days(monday, 6)
        }
    }
}

/// ISO dates compare correctly as strings.
pub fn within_inclusive(date_iso: &str, start_iso: &str, end_iso: &str) -> bool {
    date_iso >= start_iso && date_iso <= end_iso
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::calendar::week_days;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn last_seven_ends_today() {
        let now = at("2026-01-26", "12:00");
        let r = resolve_range(RangeKind::Last(7), now);
        assert_eq!(r.start_iso, "2026-01-20");
        assert_eq!(r.end_iso, "2026-01-26");
        assert_eq!(r.day_count, 7);
        assert_eq!(resolve_range(RangeKind::Last(7), now), r);
    }

    #[test]
    fn last_thirty_spans_month_boundary() {
        let r = resolve_range(RangeKind::Last(30), at("2026-03-05", "08:00"));
        assert_eq!(r.start_iso, "2026-02-04");
        assert_eq!(r.day_count, 30);
    }

    #[test]
    fn last_zero_is_empty() {
        let r = resolve_range(RangeKind::Last(0), at("2026-01-26", "12:00"));
        assert_eq!(r.start_iso, "2026-01-27");
        assert_eq!(r.end_iso, "2026-01-26");
        assert_eq!(r.day_count, 0);
        assert!(!r.contains("2026-01-26"));
    }

    #[test]
    fn custom_range_counts_inclusive_days() {
        let kind = RangeKind::custom("2026-01-01", "2026-01-31").unwrap();
        let r = resolve_range(kind, at("2026-06-01", "09:00"));
        assert_eq!(r.day_count, 31);

        let inverted = RangeKind::custom("2026-01-10", "2026-01-01").unwrap();
        assert!(resolve_range(inverted, at("2026-06-01", "09:00")).day_count <= 0);
    }

    #[test]
    fn custom_validation_is_separate() {
        assert_eq!(validate_custom(None, Some("2026-01-01")), Err(RangeError::Missing));
        assert_eq!(
            validate_custom(Some("2026-01-10"), Some("2026-01-01")),
            Err(RangeError::Inverted)
        );
        assert!(matches!(
            validate_custom(Some("2026-13-01"), Some("2026-12-01")),
            Err(RangeError::InvalidDate(_))
        ));
        assert!(validate_custom(Some("2026-01-01"), Some("2026-01-01")).is_ok());

        // Unpadded fields are compared as dates, not as text.
        let kind = validate_custom(Some("2026-2-01"), Some("2026-10-01")).unwrap();
        let window = resolve_range(kind, at("2026-01-26", "12:00"));
        assert_eq!(window.start_iso, "2026-02-01");
        assert_eq!(window.end_iso, "2026-10-01");
        assert_eq!(
            validate_custom(Some("2026-10-01"), Some("2026-9-30")),
            Err(RangeError::Inverted)
        );
    }

    #[test]
    fn last_7_includes_six_days_back() {
        let now = at("2026-01-26", "12:00");
        assert!(in_range("2026-01-26", DateMode::Last7, now));
        assert!(in_range("2026-01-20", DateMode::Last7, now));
        assert!(!in_range("2026-01-19", DateMode::Last7, now));
        assert!(!in_range("2026-01-18", DateMode::Last7, now));
    }

    #[test]
    fn this_week_runs_monday_to_sunday() {
        let now = at("2026-01-26", "12:00");
        assert!(in_range("2026-01-26", DateMode::ThisWeek, now));
        assert!(in_range("2026-02-01", DateMode::ThisWeek, now));
        assert!(!in_range("2026-02-02", DateMode::ThisWeek, now));
        assert!(!in_range("2026-01-25", DateMode::ThisWeek, now));
    }

    #[test]
    fn this_week_holds_for_every_day_of_the_week() {
        let now = at("2026-01-29", "23:59");
        let monday = start_of_week_monday(now.date());
        for day in week_days(monday) {
            assert!(in_range(&to_iso_date(day), DateMode::ThisWeek, now));
        }
        assert!(!in_range(&to_iso_date(add_days(monday, -1)), DateMode::ThisWeek, now));
        assert!(!in_range(&to_iso_date(add_days(monday, 7)), DateMode::ThisWeek, now));
    }

    #[test]
    fn this_week_agrees_with_resolved_window() {
        let now = at("2026-02-01", "06:00");
        let window = resolve_range(RangeKind::ThisWeek, now);
        let mut day = parse_iso_date("2026-01-10").unwrap();
        for _ in 0..40 {
            let iso = to_iso_date(day);
            assert_eq!(
                in_range(&iso, DateMode::ThisWeek, now),
                within_inclusive(&iso, &window.start_iso, &window.end_iso),
                "disagreement on {}",
                iso
            );
            day = add_days(day, 1);
        }
    }

    #[test]
    fn this_month_and_all_time() {
        let now = at("2026-01-26", "12:00");
        assert!(in_range("2026-01-01", DateMode::ThisMonth, now));
        assert!(!in_range("2025-01-15", DateMode::ThisMonth, now));
        assert!(!in_range("2026-02-01", DateMode::ThisMonth, now));
        assert!(in_range("1999-01-01", DateMode::AllTime, now));
        assert!(in_range("garbage", DateMode::AllTime, now));
        assert!(!in_range("garbage", DateMode::Last7, now));
    }

    #[test]
    fn date_mode_parses_cli_spellings() {
        assert_eq!("this-week".parse::<DateMode>(), Ok(DateMode::ThisWeek));
        assert_eq!("LAST_7".parse::<DateMode>(), Ok(DateMode::Last7));
        assert_eq!("all".parse::<DateMode>(), Ok(DateMode::AllTime));
        assert!("fortnight".parse::<DateMode>().is_err());
    }
}
