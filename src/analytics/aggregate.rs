//! Reductions over completed sessions. Every function here is pure: "today"
//! always comes from the `now` argument.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::calendar::{add_days, monday_index, parse_iso_date, start_of_week_monday, to_iso_date, week_days};
use super::range::{resolve_range, within_inclusive, RangeKind, ResolvedRange};
use crate::models::{CompletedSession, RangeSummary, SessionType, Streak, TypeTotals};

/// Placeholder title when there is nothing to count.
pub const NO_TITLE: &str = "-";

/// Window used for the weekday pattern, independent of the selected range.
pub const WEEKDAY_WINDOW_DAYS: u32 = 30;

/// Minutes times effort, widened so long histories cannot overflow.
pub fn compute_load(duration_min: u32, rpe: u32) -> u64 {
    u64::from(duration_min) * u64::from(rpe)
}

pub fn type_totals(items: &[CompletedSession]) -> TypeTotals {
    let mut totals = TypeTotals::default();
    for s in items {
        let bucket = totals.get_mut(s.session_type);
        bucket.count += 1;
        bucket.minutes += u64::from(s.duration_min);
        bucket.load += compute_load(s.duration_min, s.rpe);
    }
    totals
}

/// Exact, case-sensitive title match. Ties go to the title seen first.
pub fn most_common_title(items: &[CompletedSession]) -> String {
    let mut order: Vec<(&str, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for s in items {
        match index.get(s.title.as_str()).copied() {
            Some(i) => order[i].1 += 1,
            None => {
                index.insert(s.title.as_str(), order.len());
                order.push((s.title.as_str(), 1));
            }
        }
    }

    let mut best = (NO_TITLE, 0u32);
    for (title, n) in order {
        if n > best.1 {
            best = (title, n);
        }
    }
    best.0.to_string()
}

/// Consecutive days with at least one session, ending today. A day without
/// a session today means no streak.
pub fn compute_streak(all: &[CompletedSession], now: NaiveDateTime) -> u32 {
    let dates: HashSet<&str> = all.iter().map(|s| s.date_iso.as_str()).collect();

    let mut cursor = now.date();
    let mut streak = 0u32;
    while dates.contains(to_iso_date(cursor).as_str()) {
        streak += 1;
        cursor = add_days(cursor, -1);
    }
    streak
}

/// Longest run of consecutive active days anywhere in the history.
pub fn best_streak(all: &[CompletedSession]) -> u32 {
    let days: BTreeSet<NaiveDate> = all.iter().filter_map(|s| parse_iso_date(&s.date_iso)).collect();

    let mut best = 0u32;
    let mut current = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        current = match prev {
            Some(p) if add_days(p, 1) == day => current + 1,
            _ => 1,
        };
        best = best.max(current);
        prev = Some(day);
    }
    best
}

pub fn streak(all: &[CompletedSession], now: NaiveDateTime) -> Streak {
    Streak {
        current: compute_streak(all, now),
        best: best_streak(all),
    }
}

/// Sessions per Monday-origin weekday over the last `n` days.
pub fn weekday_counts_last_n_days(all: &[CompletedSession], n: u32, now: NaiveDateTime) -> [u32; 7] {
    let window = resolve_range(RangeKind::Last(n), now);
    let mut counts = [0u32; 7];
    for s in all {
        if !within_inclusive(&s.date_iso, &window.start_iso, &window.end_iso) {
            continue;
        }
        let Some(d) = parse_iso_date(&s.date_iso) else {
            continue;
        };
        counts[monday_index(d) as usize] += 1;
    }
    counts
}

/// Index of the first maximum.
pub fn best_weekday(counts: &[u32; 7]) -> usize {
    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    best
}

/// Most practised type. Ties follow enumeration order.
pub fn best_type(totals: &TypeTotals) -> SessionType {
    let mut best = SessionType::Badminton;
    for t in SessionType::all() {
        if totals.get(t).count > totals.get(best).count {
            best = t;
        }
    }
    best
}

pub fn summarize(items: &[CompletedSession], day_count: i64) -> RangeSummary {
    let total_sessions = items.len() as u32;
    let total_minutes: u64 = items.iter().map(|s| u64::from(s.duration_min)).sum();
    let total_load: u64 = items.iter().map(|s| compute_load(s.duration_min, s.rpe)).sum();
    let divisor = total_sessions.max(1) as f64;

    let sessions_per_day = if day_count > 0 {
        (total_sessions as f64 / day_count as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    RangeSummary {
        total_sessions,
        total_minutes,
        total_load,
        avg_minutes: total_minutes as f64 / divisor,
        avg_load: total_load as f64 / divisor,
        sessions_per_day,
    }
}

pub fn balance_hint(totals: &TypeTotals, total_sessions: u32) -> &'static str {
    let b = totals.badminton.count;
    let g = totals.gym.count;
    let r = totals.recovery.count;

    if total_sessions == 0 {
        return "Log a completed session to see patterns.";
    }
    if r == 0 && total_sessions >= 5 {
        return "You've trained a lot. Consider adding 1 recovery session.";
    }
    if b > 0 && g == 0 && total_sessions >= 3 {
        return "Nice badminton focus. Adding a gym day could boost stability and power.";
    }
    if g > 0 && b == 0 && total_sessions >= 3 {
        return "Good gym consistency. Try adding a badminton session for skill work.";
    }
    "Keep it steady. Small consistency beats big spikes."
}

/// One column of the current-week consistency grid.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date_iso: String,
    pub day_index: u32,
    pub is_today: bool,
    pub sessions: Vec<CompletedSession>,
}

pub fn week_consistency(all: &[CompletedSession], now: NaiveDateTime) -> [DayCell; 7] {
    let today = now.date();
    let days = week_days(start_of_week_monday(today));
    let mut cells: [DayCell; 7] = std::array::from_fn(|i| DayCell {
        date_iso: to_iso_date(days[i]),
        day_index: i as u32,
        is_today: days[i] == today,
        sessions: Vec::new(),
    });

    for s in all {
        if let Some(cell) = cells.iter_mut().find(|c| c.date_iso == s.date_iso) {
            cell.sessions.push(s.clone());
        }
    }
    for cell in cells.iter_mut() {
        cell.sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }
    cells
}

/// Everything the insights view shows for one range.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub range: ResolvedRange,
    pub summary: RangeSummary,
    pub totals: TypeTotals,
    pub most_common_title: String,
    pub streak: Streak,
    pub weekday_counts: [u32; 7],
    pub best_weekday: usize,
    pub best_type: SessionType,
    pub hint: &'static str,
}

impl Insights {
    /// `range_items` may be wider than the range; anything outside it is
    /// ignored. Streaks and the weekday pattern use the full `history`.
    pub fn compute(
        kind: RangeKind,
        range_items: &[CompletedSession],
        history: &[CompletedSession],
        now: NaiveDateTime,
    ) -> Self {
        let range = resolve_range(kind, now);
        let mut items: Vec<CompletedSession> = range_items
            .iter()
            .filter(|s| range.contains(&s.date_iso))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.date_iso
                .cmp(&b.date_iso)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });

        let totals = type_totals(&items);
        let summary = summarize(&items, range.day_count);
        let weekday_counts = weekday_counts_last_n_days(history, WEEKDAY_WINDOW_DAYS, now);

        Self {
            most_common_title: most_common_title(&items),
            streak: streak(history, now),
            best_weekday: best_weekday(&weekday_counts),
            best_type: best_type(&totals),
            hint: balance_hint(&totals, summary.total_sessions),
            weekday_counts,
            totals,
            summary,
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::TypeBucket;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-01-26 18:30", "%Y-%m-%d %H:%M").unwrap()
    }

    fn session(t: SessionType, title: &str, date: &str, minutes: u32, rpe: u32) -> CompletedSession {
        CompletedSession {
            id: format!("{}-{}-{}", title, date, minutes),
            planned_session_id: "p".into(),
            session_type: t,
            title: title.into(),
            date_iso: date.into(),
            start_time: "18:00".into(),
            duration_min: minutes,
            rpe,
            notes: None,
        }
    }

    fn on(date: &str) -> CompletedSession {
        session(SessionType::Badminton, "Matchplay", date, 60, 7)
    }

    fn days_back(n: i64) -> String {
        to_iso_date(add_days(now().date(), -n))
    }

    #[test]
    fn load_is_duration_times_rpe() {
        assert_eq!(compute_load(60, 7), 420);
        assert_eq!(compute_load(0, 9), 0);
    }

    #[test]
    fn huge_durations_do_not_overflow_totals() {
        let long = session(SessionType::Gym, "Marathon", "2026-01-26", 500_000_000, 9);
        let t = type_totals(&[long.clone(), long.clone()]);
        assert_eq!(t.gym.minutes, 1_000_000_000);
        assert_eq!(t.gym.load, 9_000_000_000);

        let s = summarize(&[long.clone(), long], 7);
        assert_eq!(s.total_load, 9_000_000_000);
        assert_eq!(compute_load(u32::MAX, 10), u64::from(u32::MAX) * 10);
    }

    #[test]
    fn empty_totals_keep_every_bucket() {
        let t = type_totals(&[]);
        for ty in SessionType::all() {
            assert_eq!(*t.get(ty), TypeBucket::default());
        }
        let json = serde_json::to_value(t).unwrap();
        assert!(json.get("BADMINTON").is_some());
        assert!(json.get("GYM").is_some());
        assert!(json.get("RECOVERY").is_some());
    }

    #[test]
    fn totals_accumulate_per_type() {
        let items = vec![
            session(SessionType::Gym, "Upper", "2026-01-20", 60, 7),
            session(SessionType::Gym, "Lower", "2026-01-21", 45, 8),
            session(SessionType::Recovery, "Stretch", "2026-01-22", 20, 2),
        ];
        let t = type_totals(&items);
        assert_eq!(t.gym, TypeBucket { count: 2, minutes: 105, load: 780 });
        assert_eq!(t.recovery, TypeBucket { count: 1, minutes: 20, load: 40 });
        assert_eq!(t.badminton.count, 0);
    }

    #[test]
    fn most_common_title_breaks_ties_by_first_seen() {
        assert_eq!(most_common_title(&[]), "-");
        let items = vec![
            session(SessionType::Gym, "Upper", "2026-01-20", 60, 7),
            session(SessionType::Gym, "Lower", "2026-01-21", 60, 7),
            session(SessionType::Gym, "Lower", "2026-01-22", 60, 7),
            session(SessionType::Gym, "Upper", "2026-01-23", 60, 7),
            session(SessionType::Gym, "upper", "2026-01-24", 60, 7),
        ];
        assert_eq!(most_common_title(&items), "Upper");
    }

    #[test]
    fn streak_needs_today() {
        assert_eq!(compute_streak(&[], now()), 0);
        let items: Vec<_> = (1..=5).map(|n| on(&days_back(n))).collect();
        assert_eq!(compute_streak(&items, now()), 0);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let items = vec![
            on(&days_back(0)),
            on(&days_back(1)),
            on(&days_back(1)),
            on(&days_back(2)),
            on(&days_back(4)),
        ];
        assert_eq!(compute_streak(&items, now()), 3);
    }

    #[test]
    fn best_streak_finds_longest_run() {
        assert_eq!(best_streak(&[]), 0);
        let items = vec![
            on("2025-12-30"),
            on("2025-12-31"),
            on("2026-01-01"),
            on("2026-01-02"),
            on("2026-01-10"),
            on("2026-01-11"),
            on("bad-date"),
        ];
        assert_eq!(best_streak(&items), 4);
    }

    #[test]
    fn weekday_counts_respect_window() {
        // 2026-01-26 is a Monday
        let items = vec![
            on("2026-01-26"),
            on("2026-01-19"),
            on("2026-01-25"),
            on("2025-12-27"), // 30 days back, just outside
            on("2025-12-28"), // first day of the window, a Sunday
            on("2026-02-02"), // future
        ];
        let counts = weekday_counts_last_n_days(&items, 30, now());
        assert_eq!(counts, [2, 0, 0, 0, 0, 0, 2]);
        assert_eq!(best_weekday(&counts), 0);
    }

    #[test]
    fn best_weekday_takes_first_maximum() {
        assert_eq!(best_weekday(&[0; 7]), 0);
        assert_eq!(best_weekday(&[1, 3, 0, 3, 2, 0, 1]), 1);
        assert_eq!(best_weekday(&[0, 0, 0, 0, 0, 0, 4]), 6);
    }

    #[test]
    fn best_type_prefers_enumeration_order_on_ties() {
        let mut t = TypeTotals::default();
        assert_eq!(best_type(&t), SessionType::Badminton);
        t.gym.count = 2;
        t.recovery.count = 2;
        assert_eq!(best_type(&t), SessionType::Gym);
    }

    #[test]
    fn summary_guards_division() {
        let empty = summarize(&[], 7);
        assert_eq!(empty.total_sessions, 0);
        assert_eq!(empty.avg_minutes, 0.0);
        assert_eq!(empty.avg_load, 0.0);

        let items = vec![
            session(SessionType::Gym, "Upper", "2026-01-20", 60, 7),
            session(SessionType::Badminton, "Net", "2026-01-21", 90, 6),
        ];
        let s = summarize(&items, 7);
        assert_eq!(s.total_minutes, 150);
        assert_eq!(s.total_load, 960);
        assert_eq!(s.avg_minutes, 75.0);
        assert_eq!(s.avg_load, 480.0);
        assert_eq!(s.sessions_per_day, 0.3);
        assert_eq!(summarize(&items, 0).sessions_per_day, 0.0);
    }

    #[test]
    fn hint_rules_apply_in_order() {
        let mut t = TypeTotals::default();
        assert_eq!(balance_hint(&t, 0), "Log a completed session to see patterns.");

        t.badminton.count = 3;
        assert!(balance_hint(&t, 3).contains("gym day"));

        t.badminton.count = 3;
        t.gym.count = 2;
        assert!(balance_hint(&t, 5).contains("recovery"));

        let mut gym_only = TypeTotals::default();
        gym_only.gym.count = 3;
        gym_only.recovery.count = 1;
        assert!(balance_hint(&gym_only, 4).contains("badminton session"));

        let mut balanced = TypeTotals::default();
        balanced.badminton.count = 1;
        balanced.gym.count = 1;
        assert!(balance_hint(&balanced, 2).starts_with("Keep it steady"));

        let mut small = TypeTotals::default();
        small.badminton.count = 2;
        assert!(balance_hint(&small, 2).starts_with("Keep it steady"));
    }

    #[test]
    fn week_grid_buckets_by_date() {
        let mut late = on("2026-01-28");
        late.start_time = "20:00".into();
        let mut early = on("2026-01-28");
        early.start_time = "07:00".into();
        let cells = week_consistency(&[late, early, on("2026-01-25")], now());

        assert_eq!(cells[0].date_iso, "2026-01-26");
        assert!(cells[0].is_today);
        assert_eq!(cells[2].sessions.len(), 2);
        assert_eq!(cells[2].sessions[0].start_time, "07:00");
        assert!(cells.iter().map(|c| c.sessions.len()).sum::<usize>() == 2);
    }

    #[test]
    fn insights_scope_range_but_not_streak() {
        let history = vec![
            session(SessionType::Badminton, "Matchplay", "2026-01-26", 90, 8),
            session(SessionType::Badminton, "Net + Drops", "2026-01-25", 60, 6),
            session(SessionType::Badminton, "Matchplay", "2026-01-24", 90, 8),
            session(SessionType::Gym, "Upper Strength", "2026-01-10", 60, 7),
        ];
        let report = Insights::compute(RangeKind::Last(7), &history, &history, now());

        assert_eq!(report.range.start_iso, "2026-01-20");
        assert_eq!(report.summary.total_sessions, 3);
        assert_eq!(report.summary.total_load, 720 + 360 + 720);
        assert_eq!(report.most_common_title, "Matchplay");
        assert_eq!(report.streak, Streak { current: 3, best: 3 });
        assert_eq!(report.best_type, SessionType::Badminton);
        assert!(report.hint.contains("gym day"));
        assert_eq!(report.weekday_counts.iter().sum::<u32>(), 4);
    }
}
