use std::collections::HashSet;

use crate::analytics::calendar::add_minutes_hhmm;
use crate::models::{PlannedSession, SessionType};

pub const DEFAULT_START: &str = "18:00";

/// Sessions bucketed by Monday-origin day, each day sorted by start time.
/// Sessions with a day index outside 0..=6 are dropped.
pub fn sessions_by_day(sessions: &[PlannedSession]) -> [Vec<PlannedSession>; 7] {
    let mut days: [Vec<PlannedSession>; 7] = Default::default();
    for s in sessions {
        if let Some(day) = days.get_mut(s.day_index as usize) {
            day.push(s.clone());
        }
    }
    for day in days.iter_mut() {
        day.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }
    days
}

/// First hourly slot from `base` not already taken on that day.
pub fn next_free_time(day_sessions: &[PlannedSession], base: &str) -> String {
    let used: HashSet<&str> = day_sessions.iter().map(|s| s.start_time.as_str()).collect();
    let mut t = base.to_string();
    for _ in 0..24 {
        if !used.contains(t.as_str()) {
            return t;
        }
        match add_minutes_hhmm(&t, 60) {
            Some(next) => t = next,
            None => break,
        }
    }
    base.to_string()
}

pub fn default_title(t: SessionType) -> &'static str {
    match t {
        SessionType::Badminton => "Badminton Session",
        SessionType::Gym => "Gym Workout",
        SessionType::Recovery => "Recovery",
    }
}

/// Parse a weekday given as `mon`..`sun`, a full name, or `0`..`6`.
pub fn parse_day(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return (n <= 6).then_some(n);
    }
    let lower = s.to_lowercase();
    let names = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    names
        .iter()
        .position(|n| lower.starts_with(n))
        .map(|i| i as u32)
}

pub fn planned_minutes(sessions: &[PlannedSession]) -> u64 {
    sessions.iter().map(|s| u64::from(s.duration_min)).sum()
}
