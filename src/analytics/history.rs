//! Filtering and grouping for the training log.

use chrono::NaiveDateTime;

use super::range::{in_range, DateMode};
use crate::models::{CompletedSession, SessionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    pub range: DateMode,
    pub session_type: Option<SessionType>,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            range: DateMode::ThisWeek,
            session_type: None,
        }
    }
}

impl LogFilter {
    pub fn matches(&self, s: &CompletedSession, now: NaiveDateTime) -> bool {
        if !in_range(&s.date_iso, self.range, now) {
            return false;
        }
        self.session_type.is_none_or(|t| t == s.session_type)
    }

    pub fn apply(&self, items: &[CompletedSession], now: NaiveDateTime) -> Vec<CompletedSession> {
        items
            .iter()
            .filter(|s| self.matches(s, now))
            .cloned()
            .collect()
    }
}

/// Newest day first; within a day, latest start time first.
pub fn group_by_day(items: &[CompletedSession]) -> Vec<(String, Vec<CompletedSession>)> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        b.date_iso
            .cmp(&a.date_iso)
            .then_with(|| b.start_time.cmp(&a.start_time))
    });

    let mut groups: Vec<(String, Vec<CompletedSession>)> = Vec::new();
    for s in sorted {
        if let Some((date, day)) = groups.last_mut() {
            if *date == s.date_iso {
                day.push(s);
                continue;
            }
        }
        groups.push((s.date_iso.clone(), vec![s]));
    }
    groups
}
