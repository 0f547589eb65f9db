use serde::{Deserialize, Serialize};

use crate::models::SessionType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBucket {
    pub count: u32,
    pub minutes: u64,
    pub load: u64,
}

/// Per-type totals. Every session type always has a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TypeTotals {
    pub badminton: TypeBucket,
    pub gym: TypeBucket,
    pub recovery: TypeBucket,
}

impl TypeTotals {
    pub fn get(&self, t: SessionType) -> &TypeBucket {
        match t {
            SessionType::Badminton => &self.badminton,
            SessionType::Gym => &self.gym,
            SessionType::Recovery => &self.recovery,
        }
    }

    pub fn get_mut(&mut self, t: SessionType) -> &mut TypeBucket {
        match t {
            SessionType::Badminton => &mut self.badminton,
            SessionType::Gym => &mut self.gym,
            SessionType::Recovery => &mut self.recovery,
        }
    }

    pub fn max_count(&self) -> u32 {
        SessionType::all()
            .iter()
            .map(|t| self.get(*t).count)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// Totals for one resolved range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub total_sessions: u32,
    pub total_minutes: u64,
    pub total_load: u64,
    pub avg_minutes: f64,
    pub avg_load: f64,
    pub sessions_per_day: f64,
}
