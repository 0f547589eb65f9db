use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest session accepted anywhere, one full day.
pub const MAX_DURATION_MIN: u32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    Badminton,
    Gym,
    Recovery,
}

impl SessionType {
    pub fn all() -> [SessionType; 3] {
        [SessionType::Badminton, SessionType::Gym, SessionType::Recovery]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Badminton => "BADMINTON",
            SessionType::Gym => "GYM",
            SessionType::Recovery => "RECOVERY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionType::Badminton => "Badminton",
            SessionType::Gym => "Workout",
            SessionType::Recovery => "Recovery",
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SessionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BADMINTON" => Ok(SessionType::Badminton),
            "GYM" | "WORKOUT" => Ok(SessionType::Gym),
            "RECOVERY" => Ok(SessionType::Recovery),
            _ => Err(anyhow::anyhow!("Unknown session type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlannedStatus {
    Planned,
    Done,
    Skipped,
    Partial,
}

impl PlannedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlannedStatus::Planned => "PLANNED",
            PlannedStatus::Done => "DONE",
            PlannedStatus::Skipped => "SKIPPED",
            PlannedStatus::Partial => "PARTIAL",
        }
    }
}

impl FromStr for PlannedStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANNED" => Ok(PlannedStatus::Planned),
            "DONE" => Ok(PlannedStatus::Done),
            "SKIPPED" => Ok(PlannedStatus::Skipped),
            "PARTIAL" => Ok(PlannedStatus::Partial),
            _ => Err(anyhow::anyhow!("Unknown planned status: {}", s)),
        }
    }
}

/// A session scheduled into a weekday slot of one Monday-anchored week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSession {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub title: String,
    /// 0 = Monday .. 6 = Sunday
    pub day_index: u32,
    /// "HH:MM", 24-hour
    pub start_time: String,
    pub duration_min: u32,
    pub rpe_planned: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlannedStatus>,
}

impl PlannedSession {
    /// Absent status reads as planned.
    pub fn effective_status(&self) -> PlannedStatus {
        self.status.unwrap_or(PlannedStatus::Planned)
    }

    pub fn is_done(&self) -> bool {
        self.effective_status() == PlannedStatus::Done
    }
}

/// What actually happened. Type and title are copied from the planned
/// session at completion time and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub id: String,
    pub planned_session_id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub title: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub start_time: String,
    pub duration_min: u32,
    pub rpe: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Either kind of session row, discriminated once at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionRecord {
    Planned(PlannedSession),
    Completed(CompletedSession),
}

impl SessionRecord {
    pub fn id(&self) -> &str {
        match self {
            SessionRecord::Planned(p) => &p.id,
            SessionRecord::Completed(c) => &c.id,
        }
    }

    pub fn session_type(&self) -> SessionType {
        match self {
            SessionRecord::Planned(p) => p.session_type,
            SessionRecord::Completed(c) => c.session_type,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SessionRecord::Planned(p) => &p.title,
            SessionRecord::Completed(c) => &c.title,
        }
    }

    pub fn start_time(&self) -> &str {
        match self {
            SessionRecord::Planned(p) => &p.start_time,
            SessionRecord::Completed(c) => &c.start_time,
        }
    }

    pub fn duration_min(&self) -> u32 {
        match self {
            SessionRecord::Planned(p) => p.duration_min,
            SessionRecord::Completed(c) => c.duration_min,
        }
    }

    /// Planned RPE for a planned session, actual RPE for a completed one.
    pub fn rpe(&self) -> u32 {
        match self {
            SessionRecord::Planned(p) => p.rpe_planned,
            SessionRecord::Completed(c) => c.rpe,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionRecord::Completed(_))
    }
}
