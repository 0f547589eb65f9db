use serde::{Deserialize, Serialize};

use crate::models::{SessionType, MAX_DURATION_MIN};

fn default_primary_type() -> SessionType {
    SessionType::Badminton
}
fn default_duration() -> u32 {
    60
}
fn default_rpe() -> u32 {
    6
}
fn default_true() -> bool {
    true
}

/// Per-user defaults. Stored as one JSON document; any field missing from
/// the stored document falls back to its default on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_primary_type")]
    pub primary_type: SessionType,
    #[serde(default = "default_duration")]
    pub default_duration: u32,
    #[serde(default = "default_rpe")]
    pub default_rpe: u32,
    /// Display preference only. Week arithmetic is always Monday-based.
    #[serde(default = "default_true")]
    pub week_starts_monday: bool,
    #[serde(default = "default_true")]
    pub confirm_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_type: default_primary_type(),
            default_duration: default_duration(),
            default_rpe: default_rpe(),
            week_starts_monday: true,
            confirm_delete: true,
        }
    }
}

impl Settings {
    /// Apply a `key = value` edit from the command line.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "primary-type" | "primaryType" => self.primary_type = value.parse()?,
            "default-duration" | "defaultDuration" => {
                let minutes: u32 = value.parse()?;
                if !(1..=MAX_DURATION_MIN).contains(&minutes) {
                    anyhow::bail!("Default duration must be between 1 and {} minutes", MAX_DURATION_MIN);
                }
                self.default_duration = minutes;
            }
            "default-rpe" | "defaultRpe" => {
                let rpe: u32 = value.parse()?;
                if !(1..=10).contains(&rpe) {
                    anyhow::bail!("RPE must be between 1 and 10, got {}", rpe);
                }
                self.default_rpe = rpe;
            }
            "week-starts-monday" | "weekStartsMonday" => self.week_starts_monday = value.parse()?,
            "confirm-delete" | "confirmDelete" => self.confirm_delete = value.parse()?,
            _ => anyhow::bail!("Unknown setting: {}", key),
        }
        Ok(())
    }
}
