use serde::{Deserialize, Serialize};

use crate::models::SessionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub title: String,
    pub duration_min: u32,
    pub rpe_default: u32,
    #[serde(default)]
    pub focus_tags: Vec<String>,
}

/// A template before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub session_type: SessionType,
    pub title: String,
    pub duration_min: u32,
    pub rpe_default: u32,
    pub focus_tags: Vec<String>,
}

impl TemplateDraft {
    fn preset(session_type: SessionType, title: &str, duration_min: u32, rpe_default: u32, tags: &[&str]) -> Self {
        Self {
            session_type,
            title: title.to_string(),
            duration_min,
            rpe_default,
            focus_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Presets inserted into a fresh database.
pub fn default_templates() -> Vec<TemplateDraft> {
    vec![
        TemplateDraft::preset(SessionType::Badminton, "Footwork + Defense", 75, 7, &["footwork", "defense"]),
        TemplateDraft::preset(SessionType::Badminton, "Net + Drops", 60, 6, &["net", "control"]),
        TemplateDraft::preset(SessionType::Badminton, "Matchplay", 90, 8, &["matchplay", "tactics"]),
        TemplateDraft::preset(SessionType::Gym, "Upper Strength", 60, 7, &["upper", "strength"]),
        TemplateDraft::preset(SessionType::Gym, "Lower Strength", 60, 7, &["lower", "strength"]),
        TemplateDraft::preset(SessionType::Recovery, "Mobility + Stretch", 20, 2, &["mobility"]),
        TemplateDraft::preset(SessionType::Recovery, "Easy cardio", 30, 3, &["zone2"]),
    ]
}
