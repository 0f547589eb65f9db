pub mod session;
pub mod settings;
pub mod stats;
pub mod template;

pub use session::{
    CompletedSession, PlannedSession, PlannedStatus, SessionRecord, SessionType, MAX_DURATION_MIN,
};
pub use settings::Settings;
pub use stats::{RangeSummary, Streak, TypeTotals};
pub use template::{Template, TemplateDraft};
