use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use crate::analytics::calendar::to_iso_date;
use crate::db::TrainingStore;
use crate::models::{CompletedSession, PlannedSession};

/// A change to one week's plan.
#[derive(Debug, Clone)]
pub enum PlanCommand {
    Add(PlannedSession),
    Complete {
        planned: PlannedSession,
        entry: CompletedSession,
    },
    Delete(PlannedSession),
}

/// The store's view of the week after a command succeeded.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub week: Vec<PlannedSession>,
}

/// Run `command` against the store and return the refreshed week. On error
/// nothing is returned, so the caller keeps whatever state it had.
pub fn apply<S: TrainingStore + ?Sized>(
    store: &S,
    week_start: &str,
    command: &PlanCommand,
) -> Result<PlanOutcome> {
    match command {
        PlanCommand::Add(session) => {
            store.upsert_planned(week_start, session)?;
        }
        PlanCommand::Complete { planned, entry } => {
            store
                .insert_completed(entry)
                .with_context(|| format!("Logging '{}'", planned.title))?;
            store.mark_planned_done(&planned.id)?;
        }
        PlanCommand::Delete(planned) => {
            store.delete_completed_by_planned_id(&planned.id)?;
            store.delete_planned(&planned.id)?;
        }
    }
    debug!("Applied {} to week {}", kind(command), week_start);

    Ok(PlanOutcome {
        week: store.list_planned_week(week_start)?,
    })
}

fn kind(command: &PlanCommand) -> &'static str {
    match command {
        PlanCommand::Add(_) => "add",
        PlanCommand::Complete { .. } => "complete",
        PlanCommand::Delete(_) => "delete",
    }
}

/// Build the log entry for finishing a planned session. Type, title and
/// start time are copied; blank notes are dropped.
pub fn complete_entry(
    planned: &PlannedSession,
    date: NaiveDate,
    duration_min: u32,
    rpe: u32,
    notes: Option<&str>,
) -> CompletedSession {
    CompletedSession {
        id: Uuid::new_v4().to_string(),
        planned_session_id: planned.id.clone(),
        session_type: planned.session_type,
        title: planned.title.clone(),
        date_iso: to_iso_date(date),
        start_time: planned.start_time.clone(),
        duration_min,
        rpe,
        notes: notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    }
}
