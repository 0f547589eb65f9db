use anyhow::{anyhow, bail, Result};
use chrono::NaiveDateTime;
use log::debug;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use uuid::Uuid;

use crate::analytics::aggregate::{compute_load, week_consistency, NO_TITLE, WEEKDAY_WINDOW_DAYS};
use crate::analytics::calendar::{
    add_days, add_minutes_hhmm, parse_iso_date, start_of_week_monday, to_iso_date, DOW_LABEL,
};
use crate::analytics::history::group_by_day;
use crate::analytics::range::{resolve_range, validate_custom};
use crate::analytics::{DateMode, Insights, LogFilter, RangeError, RangeKind};
use crate::cli::args::{PlanCommands, SettingsCommands, TemplateCommands};
use crate::config::AppConfig;
use crate::db::repository::template_by_title;
use crate::db::TrainingStore;
use crate::models::{
    CompletedSession, PlannedSession, PlannedStatus, SessionRecord, SessionType, TemplateDraft,
    MAX_DURATION_MIN,
};
use crate::planner::week::{
    default_title, next_free_time, parse_day, planned_minutes, sessions_by_day, DEFAULT_START,
};
use crate::planner::{apply, complete_entry, PlanCommand};
use crate::utils::format::{fit_width, format_decimal, format_hours_minutes, progress_bar, short_id};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($ui:expr, $color:expr, $($arg:tt)*) => {{
        if $ui.color {
            print!("{}", $color);
        }
        print!($($arg)*);
        if $ui.color {
            println!("\x1b[0m");
        } else {
            println!();
        }
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const SKY: &str = "\x1b[38;2;56;189;248m";
const EMERALD: &str = "\x1b[38;2;16;185;129m";
const VIOLET: &str = "\x1b[38;2;139;92;246m";

/// Terminal presentation options taken from the config.
pub struct Ui {
    pub color: bool,
    pub bar_width: usize,
}

impl Ui {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            color: config.display.color,
            bar_width: config.display.bar_width,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }
}

fn type_color(t: SessionType) -> &'static str {
    match t {
        SessionType::Badminton => SKY,
        SessionType::Gym => EMERALD,
        SessionType::Recovery => VIOLET,
    }
}

fn type_dot(ui: &Ui, t: SessionType) -> String {
    ui.paint(type_color(t), "●")
}

fn status_icon(ui: &Ui, s: &PlannedSession) -> String {
    match s.effective_status() {
        PlannedStatus::Done => ui.paint(GREEN, "✓"),
        PlannedStatus::Skipped => ui.paint(RED, "✗"),
        PlannedStatus::Partial => ui.paint(AMBER, "◑"),
        PlannedStatus::Planned => ui.paint(DIM, "○"),
    }
}

fn current_week_start(now: NaiveDateTime) -> String {
    to_iso_date(start_of_week_monday(now.date()))
}

// ─── Week ────────────────────────────────────────────────────────────────────

pub fn handle_week(store: &dyn TrainingStore, ui: &Ui, now: NaiveDateTime) -> Result<()> {
    let monday = start_of_week_monday(now.date());
    let week_start = to_iso_date(monday);
    let sessions = store.list_planned_week(&week_start)?;
    let days = sessions_by_day(&sessions);

    println!();
    println_colored!(ui, BOLD, "  Week of {}", monday.format("%d %b %Y"));
    println!();

    for (idx, day) in days.iter().enumerate() {
        let date = add_days(monday, idx as i64);
        let header = format!("{} {}", DOW_LABEL[idx], date.format("%d"));
        if date == now.date() {
            println_colored!(ui, AMBER, "  {}  (today)", header);
        } else {
            println_colored!(ui, DIM, "  {}", header);
        }

        if day.is_empty() {
            println_colored!(ui, DIM, "      No sessions planned yet.");
            continue;
        }
        for s in day {
            println!(
                "    {} {}  {}  {} {}  {:>4}m  RPE {}",
                status_icon(ui, s),
                ui.paint(DIM, short_id(&s.id)),
                s.start_time,
                type_dot(ui, s.session_type),
                fit_width(&s.title, 24),
                s.duration_min,
                s.rpe_planned
            );
        }
    }

    let done = sessions.iter().filter(|s| s.is_done()).count();
    println!();
    println_colored!(
        ui,
        DIM,
        "  {} planned  ·  {} done  ·  {} total",
        sessions.len(),
        done,
        format_hours_minutes(planned_minutes(&sessions))
    );
    println!();
    Ok(())
}

// ─── Plan ────────────────────────────────────────────────────────────────────

fn check_rpe(rpe: u32) -> Result<u32> {
    if !(1..=10).contains(&rpe) {
        bail!("RPE must be between 1 and 10, got {}", rpe);
    }
    Ok(rpe)
}

fn check_duration(minutes: u32) -> Result<u32> {
    if !(1..=MAX_DURATION_MIN).contains(&minutes) {
        bail!("Duration must be between 1 and {} minutes, got {}", MAX_DURATION_MIN, minutes);
    }
    Ok(minutes)
}

/// Find the single planned session whose id starts with `prefix`.
fn resolve_planned(store: &dyn TrainingStore, prefix: &str) -> Result<PlannedSession> {
    let mut planned: Vec<PlannedSession> = store
        .find_sessions(prefix)?
        .into_iter()
        .filter_map(|r| match r {
            SessionRecord::Planned(p) => Some(p),
            SessionRecord::Completed(_) => None,
        })
        .collect();

    match planned.len() {
        0 => Err(anyhow!("No planned session matches '{}'", prefix)),
        1 => Ok(planned.remove(0)),
        n => Err(anyhow!("'{}' matches {} planned sessions, use a longer id", prefix, n)),
    }
}

pub fn handle_plan(
    store: &dyn TrainingStore,
    ui: &Ui,
    action: &PlanCommands,
    now: NaiveDateTime,
) -> Result<()> {
    let week_start = current_week_start(now);

    match action {
        PlanCommands::Add {
            day,
            template,
            session_type,
            title,
            time,
            duration,
            rpe,
        } => {
            let day_index = parse_day(day)
                .ok_or_else(|| anyhow!("Unknown day '{}'. Use mon..sun or 0..6", day))?;
            let settings = store.load_settings()?;

            let templates = store.list_templates()?;
            let preset = match template {
                Some(name) => Some(
                    template_by_title(&templates, name)
                        .ok_or_else(|| anyhow!("No template named '{}'", name))?,
                ),
                None => None,
            };

            let session_type = match session_type {
                Some(t) => SessionType::from_str(t)?,
                None => preset.map(|p| p.session_type).unwrap_or(settings.primary_type),
            };
            let title = title
                .clone()
                .or_else(|| preset.map(|p| p.title.clone()))
                .unwrap_or_else(|| default_title(session_type).to_string());
            if title.trim().is_empty() {
                bail!("Title cannot be empty");
            }
            let duration_min = check_duration(
                duration
                    .or(preset.map(|p| p.duration_min))
                    .unwrap_or(settings.default_duration),
            )?;
            let rpe_planned = check_rpe(
                rpe.or(preset.map(|p| p.rpe_default))
                    .unwrap_or(settings.default_rpe),
            )?;

            let existing = store.list_planned_week(&week_start)?;
            let days = sessions_by_day(&existing);
            let start_time = match time {
                Some(t) => add_minutes_hhmm(t, 0)
                    .ok_or_else(|| anyhow!("Invalid time '{}', expected HH:MM", t))?,
                None => next_free_time(&days[day_index as usize], DEFAULT_START),
            };

            let session = PlannedSession {
                id: Uuid::new_v4().to_string(),
                session_type,
                title: title.trim().to_string(),
                day_index,
                start_time,
                duration_min,
                rpe_planned,
                status: None,
            };
            apply(store, &week_start, &PlanCommand::Add(session.clone()))?;
            println_colored!(
                ui,
                GREEN,
                "  ✓ Planned {} on {} at {} ({})",
                session.title,
                DOW_LABEL[day_index as usize],
                session.start_time,
                short_id(&session.id)
            );
        }
        PlanCommands::Done {
            id,
            date,
            duration,
            rpe,
            notes,
        } => {
            let planned = resolve_planned(store, id)?;
            if planned.is_done() {
                println_colored!(ui, DIM, "  {} was already done, updating the log", planned.title);
            }
            let date = match date {
                Some(d) => parse_iso_date(d)
                    .ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", d))?,
                None => now.date(),
            };
            let entry = complete_entry(
                &planned,
                date,
                check_duration(duration.unwrap_or(planned.duration_min))?,
                check_rpe(rpe.unwrap_or(planned.rpe_planned))?,
                notes.as_deref(),
            );
            let load = compute_load(entry.duration_min, entry.rpe);
            apply(store, &week_start, &PlanCommand::Complete { planned: planned.clone(), entry })?;
            println_colored!(ui, GREEN, "  ✓ {} logged, load {}", planned.title, load);
        }
        PlanCommands::Rm { id, yes } => {
            let planned = resolve_planned(store, id)?;
            let settings = store.load_settings()?;
            if settings.confirm_delete && !yes {
                let answer = prompt(&format!("  Delete '{}' and its log entries? [y/N] ", planned.title))?;
                if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    println_colored!(ui, DIM, "  Nothing deleted");
                    return Ok(());
                }
            }
            let outcome = apply(store, &week_start, &PlanCommand::Delete(planned.clone()))?;
            debug!("{} sessions left this week", outcome.week.len());
            println_colored!(ui, RED, "  ✗ Removed {}", planned.title);
        }
    }
    Ok(())
}

// ─── Log ─────────────────────────────────────────────────────────────────────

pub fn handle_log(
    store: &dyn TrainingStore,
    ui: &Ui,
    config: &AppConfig,
    range: Option<&str>,
    session_type: Option<&str>,
    now: NaiveDateTime,
) -> Result<()> {
    let filter = LogFilter {
        range: DateMode::from_str(range.unwrap_or(&config.views.log_range))?,
        session_type: session_type.map(SessionType::from_str).transpose()?,
    };
    let sessions = store.list_all_completed()?;
    let filtered = filter.apply(&sessions, now);

    println!();
    println_colored!(ui, BOLD, "  Log · {}", filter.range.label());
    println_colored!(
        ui,
        DIM,
        "  {} item{}",
        filtered.len(),
        if filtered.len() == 1 { "" } else { "s" }
    );
    println!();

    if filtered.is_empty() {
        println_colored!(ui, DIM, "  No completed sessions match these filters.");
        println!();
        return Ok(());
    }

    for (date_iso, day) in group_by_day(&filtered) {
        let header = parse_iso_date(&date_iso)
            .map(|d| d.format("%a %d %b %Y").to_string())
            .unwrap_or(date_iso);
        println_colored!(ui, AMBER, "  {}", header);
        for s in &day {
            print_completed_line(ui, s);
        }
        println!();
    }
    Ok(())
}

fn print_completed_line(ui: &Ui, s: &CompletedSession) {
    println!(
        "    {}  {} {}  {:>4}m  RPE {:<2}  load {}",
        s.start_time,
        type_dot(ui, s.session_type),
        fit_width(&s.title, 24),
        s.duration_min,
        s.rpe,
        compute_load(s.duration_min, s.rpe)
    );
    if let Some(notes) = &s.notes {
        println_colored!(ui, DIM, "           {}", notes);
    }
}

// ─── Insights ────────────────────────────────────────────────────────────────

/// Turn the command line range options into a window selector.
pub fn parse_insights_range(
    range: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    default_range: &str,
) -> Result<RangeKind> {
    let key = match range {
        Some(r) => r,
        None if from.is_some() || to.is_some() => "custom",
        None => default_range,
    };
    match key.to_lowercase().as_str() {
        "7d" | "last-7" => Ok(RangeKind::Last(7)),
        "30d" | "last-30" => Ok(RangeKind::Last(30)),
        "week" | "this-week" => Ok(RangeKind::ThisWeek),
        "custom" => Ok(validate_custom(from, to)?),
        other => Err(anyhow!("Unknown range '{}'. Use 7d, 30d or custom", other)),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_insights(
    store: &dyn TrainingStore,
    ui: &Ui,
    config: &AppConfig,
    range: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let kind = match parse_insights_range(range, from, to, &config.views.insights_range) {
        Ok(kind) => kind,
        Err(e) => match e.downcast_ref::<RangeError>() {
            Some(range_err) => {
                println!();
                println_colored!(ui, AMBER, "  Custom range pending");
                println_colored!(ui, DIM, "  {}", range_err);
                println!();
                return Ok(());
            }
            None => return Err(e),
        },
    };

    let window = resolve_range(kind, now);
    let range_items = store.list_completed_in_range(&window.start_iso, &window.end_iso)?;
    let history = store.list_all_completed()?;
    let report = Insights::compute(kind, &range_items, &history, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println_colored!(
        ui,
        BOLD,
        "  Insights · {} → {} ({} days)",
        report.range.start_iso,
        report.range.end_iso,
        report.range.day_count
    );
    println!();

    if report.summary.total_sessions == 0 {
        println_colored!(ui, DIM, "  Complete a session in your week plan to unlock insights.");
        println!(
            "  {} Badminton  {} Workout  {} Recovery",
            type_dot(ui, SessionType::Badminton),
            type_dot(ui, SessionType::Gym),
            type_dot(ui, SessionType::Recovery)
        );
        println!();
        return Ok(());
    }

    let s = &report.summary;
    println_colored!(ui, AMBER, "  Overview");
    println!(
        "  Sessions ({}):  {}  ·  {}/day",
        kind.label(),
        s.total_sessions,
        format_decimal(s.sessions_per_day)
    );
    println!(
        "  Total time:     {}  ·  {}m avg",
        format_hours_minutes(s.total_minutes),
        s.avg_minutes.round()
    );
    println!(
        "  Training load:  {}  ·  {} avg",
        s.total_load,
        s.avg_load.round()
    );
    println!();

    println_colored!(ui, AMBER, "  By type");
    let max_count = report.totals.max_count().max(1);
    for t in SessionType::all() {
        let bucket = report.totals.get(t);
        println!(
            "  {} {}  {}  {} · {} · load {}",
            type_dot(ui, t),
            fit_width(t.display_name(), 10),
            ui.paint(type_color(t), &progress_bar(bucket.count, max_count, ui.bar_width)),
            bucket.count,
            format_hours_minutes(bucket.minutes),
            bucket.load
        );
    }
    println!();

    println_colored!(ui, AMBER, "  Patterns");
    if report.most_common_title != NO_TITLE {
        println!("  Most common:    {}", report.most_common_title);
    }
    println!("  Top type:       {}", report.best_type.display_name());
    println!(
        "  Streak:         {} days current  |  {} days best",
        report.streak.current, report.streak.best
    );
    println!(
        "  Best day ({}d): {}",
        WEEKDAY_WINDOW_DAYS, DOW_LABEL[report.best_weekday]
    );
    let max_day = report.weekday_counts.iter().copied().max().unwrap_or(0).max(1);
    for (idx, count) in report.weekday_counts.iter().enumerate() {
        println!(
            "    {}  {}  {}",
            DOW_LABEL[idx],
            progress_bar(*count, max_day, ui.bar_width / 2),
            count
        );
    }
    println!();

    println_colored!(ui, AMBER, "  This week");
    let cells = week_consistency(&history, now);
    let mut line = String::from("  ");
    for cell in &cells {
        let label = if cell.is_today {
            ui.paint(BOLD, DOW_LABEL[cell.day_index as usize])
        } else {
            DOW_LABEL[cell.day_index as usize].to_string()
        };
        line.push_str(&label);
        line.push(' ');
        if cell.sessions.is_empty() {
            line.push_str(&ui.paint(DIM, "·"));
        }
        for session in cell.sessions.iter().take(3) {
            line.push_str(&type_dot(ui, session.session_type));
        }
        if cell.sessions.len() > 3 {
            line.push_str(&format!("+{}", cell.sessions.len() - 3));
        }
        line.push_str("  ");
    }
    println!("{}", line.trim_end());
    println!();
    println_colored!(ui, GREEN, "  {}", report.hint);
    println!();
    Ok(())
}

// ─── Show ────────────────────────────────────────────────────────────────────

pub fn handle_show(store: &dyn TrainingStore, ui: &Ui, prefix: &str) -> Result<()> {
    let records = store.find_sessions(prefix)?;
    if records.is_empty() {
        bail!("No session matches '{}'", prefix);
    }
    println!();
    for record in &records {
        let kind = if record.is_completed() { "Completed" } else { "Planned" };
        println_colored!(ui, BOLD, "  {} {}  {}", kind, short_id(record.id()), record.title());
        println!(
            "    {} {}  ·  {}  ·  {}m  ·  RPE {}  ·  load {}",
            type_dot(ui, record.session_type()),
            record.session_type(),
            record.start_time(),
            record.duration_min(),
            record.rpe(),
            compute_load(record.duration_min(), record.rpe())
        );
        match record {
            SessionRecord::Planned(p) => println_colored!(
                ui,
                DIM,
                "    {} this week  ·  {}",
                DOW_LABEL.get(p.day_index as usize).copied().unwrap_or("?"),
                p.effective_status().as_str()
            ),
            SessionRecord::Completed(c) => {
                println_colored!(ui, DIM, "    on {}  ·  plan {}", c.date_iso, short_id(&c.planned_session_id));
                if let Some(notes) = &c.notes {
                    println_colored!(ui, DIM, "    {}", notes);
                }
            }
        }
    }
    println!();
    Ok(())
}

// ─── Templates ───────────────────────────────────────────────────────────────

pub fn handle_templates(store: &dyn TrainingStore, ui: &Ui, action: &TemplateCommands) -> Result<()> {
    match action {
        TemplateCommands::List => {
            let templates = store.list_templates()?;
            println!();
            if templates.is_empty() {
                println_colored!(ui, DIM, "  No templates yet");
            }
            for t in &templates {
                println!(
                    "  {} {}  {:>4}m  RPE {:<2}  {}",
                    type_dot(ui, t.session_type),
                    fit_width(&t.title, 24),
                    t.duration_min,
                    t.rpe_default,
                    ui.paint(DIM, &t.focus_tags.join(", "))
                );
            }
            println!();
        }
        TemplateCommands::Add {
            title,
            session_type,
            duration,
            rpe,
            tags,
        } => {
            if title.trim().is_empty() {
                bail!("Title cannot be empty");
            }
            let draft = TemplateDraft {
                session_type: SessionType::from_str(session_type)?,
                title: title.trim().to_string(),
                duration_min: check_duration(*duration)?,
                rpe_default: check_rpe(*rpe)?,
                focus_tags: tags
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            };
            let t = store.create_template(&draft)?;
            println_colored!(ui, GREEN, "  ✓ Added template: {}", t.title);
        }
        TemplateCommands::Rm { name } => {
            let templates = store.list_templates()?;
            let target = template_by_title(&templates, name)
                .or_else(|| templates.iter().find(|t| t.id.starts_with(name.as_str())))
                .ok_or_else(|| anyhow!("Template '{}' not found", name))?;
            store.delete_template(&target.id)?;
            println_colored!(ui, RED, "  ✗ Removed template {}", target.title);
        }
    }
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub fn handle_settings(store: &dyn TrainingStore, ui: &Ui, action: &SettingsCommands) -> Result<()> {
    let mut settings = store.load_settings()?;
    match action {
        SettingsCommands::Show => {
            println!();
            println_colored!(ui, BOLD, "  Settings");
            println!("  primary-type        {}", settings.primary_type.as_str().to_lowercase());
            println!("  default-duration    {}", settings.default_duration);
            println!("  default-rpe         {}", settings.default_rpe);
            println!("  week-starts-monday  {}", settings.week_starts_monday);
            println!("  confirm-delete      {}", settings.confirm_delete);
            println!();
        }
        SettingsCommands::Set { key, value } => {
            settings.set(key, value)?;
            store.save_settings(&settings)?;
            println_colored!(ui, GREEN, "  ✓ {} = {}", key, value);
        }
    }
    Ok(())
}

// ─── Reset ───────────────────────────────────────────────────────────────────

pub fn handle_reset(store: &dyn TrainingStore, ui: &Ui, yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt("  This will permanently delete all sessions, templates, and settings. Type 'reset' to continue: ")?;
        if answer.trim() != "reset" {
            println_colored!(ui, DIM, "  Nothing deleted");
            return Ok(());
        }
    }
    store.reset_all()?;
    println_colored!(ui, RED, "  ✗ All data deleted");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
