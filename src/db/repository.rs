use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::analytics::calendar::{monday_index, parse_iso_date, start_of_week_monday, to_iso_date};
use crate::models::template::default_templates;
use crate::models::{
    CompletedSession, PlannedSession, PlannedStatus, SessionRecord, Settings, Template,
    TemplateDraft,
};

pub const ALL_TIME_START: &str = "0001-01-01";
pub const ALL_TIME_END: &str = "9999-12-31";

/// Map a text column through `FromStr`, reporting failures as conversion errors.
fn parse_col<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    T::from_str(value).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ─── Templates ───────────────────────────────────────────────────────────────

pub struct TemplateRepo;

impl TemplateRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
        let session_type: String = row.get(1)?;
        let tags: String = row.get(5)?;
        Ok(Template {
            id: row.get(0)?,
            session_type: parse_col(1, &session_type)?,
            title: row.get(2)?,
            duration_min: row.get(3)?,
            rpe_default: row.get(4)?,
            focus_tags: serde_json::from_str(&tags).unwrap_or_default(),
        })
    }

    pub fn list(conn: &Connection) -> Result<Vec<Template>> {
        let mut stmt = conn.prepare(
            "SELECT id, type, title, duration_min, rpe_default, focus_tags
             FROM templates ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn create(conn: &Connection, draft: &TemplateDraft) -> Result<Template> {
        let id = new_id();
        let tags = serde_json::to_string(&draft.focus_tags)?;
        conn.execute(
            "INSERT INTO templates (id, type, title, duration_min, rpe_default, focus_tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                draft.session_type.as_str(),
                draft.title,
                draft.duration_min,
                draft.rpe_default,
                tags
            ],
        )
        .with_context(|| format!("Creating template '{}'", draft.title))?;

        Ok(Template {
            id,
            session_type: draft.session_type,
            title: draft.title.clone(),
            duration_min: draft.duration_min,
            rpe_default: draft.rpe_default,
            focus_tags: draft.focus_tags.clone(),
        })
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))
            .map_err(anyhow::Error::from)
    }
}

// ─── Planned sessions ────────────────────────────────────────────────────────

pub struct PlannedRepo;

impl PlannedRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<PlannedSession> {
        let session_type: String = row.get(1)?;
        let status: Option<String> = row.get(7)?;
        Ok(PlannedSession {
            id: row.get(0)?,
            session_type: parse_col(1, &session_type)?,
            title: row.get(2)?,
            day_index: row.get(3)?,
            start_time: row.get(4)?,
            duration_min: row.get(5)?,
            rpe_planned: row.get(6)?,
            status: status.map(|s| parse_col::<PlannedStatus>(7, &s)).transpose()?,
        })
    }

    pub fn list_week(conn: &Connection, week_start: &str) -> Result<Vec<PlannedSession>> {
        let mut stmt = conn.prepare(
            "SELECT id, type, title, day_index, start_time, duration_min, rpe_planned, status
             FROM planned_sessions WHERE week_start = ?1
             ORDER BY day_index, start_time",
        )?;
        let rows = stmt.query_map(params![week_start], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn find_by_prefix(conn: &Connection, prefix: &str) -> Result<Vec<PlannedSession>> {
        let mut stmt = conn.prepare(
            "SELECT id, type, title, day_index, start_time, duration_min, rpe_planned, status
             FROM planned_sessions WHERE substr(id, 1, length(?1)) = ?1
             ORDER BY week_start DESC, day_index, start_time",
        )?;
        let rows = stmt.query_map(params![prefix], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn upsert(conn: &Connection, week_start: &str, s: &PlannedSession) -> Result<()> {
        conn.execute(
            "INSERT INTO planned_sessions
                (id, week_start, day_index, start_time, type, title, duration_min, rpe_planned, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                week_start = ?2, day_index = ?3, start_time = ?4, type = ?5, title = ?6,
                duration_min = ?7, rpe_planned = ?8, status = ?9",
            params![
                s.id,
                week_start,
                s.day_index,
                s.start_time,
                s.session_type.as_str(),
                s.title,
                s.duration_min,
                s.rpe_planned,
                s.status.map(|st| st.as_str()),
            ],
        )
        .with_context(|| format!("Saving planned session {}", s.id))?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM planned_sessions WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn set_status(conn: &Connection, id: &str, status: PlannedStatus) -> Result<()> {
        let changed = conn.execute(
            "UPDATE planned_sessions SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(anyhow!("No planned session with id {}", id));
        }
        Ok(())
    }
}

// ─── Completed sessions ──────────────────────────────────────────────────────

pub struct CompletedRepo;

impl CompletedRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<CompletedSession> {
        let session_type: String = row.get(2)?;
        Ok(CompletedSession {
            id: row.get(0)?,
            planned_session_id: row.get(1)?,
            session_type: parse_col(2, &session_type)?,
            title: row.get(3)?,
            date_iso: row.get(4)?,
            start_time: row.get(5)?,
            duration_min: row.get(6)?,
            rpe: row.get(7)?,
            notes: row.get(8)?,
        })
    }

    /// Upserts on the (week, day, start time) slot, so logging the same slot
    /// twice keeps one record.
    pub fn insert(conn: &Connection, entry: &CompletedSession) -> Result<()> {
        let date = parse_iso_date(&entry.date_iso)
            .ok_or_else(|| anyhow!("Invalid session date '{}'", entry.date_iso))?;
        let week_start = to_iso_date(start_of_week_monday(date));
        let day_index = monday_index(date);

        conn.execute(
            "INSERT INTO completed_sessions
                (id, planned_session_id, week_start, day_index, type, title,
                 date_iso, start_time, duration_min, rpe, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(week_start, day_index, start_time) DO UPDATE SET
                planned_session_id = ?2, type = ?5, title = ?6, date_iso = ?7,
                duration_min = ?9, rpe = ?10, notes = ?11",
            params![
                entry.id,
                entry.planned_session_id,
                week_start,
                day_index,
                entry.session_type.as_str(),
                entry.title,
                entry.date_iso,
                entry.start_time,
                entry.duration_min,
                entry.rpe,
                entry.notes,
            ],
        )
        .with_context(|| format!("Recording completed session {}", entry.id))?;
        Ok(())
    }

    pub fn delete_by_planned_id(conn: &Connection, planned_id: &str) -> Result<usize> {
        conn.execute(
            "DELETE FROM completed_sessions WHERE planned_session_id = ?1",
            params![planned_id],
        )
        .map_err(anyhow::Error::from)
    }

    pub fn list_range(conn: &Connection, start: &str, end: &str) -> Result<Vec<CompletedSession>> {
        let mut stmt = conn.prepare(
            "SELECT id, planned_session_id, type, title, date_iso, start_time, duration_min, rpe, notes
             FROM completed_sessions WHERE date_iso >= ?1 AND date_iso <= ?2
             ORDER BY date_iso DESC, start_time DESC",
        )?;
        let rows = stmt.query_map(params![start, end], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn find_by_prefix(conn: &Connection, prefix: &str) -> Result<Vec<CompletedSession>> {
        let mut stmt = conn.prepare(
            "SELECT id, planned_session_id, type, title, date_iso, start_time, duration_min, rpe, notes
             FROM completed_sessions WHERE substr(id, 1, length(?1)) = ?1
             ORDER BY date_iso DESC, start_time DESC",
        )?;
        let rows = stmt.query_map(params![prefix], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub struct SettingsRepo;

impl SettingsRepo {
    /// Defaults when nothing is stored or the stored document is unreadable.
    pub fn load(conn: &Connection) -> Result<Settings> {
        let raw: Option<String> = conn
            .query_row("SELECT settings FROM user_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            None => Ok(Settings::default()),
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings: {}", e);
                Settings::default()
            })),
        }
    }

    pub fn save(conn: &Connection, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        conn.execute(
            "INSERT INTO user_settings (id, settings, updated_at) VALUES (1, ?1, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET settings = ?1, updated_at = datetime('now')",
            params![json],
        )?;
        Ok(())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Persistence for templates, the weekly plan, the training log and settings.
pub trait TrainingStore {
    fn list_templates(&self) -> Result<Vec<Template>>;
    fn create_template(&self, draft: &TemplateDraft) -> Result<Template>;
    fn delete_template(&self, id: &str) -> Result<()>;
    /// Insert the preset templates when none exist. Returns how many were added.
    fn seed_default_templates(&self) -> Result<usize>;

    fn list_planned_week(&self, week_start: &str) -> Result<Vec<PlannedSession>>;
    fn upsert_planned(&self, week_start: &str, session: &PlannedSession) -> Result<()>;
    fn delete_planned(&self, id: &str) -> Result<()>;
    fn mark_planned_done(&self, id: &str) -> Result<()>;

    fn insert_completed(&self, entry: &CompletedSession) -> Result<()>;
    fn delete_completed_by_planned_id(&self, planned_id: &str) -> Result<()>;
    /// Newest first.
    fn list_completed_in_range(&self, start: &str, end: &str) -> Result<Vec<CompletedSession>>;

    fn list_all_completed(&self) -> Result<Vec<CompletedSession>> {
        self.list_completed_in_range(ALL_TIME_START, ALL_TIME_END)
    }

    /// Planned and completed sessions whose id starts with `prefix`.
    fn find_sessions(&self, prefix: &str) -> Result<Vec<SessionRecord>>;

    fn load_settings(&self) -> Result<Settings>;
    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Remove everything: completed, planned, templates, settings.
    fn reset_all(&self) -> Result<()>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TrainingStore for SqliteStore<'_> {
    fn list_templates(&self) -> Result<Vec<Template>> {
        TemplateRepo::list(self.conn)
    }

    fn create_template(&self, draft: &TemplateDraft) -> Result<Template> {
        TemplateRepo::create(self.conn, draft)
    }

    fn delete_template(&self, id: &str) -> Result<()> {
        TemplateRepo::delete(self.conn, id)
    }

    fn seed_default_templates(&self) -> Result<usize> {
        if TemplateRepo::count(self.conn)? > 0 {
            return Ok(0);
        }
        let presets = default_templates();
        let tx = self.conn.unchecked_transaction()?;
        for draft in &presets {
            TemplateRepo::create(&tx, draft)?;
        }
        tx.commit()?;
        debug!("Seeded {} default templates", presets.len());
        Ok(presets.len())
    }

    fn list_planned_week(&self, week_start: &str) -> Result<Vec<PlannedSession>> {
        PlannedRepo::list_week(self.conn, week_start)
    }

    fn upsert_planned(&self, week_start: &str, session: &PlannedSession) -> Result<()> {
        debug!("Upserting planned session {} for week {}", session.id, week_start);
        PlannedRepo::upsert(self.conn, week_start, session)
    }

    fn delete_planned(&self, id: &str) -> Result<()> {
        PlannedRepo::delete(self.conn, id)
    }

    fn mark_planned_done(&self, id: &str) -> Result<()> {
        PlannedRepo::set_status(self.conn, id, PlannedStatus::Done)
    }

    fn insert_completed(&self, entry: &CompletedSession) -> Result<()> {
        debug!("Recording completed session {} on {}", entry.id, entry.date_iso);
        CompletedRepo::insert(self.conn, entry)
    }

    fn delete_completed_by_planned_id(&self, planned_id: &str) -> Result<()> {
        let removed = CompletedRepo::delete_by_planned_id(self.conn, planned_id)?;
        debug!("Removed {} completed sessions for {}", removed, planned_id);
        Ok(())
    }

    fn list_completed_in_range(&self, start: &str, end: &str) -> Result<Vec<CompletedSession>> {
        CompletedRepo::list_range(self.conn, start, end)
    }

    fn find_sessions(&self, prefix: &str) -> Result<Vec<SessionRecord>> {
        let mut found: Vec<SessionRecord> = PlannedRepo::find_by_prefix(self.conn, prefix)?
            .into_iter()
            .map(SessionRecord::Planned)
            .collect();
        found.extend(
            CompletedRepo::find_by_prefix(self.conn, prefix)?
                .into_iter()
                .map(SessionRecord::Completed),
        );
        Ok(found)
    }

    fn load_settings(&self) -> Result<Settings> {
        SettingsRepo::load(self.conn)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        SettingsRepo::save(self.conn, settings)
    }

    fn reset_all(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM completed_sessions", [])?;
        tx.execute("DELETE FROM planned_sessions", [])?;
        tx.execute("DELETE FROM templates", [])?;
        tx.execute("DELETE FROM user_settings", [])?;
        tx.commit()?;
        Ok(())
    }
}

/// Case-insensitive lookup of a template by title.
pub fn template_by_title<'t>(templates: &'t [Template], title: &str) -> Option<&'t Template> {
    let wanted = title.to_lowercase();
    templates.iter().find(|t| t.title.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::SessionType;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn planned(id: &str, day: u32, time: &str) -> PlannedSession {
        PlannedSession {
            id: id.into(),
            session_type: SessionType::Badminton,
            title: "Matchplay".into(),
            day_index: day,
            start_time: time.into(),
            duration_min: 90,
            rpe_planned: 8,
            status: None,
        }
    }

    fn completed(id: &str, planned_id: &str, date: &str, time: &str) -> CompletedSession {
        CompletedSession {
            id: id.into(),
            planned_session_id: planned_id.into(),
            session_type: SessionType::Badminton,
            title: "Matchplay".into(),
            date_iso: date.into(),
            start_time: time.into(),
            duration_min: 80,
            rpe: 7,
            notes: Some("good rallies".into()),
        }
    }

    #[test]
    fn seeding_only_fills_an_empty_table() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        assert_eq!(store.seed_default_templates().unwrap(), 7);
        assert_eq!(store.seed_default_templates().unwrap(), 0);

        let templates = store.list_templates().unwrap();
        assert_eq!(templates.len(), 7);
        assert_eq!(templates[0].title, "Footwork + Defense");
        assert_eq!(templates[0].focus_tags, vec!["footwork", "defense"]);
        assert!(template_by_title(&templates, "easy CARDIO").is_some());
    }

    #[test]
    fn template_create_and_delete() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        let t = store
            .create_template(&TemplateDraft {
                session_type: SessionType::Gym,
                title: "Core".into(),
                duration_min: 30,
                rpe_default: 5,
                focus_tags: vec![],
            })
            .unwrap();
        assert_eq!(store.list_templates().unwrap(), vec![t.clone()]);
        store.delete_template(&t.id).unwrap();
        assert!(store.list_templates().unwrap().is_empty());
    }

    #[test]
    fn planned_week_is_ordered_and_scoped() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        store.upsert_planned("2026-01-26", &planned("b", 2, "19:00")).unwrap();
        store.upsert_planned("2026-01-26", &planned("a", 2, "07:00")).unwrap();
        store.upsert_planned("2026-01-26", &planned("c", 0, "18:00")).unwrap();
        store.upsert_planned("2026-02-02", &planned("d", 0, "18:00")).unwrap();

        let week = store.list_planned_week("2026-01-26").unwrap();
        let ids: Vec<_> = week.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        store.mark_planned_done("a").unwrap();
        let week = store.list_planned_week("2026-01-26").unwrap();
        assert_eq!(week[1].status, Some(PlannedStatus::Done));
        assert!(store.mark_planned_done("missing").is_err());
    }

    #[test]
    fn completed_range_and_cascade() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        store.insert_completed(&completed("c1", "p1", "2026-01-26", "18:00")).unwrap();
        store.insert_completed(&completed("c2", "p2", "2026-01-27", "18:00")).unwrap();
        store.insert_completed(&completed("c3", "p1", "2026-01-10", "09:00")).unwrap();

        let range = store.list_completed_in_range("2026-01-20", "2026-01-31").unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].id, "c2");
        assert_eq!(range[1].notes.as_deref(), Some("good rallies"));

        store.delete_completed_by_planned_id("p1").unwrap();
        let all = store.list_all_completed().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "c2");
    }

    #[test]
    fn same_slot_is_upserted() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        store.insert_completed(&completed("c1", "p1", "2026-01-26", "18:00")).unwrap();
        let mut again = completed("c9", "p1", "2026-01-26", "18:00");
        again.rpe = 9;
        store.insert_completed(&again).unwrap();

        let all = store.list_all_completed().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rpe, 9);
        assert!(store.insert_completed(&completed("x", "p", "26/01/2026", "18:00")).is_err());
    }

    #[test]
    fn find_sessions_returns_tagged_records() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        store.upsert_planned("2026-01-26", &planned("abc-1", 0, "18:00")).unwrap();
        store.insert_completed(&completed("abd-2", "abc-1", "2026-01-26", "18:00")).unwrap();

        let found = store.find_sessions("ab").unwrap();
        assert_eq!(found.len(), 2);
        assert!(!found[0].is_completed());
        assert!(found[1].is_completed());
        assert_eq!(found[1].session_type(), SessionType::Badminton);
        assert_eq!(store.find_sessions("abd").unwrap().len(), 1);
    }

    #[test]
    fn settings_default_then_roundtrip() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        assert_eq!(store.load_settings().unwrap(), Settings::default());

        let mut s = Settings::default();
        s.default_duration = 75;
        store.save_settings(&s).unwrap();
        assert_eq!(store.load_settings().unwrap().default_duration, 75);

        conn.execute("UPDATE user_settings SET settings = 'not json' WHERE id = 1", [])
            .unwrap();
        assert_eq!(store.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn reset_clears_everything() {
        let conn = open();
        let store = SqliteStore::new(&conn);
        store.seed_default_templates().unwrap();
        store.upsert_planned("2026-01-26", &planned("p1", 0, "18:00")).unwrap();
        store.insert_completed(&completed("c1", "p1", "2026-01-26", "18:00")).unwrap();
        store.save_settings(&Settings::default()).unwrap();

        store.reset_all().unwrap();
        assert!(store.list_templates().unwrap().is_empty());
        assert!(store.list_planned_week("2026-01-26").unwrap().is_empty());
        assert!(store.list_all_completed().unwrap().is_empty());
    }
}
