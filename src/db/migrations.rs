use anyhow::Result;
use log::info;
use rusqlite::Connection;

use crate::db::repository::MetaRepo;

pub const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS templates (
            id           TEXT PRIMARY KEY,
            type         TEXT NOT NULL CHECK(type IN ('BADMINTON','GYM','RECOVERY')),
            title        TEXT NOT NULL,
            duration_min INTEGER NOT NULL CHECK(duration_min > 0),
            rpe_default  INTEGER NOT NULL CHECK(rpe_default BETWEEN 1 AND 10),
            focus_tags   TEXT NOT NULL DEFAULT '[]',
            created_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS planned_sessions (
            id           TEXT PRIMARY KEY,
            week_start   TEXT NOT NULL,
            day_index    INTEGER NOT NULL CHECK(day_index BETWEEN 0 AND 6),
            start_time   TEXT NOT NULL,
            type         TEXT NOT NULL CHECK(type IN ('BADMINTON','GYM','RECOVERY')),
            title        TEXT NOT NULL,
            duration_min INTEGER NOT NULL CHECK(duration_min > 0),
            rpe_planned  INTEGER NOT NULL CHECK(rpe_planned BETWEEN 1 AND 10),
            status       TEXT CHECK(status IS NULL OR status IN ('PLANNED','DONE','SKIPPED','PARTIAL')),
            created_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_planned_week ON planned_sessions(week_start);

        CREATE TABLE IF NOT EXISTS completed_sessions (
            id                 TEXT PRIMARY KEY,
            planned_session_id TEXT NOT NULL,
            week_start         TEXT NOT NULL,
            day_index          INTEGER NOT NULL CHECK(day_index BETWEEN 0 AND 6),
            type               TEXT NOT NULL CHECK(type IN ('BADMINTON','GYM','RECOVERY')),
            title              TEXT NOT NULL,
            date_iso           TEXT NOT NULL,
            start_time         TEXT NOT NULL,
            duration_min       INTEGER NOT NULL CHECK(duration_min > 0),
            rpe                INTEGER NOT NULL CHECK(rpe BETWEEN 1 AND 10),
            notes              TEXT,
            created_at         TEXT DEFAULT (datetime('now')),
            UNIQUE(week_start, day_index, start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_completed_date ON completed_sessions(date_iso);
        CREATE INDEX IF NOT EXISTS idx_completed_planned ON completed_sessions(planned_session_id);

        CREATE TABLE IF NOT EXISTS user_settings (
            id         INTEGER PRIMARY KEY CHECK(id = 1),
            settings   TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    if MetaRepo::get(conn, "schema_version")?.as_deref() != Some(SCHEMA_VERSION) {
        info!("Database schema at version {}", SCHEMA_VERSION);
        MetaRepo::set(conn, "schema_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(
            MetaRepo::get(&conn, "schema_version").unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[test]
    fn schema_rejects_bad_day_index() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let res = conn.execute(
            "INSERT INTO planned_sessions
                (id, week_start, day_index, start_time, type, title, duration_min, rpe_planned)
             VALUES ('x', '2026-01-26', 7, '18:00', 'GYM', 'Upper', 60, 7)",
            [],
        );
        assert!(res.is_err());
    }
}
