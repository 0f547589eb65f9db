mod analytics;
mod cli;
mod config;
mod db;
mod models;
mod planner;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, Ui};
use config::AppConfig;
use db::migrations::run_migrations;
use db::{SqliteStore, TrainingStore};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    if !AppConfig::config_path()?.exists() {
        config.save().context("Writing default config")?;
    }
    if let Some(path) = cli.db {
        config.storage.db_path = Some(path);
    }

    // Ensure data directory exists and open DB
    let db_path = config.ensure_db_dir()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    let store = SqliteStore::new(&conn);
    let seeded = store.seed_default_templates()?;
    if seeded > 0 {
        debug!("First run, added {} templates", seeded);
    }

    let ui = Ui::from_config(&config);
    let now = Local::now().naive_local();

    match cli.command {
        Some(Commands::Week) | None => handlers::handle_week(&store, &ui, now)?,
        Some(Commands::Plan { action }) => handlers::handle_plan(&store, &ui, &action, now)?,
        Some(Commands::Log { range, session_type }) => handlers::handle_log(
            &store,
            &ui,
            &config,
            range.as_deref(),
            session_type.as_deref(),
            now,
        )?,
        Some(Commands::Insights {
            range,
            from,
            to,
            json,
        }) => handlers::handle_insights(
            &store,
            &ui,
            &config,
            range.as_deref(),
            from.as_deref(),
            to.as_deref(),
            json,
            now,
        )?,
        Some(Commands::Show { id }) => handlers::handle_show(&store, &ui, &id)?,
        Some(Commands::Templates { action }) => handlers::handle_templates(&store, &ui, &action)?,
        Some(Commands::Settings { action }) => handlers::handle_settings(&store, &ui, &action)?,
        Some(Commands::Reset { yes }) => handlers::handle_reset(&store, &ui, yes)?,
    }

    Ok(())
}
