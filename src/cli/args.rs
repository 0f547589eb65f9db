use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "courtplan", version, author, about = "Plan, log and review badminton, gym and recovery training")]
pub struct Cli {
    /// Use this database file instead of the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show this week's plan, day by day
    Week,
    /// Add, complete or remove planned sessions
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    /// Show completed sessions, grouped by day
    Log {
        /// this-week, last-7, this-month or all
        #[arg(long)]
        range: Option<String>,
        /// Only show one session type (badminton, gym, recovery)
        #[arg(long = "type")]
        session_type: Option<String>,
    },
    /// Training statistics for a date range
    Insights {
        /// 7d, 30d or custom
        #[arg(long)]
        range: Option<String>,
        /// Start of a custom range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End of a custom range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one planned or completed session by id prefix
    Show {
        id: String,
    },
    /// Session templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Show or change defaults
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Delete all sessions, templates and settings
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Plan a session on a day of this week
    Add {
        /// Day: mon..sun or 0..6
        day: String,
        /// Start from a template (matched by title)
        #[arg(long)]
        template: Option<String>,
        /// Session type: badminton, gym or recovery
        #[arg(long = "type")]
        session_type: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Start time HH:MM (defaults to the next free hour from 18:00)
        #[arg(long)]
        time: Option<String>,
        /// Duration in minutes
        #[arg(long)]
        duration: Option<u32>,
        /// Planned RPE 1-10
        #[arg(long)]
        rpe: Option<u32>,
    },
    /// Mark a planned session as done and log it
    Done {
        /// Planned session id (a prefix is enough)
        id: String,
        /// Date it happened (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Actual minutes (defaults to planned)
        #[arg(long)]
        duration: Option<u32>,
        /// Actual RPE (defaults to planned)
        #[arg(long)]
        rpe: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a planned session and anything logged for it
    Rm {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List templates
    List,
    /// Add a template
    Add {
        title: String,
        #[arg(long = "type", default_value = "badminton")]
        session_type: String,
        #[arg(long, default_value = "60")]
        duration: u32,
        #[arg(long, default_value = "6")]
        rpe: u32,
        /// Comma separated focus tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Remove a template by title or id prefix
    Rm {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print current settings
    Show,
    /// Change one setting, e.g. `set default-rpe 7`
    Set {
        key: String,
        value: String,
    },
}
