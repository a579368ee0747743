//! Command-line and environment configuration.
//!
//! # Invariants
//! - Blank environment values fall back to defaults.
//! - Paths resolve once per invocation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "notebox.sqlite3";
const SESSION_FILE_PREFIX: &str = "notebox";

#[derive(Debug, Parser)]
#[command(name = "notebox", version, about = "Private multi-user notes")]
pub struct Cli {
    /// SQLite database file.
    #[arg(long, env = "NOTEBOX_DB_PATH", global = true)]
    pub db_path: Option<String>,

    /// File holding the current session key.
    #[arg(long, env = "NOTEBOX_SESSION_FILE", global = true)]
    pub session_file: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "NOTEBOX_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "NOTEBOX_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and log in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NOTEBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in to an existing account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NOTEBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session.
    Logout,
    /// Show the logged-in account.
    Whoami {
        #[arg(long)]
        json: bool,
    },
    /// List your notes, most recently touched first.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one note; id 0 opens an empty new note.
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Save a note; id 0 creates a new one.
    Save {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Permanently delete a note.
    Delete { id: i64 },
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub session_file: PathBuf,
    pub log_dir: Option<String>,
    pub log_level: String,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            db_path: non_blank(cli.db_path.as_deref())
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            session_file: non_blank(cli.session_file.as_deref())
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
            log_dir: non_blank(cli.log_dir.as_deref()).map(str::to_string),
            log_level: non_blank(cli.log_level.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| notebox_core::default_log_level().to_string()),
        }
    }
}

/// Per-OS-user file in the temp dir, so accounts sharing a host never
/// share a session.
fn default_session_file() -> PathBuf {
    let owner = ["USER", "USERNAME"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|value| {
            let cleaned: String = value
                .trim()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        });
    let file_name = match owner {
        Some(owner) => format!("{SESSION_FILE_PREFIX}-{owner}.session"),
        None => format!("{SESSION_FILE_PREFIX}.session"),
    };
    std::env::temp_dir().join(file_name)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}
