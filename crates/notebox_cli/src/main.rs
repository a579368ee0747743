//! Notebox command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, bootstrap logging and storage.
//! - Route one command to the core and print a one-line outcome.

mod commands;
mod config;

use clap::Parser;
use commands::{user_message, App};
use config::{Cli, Settings};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli);

    if let Some(log_dir) = settings.log_dir.as_deref() {
        if let Err(err) = notebox_core::init_logging(&settings.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(&settings, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("{}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, command: config::Command) -> anyhow::Result<()> {
    let conn = notebox_core::db::open_db(&settings.db_path)?;
    let app = App::new(&conn, settings.session_file.clone())?;
    let mut stdout = std::io::stdout().lock();
    app.execute(command, &mut stdout)
}
