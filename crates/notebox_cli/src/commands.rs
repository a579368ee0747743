//! Command dispatch: each command maps to exactly one core call.
//!
//! # Invariants
//! - Every protected command goes through `require_session` first.
//! - The session key only ever lives in the session file, never in output.

use crate::config::Command;
use anyhow::Context;
use notebox_core::{
    AuthError, AuthService, NoteService, NoteServiceError, SessionKey, SqliteNoteRepository,
    SqliteSessionStore, SqliteUserRepository, UserIdentity,
};
use rusqlite::Connection;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Per-invocation service wiring over one connection.
pub struct App<'conn> {
    auth: AuthService<SqliteUserRepository<'conn>, SqliteSessionStore<'conn>>,
    notes: NoteService<SqliteNoteRepository<'conn>>,
    session_file: PathBuf,
}

impl<'conn> App<'conn> {
    pub fn new(conn: &'conn Connection, session_file: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let auth = AuthService::new(
            SqliteUserRepository::try_new(conn)?,
            SqliteSessionStore::try_new(conn)?,
        );
        let notes = NoteService::new(SqliteNoteRepository::try_new(conn)?);
        Ok(Self {
            auth,
            notes,
            session_file: session_file.into(),
        })
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Register { email, password } => {
                let grant = self.auth.register(&email, &password)?;
                self.store_session_key(&grant.session_key)?;
                writeln!(out, "Registered and logged in as {}.", grant.identity.email())?;
            }
            Command::Login { email, password } => {
                let grant = self.auth.authenticate(&email, &password)?;
                self.store_session_key(&grant.session_key)?;
                writeln!(out, "Logged in successfully.")?;
            }
            Command::Logout => {
                if let Some(key) = self.load_session_key()? {
                    self.auth.terminate(&key)?;
                }
                remove_if_exists(&self.session_file)?;
                writeln!(out, "You have been logged out.")?;
            }
            Command::Whoami { json } => {
                let user = self.current_user()?;
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&user)?)?;
                } else {
                    writeln!(out, "{} (user {})", user.email(), user.user_id())?;
                }
            }
            Command::List { json } => {
                let user = self.current_user()?;
                let summaries = self.notes.list_notes(&user)?;
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
                } else if summaries.is_empty() {
                    writeln!(out, "No notes yet.")?;
                } else {
                    for summary in summaries {
                        writeln!(
                            out,
                            "{:>6}  {}  {}",
                            summary.id, summary.display_timestamp, summary.title
                        )?;
                    }
                }
            }
            Command::Show { id, json } => {
                let user = self.current_user()?;
                let note = self.notes.editor_note(&user, id)?;
                match (note, json) {
                    (note, true) => writeln!(out, "{}", serde_json::to_string_pretty(&note)?)?,
                    (None, false) => writeln!(out, "New note. Save with id 0 to create it.")?,
                    (Some(note), false) => {
                        writeln!(out, "# {}", note.title)?;
                        writeln!(out)?;
                        writeln!(out, "{}", note.content)?;
                    }
                }
            }
            Command::Save { id, title, content } => {
                let user = self.current_user()?;
                match self.notes.save_note(&user, id, &title, &content) {
                    Ok(saved) if saved == id => writeln!(out, "Note updated.")?,
                    Ok(saved) => writeln!(out, "Note created (id {saved}).")?,
                    Err(err @ NoteServiceError::Validation(_)) => {
                        writeln!(out, "Unsaved input:")?;
                        writeln!(out, "  title: {title}")?;
                        writeln!(out, "  content: {content}")?;
                        return Err(err.into());
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Command::Delete { id } => {
                let user = self.current_user()?;
                self.notes.delete_note(&user, id)?;
                writeln!(out, "Note deleted.")?;
            }
        }
        Ok(())
    }

    fn current_user(&self) -> anyhow::Result<UserIdentity> {
        let key = self.load_session_key()?;
        Ok(self.auth.require_session(key.as_ref())?)
    }

    fn load_session_key(&self) -> anyhow::Result<Option<SessionKey>> {
        match std::fs::read_to_string(&self.session_file) {
            Ok(raw) => Ok(SessionKey::parse(&raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| {
                format!("failed to read session file `{}`", self.session_file.display())
            }),
        }
    }

    fn store_session_key(&self, key: &SessionKey) -> anyhow::Result<()> {
        if let Some(parent) = self.session_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.session_file, key.as_str()).with_context(|| {
            format!("failed to write session file `{}`", self.session_file.display())
        })
    }
}

/// Writes `contents` to a file only the current OS user can read.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        // `mode` only applies on creation; tighten files left by older runs.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(contents.as_bytes())
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(contents.as_bytes())
    }
}

/// Maps an error to the one-line message shown to the user.
pub fn user_message(err: &anyhow::Error) -> String {
    if let Some(auth) = err.downcast_ref::<AuthError>() {
        return match auth {
            AuthError::Validation(inner) => format!("{}.", capitalize(&inner.to_string())),
            AuthError::DuplicateAccount => "Email already registered. Try logging in.".to_string(),
            AuthError::InvalidCredentials => "Invalid email or password.".to_string(),
            AuthError::AuthRequired => "Please log in to continue.".to_string(),
            other => format!("Error: {other}"),
        };
    }
    if let Some(notes) = err.downcast_ref::<NoteServiceError>() {
        return match notes {
            NoteServiceError::Validation(inner) => format!("{}.", capitalize(&inner.to_string())),
            NoteServiceError::NotFound(_) => {
                "Note not found or you don't have permission.".to_string()
            }
            other => format!("Error: {other}"),
        };
    }
    format!("Error: {err:#}")
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn remove_if_exists(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to remove `{}`", path.display())),
    }
}
