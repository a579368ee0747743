//! Core domain logic for Notebox.
//! This crate is the single source of truth for account, session and
//! note-ownership invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{Credentials, PasswordHashError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteSummary, NEW_NOTE_ID};
pub use model::session::{Session, SessionGrant, SessionKey};
pub use model::user::{User, UserId, UserIdentity};
pub use model::validation::ValidationError;
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::session_repo::{InMemorySessionStore, SessionStore, SqliteSessionStore};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthError, AuthService};
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
