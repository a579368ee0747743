//! Keyed session store contracts and implementations.
//!
//! # Responsibility
//! - Map opaque session keys to verified identities via get/set/clear.
//! - Keep session persistence independent from note persistence.
//!
//! # Invariants
//! - `clear` on an absent key is not an error.
//! - `set` on an existing key replaces the bound identity.

use crate::model::session::{Session, SessionKey};
use crate::model::timestamp::to_epoch_ms;
use crate::model::user::UserIdentity;
use crate::repo::{ensure_table_ready, parse_timestamp, RepoResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Keyed store for server-held sessions.
pub trait SessionStore {
    fn get(&self, key: &SessionKey) -> RepoResult<Option<Session>>;
    fn set(&self, key: &SessionKey, session: &Session) -> RepoResult<()>;
    fn clear(&self, key: &SessionKey) -> RepoResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn get(&self, key: &SessionKey) -> RepoResult<Option<Session>> {
        (**self).get(key)
    }

    fn set(&self, key: &SessionKey, session: &Session) -> RepoResult<()> {
        (**self).set(key, session)
    }

    fn clear(&self, key: &SessionKey) -> RepoResult<()> {
        (**self).clear(key)
    }
}

/// SQLite-backed session store (`sessions` table).
pub struct SqliteSessionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "sessions", &["key", "user_id", "email", "created_at"])?;
        Ok(Self { conn })
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn get(&self, key: &SessionKey) -> RepoResult<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                user_id,
                email,
                created_at
             FROM sessions
             WHERE key = ?1;",
        )?;

        let mut rows = stmt.query([key.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(Session {
                identity: UserIdentity::new(row.get("user_id")?, row.get("email")?),
                created_at: parse_timestamp(row.get("created_at")?, "sessions.created_at")?,
            })),
            None => Ok(None),
        }
    }

    fn set(&self, key: &SessionKey, session: &Session) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (key, user_id, email, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                user_id = excluded.user_id,
                email = excluded.email,
                created_at = excluded.created_at;",
            params![
                key.as_str(),
                session.identity.user_id(),
                session.identity.email(),
                to_epoch_ms(session.created_at),
            ],
        )?;
        Ok(())
    }

    fn clear(&self, key: &SessionKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }
}

/// Process-local session store.
///
/// Sessions vanish with the process; suitable for embedding behind a
/// long-running transport or for tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &SessionKey) -> RepoResult<Option<Session>> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(sessions.get(key).cloned())
    }

    fn set(&self, key: &SessionKey, session: &Session) -> RepoResult<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(key.clone(), session.clone());
        Ok(())
    }

    fn clear(&self, key: &SessionKey) -> RepoResult<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(key);
        Ok(())
    }
}
