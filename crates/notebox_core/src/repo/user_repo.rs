//! User account repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Emails are stored exactly as given; callers pass normalized values.
//! - A `UNIQUE` violation on insert surfaces as `RepoError::DuplicateEmail`.

use crate::model::timestamp::to_epoch_ms;
use crate::model::user::{User, UserId};
use crate::repo::{ensure_table_ready, parse_timestamp, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    password_hash,
    created_at
FROM users";

/// Repository interface for account persistence.
pub trait UserRepository {
    /// Inserts one account and returns its new id.
    fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<UserId>;
    /// Exact-match lookup by normalized email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Used by the session gate to confirm the bound account still exists.
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "users", &["id", "email", "password_hash", "created_at"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<UserId> {
        let inserted = self.conn.execute(
            "INSERT INTO users (email, password_hash, created_at)
             VALUES (?1, ?2, ?3);",
            params![email, password_hash, to_epoch_ms(created_at)],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: parse_timestamp(row.get("created_at")?, "users.created_at")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
