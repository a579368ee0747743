//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped note persistence APIs.
//! - Maintain `created_at`/`updated_at` touch semantics inside single SQL
//!   statements.
//!
//! # Invariants
//! - Every statement filters on `user_id`; a foreign note behaves exactly like
//!   a missing one (`RepoError::NotFound`).
//! - A write's touch time is `max(now, latest owner updated_at + 1)`, so
//!   `updated_at` strictly advances and owner list order follows touch order.
//! - List order is `updated_at DESC, id DESC`.

use crate::model::note::{Note, NoteId, NoteSummary};
use crate::model::timestamp::to_epoch_ms;
use crate::model::user::UserId;
use crate::repo::{ensure_table_ready, parse_timestamp, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

/// Repository interface for owner-scoped note operations.
pub trait NoteRepository {
    /// Inserts one note for `owner` and returns its new id.
    fn insert_note(
        &self,
        owner: UserId,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<NoteId>;
    /// Gets one note by id, only if `owner` owns it.
    fn find_note(&self, owner: UserId, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists all of `owner`'s notes, most recently touched first.
    fn list_notes(&self, owner: UserId) -> RepoResult<Vec<NoteSummary>>;
    /// Overwrites title/content and bumps `updated_at`.
    fn update_note(
        &self,
        owner: UserId,
        note_id: NoteId,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;
    /// Hard-deletes one note.
    fn delete_note(&self, owner: UserId, note_id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed notes repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "notes",
            &[
                "id",
                "user_id",
                "title",
                "content",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(
        &self,
        owner: UserId,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<NoteId> {
        self.conn.execute(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at)
             SELECT ?1, ?2, ?3, touched, touched
             FROM (
                SELECT MAX(?4, COALESCE(MAX(updated_at) + 1, ?4)) AS touched
                FROM notes
                WHERE user_id = ?1
             );",
            params![owner, title, content, to_epoch_ms(now)],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn find_note(&self, owner: UserId, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                user_id,
                title,
                content,
                created_at,
                updated_at
             FROM notes
             WHERE id = ?1
               AND user_id = ?2;",
        )?;

        let mut rows = stmt.query(params![note_id, owner])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_notes(&self, owner: UserId) -> RepoResult<Vec<NoteSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                title,
                updated_at
             FROM notes
             WHERE user_id = ?1
             ORDER BY updated_at DESC, id DESC;",
        )?;

        let mut rows = stmt.query([owner])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(NoteSummary::new(
                row.get("id")?,
                row.get("title")?,
                parse_timestamp(row.get("updated_at")?, "notes.updated_at")?,
            ));
        }

        Ok(notes)
    }

    fn update_note(
        &self,
        owner: UserId,
        note_id: NoteId,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?3,
                content = ?4,
                updated_at = MAX(
                    ?5,
                    (SELECT COALESCE(MAX(peer.updated_at) + 1, ?5) FROM notes peer WHERE peer.user_id = ?2)
                )
             WHERE id = ?1
               AND user_id = ?2;",
            params![note_id, owner, title, content, to_epoch_ms(now)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        Ok(())
    }

    fn delete_note(&self, owner: UserId, note_id: NoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes
             WHERE id = ?1
               AND user_id = ?2;",
            params![note_id, owner],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let note = Note {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
        created_at: parse_timestamp(row.get("created_at")?, "notes.created_at")?,
        updated_at: parse_timestamp(row.get("updated_at")?, "notes.updated_at")?,
    };

    if note.updated_at < note.created_at {
        return Err(RepoError::InvalidData(format!(
            "note {} has updated_at earlier than created_at",
            note.id
        )));
    }
    Ok(note)
}
