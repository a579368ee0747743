//! Note use-case service.
//!
//! # Responsibility
//! - Provide owner-scoped list/get/create/update/delete APIs.
//! - Map the view/save routes (`0` = new note) onto those APIs.
//!
//! # Invariants
//! - Every API takes a verified `UserIdentity`; none accept a raw user id.
//! - Missing and foreign notes are both `NoteServiceError::NotFound`.
//! - Title is validated before any write; a rejected update leaves the stored
//!   note untouched.
//! - No optimistic concurrency: concurrent updates are last-writer-wins.

use crate::model::note::{Note, NoteDraft, NoteId, NoteSummary, NEW_NOTE_ID};
use crate::model::user::UserIdentity;
use crate::model::validation::ValidationError;
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::info;

/// Service error for note use-cases.
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// Title missing; callers re-present the unsaved input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Note does not exist for this owner.
    #[error("note not found: {0}")]
    NotFound(NoteId),
    /// Persistence-layer failure.
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(note_id) => Self::NotFound(note_id),
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the owner's notes, most recently touched first.
    pub fn list_notes(&self, owner: &UserIdentity) -> Result<Vec<NoteSummary>, NoteServiceError> {
        Ok(self.repo.list_notes(owner.user_id())?)
    }

    /// Gets one of the owner's notes.
    ///
    /// `NEW_NOTE_ID` is never looked up and reports `NotFound`.
    pub fn get_note(&self, owner: &UserIdentity, note_id: NoteId) -> Result<Note, NoteServiceError> {
        if note_id == NEW_NOTE_ID {
            return Err(NoteServiceError::NotFound(note_id));
        }

        self.repo
            .find_note(owner.user_id(), note_id)?
            .ok_or(NoteServiceError::NotFound(note_id))
    }

    /// Resolves the note shown in the editor: `None` for a new note.
    pub fn editor_note(
        &self,
        owner: &UserIdentity,
        note_id: NoteId,
    ) -> Result<Option<Note>, NoteServiceError> {
        if note_id == NEW_NOTE_ID {
            return Ok(None);
        }
        self.get_note(owner, note_id).map(Some)
    }

    /// Creates a note owned by `owner`; `created_at == updated_at`.
    pub fn create_note(
        &self,
        owner: &UserIdentity,
        title: &str,
        content: &str,
    ) -> Result<NoteId, NoteServiceError> {
        let draft = NoteDraft::new(title, content).normalized()?;
        let note_id = self.repo.insert_note(
            owner.user_id(),
            draft.title.as_str(),
            draft.content.as_str(),
            Utc::now(),
        )?;
        info!(
            "event=note_create module=notes status=ok user_id={} note_id={note_id}",
            owner.user_id()
        );
        Ok(note_id)
    }

    /// Overwrites title/content of one of the owner's notes.
    ///
    /// Ownership is resolved before validation, so a foreign note reports
    /// `NotFound` even when the title is also empty.
    pub fn update_note(
        &self,
        owner: &UserIdentity,
        note_id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<(), NoteServiceError> {
        self.get_note(owner, note_id)?;
        let draft = NoteDraft::new(title, content).normalized()?;
        self.repo.update_note(
            owner.user_id(),
            note_id,
            draft.title.as_str(),
            draft.content.as_str(),
            Utc::now(),
        )?;
        info!(
            "event=note_update module=notes status=ok user_id={} note_id={note_id}",
            owner.user_id()
        );
        Ok(())
    }

    /// Save route: creates when `note_id == NEW_NOTE_ID`, updates otherwise.
    pub fn save_note(
        &self,
        owner: &UserIdentity,
        note_id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<NoteId, NoteServiceError> {
        if note_id == NEW_NOTE_ID {
            return self.create_note(owner, title, content);
        }
        self.update_note(owner, note_id, title, content)?;
        Ok(note_id)
    }

    /// Permanently removes one of the owner's notes.
    pub fn delete_note(&self, owner: &UserIdentity, note_id: NoteId) -> Result<(), NoteServiceError> {
        if note_id == NEW_NOTE_ID {
            return Err(NoteServiceError::NotFound(note_id));
        }
        self.repo.delete_note(owner.user_id(), note_id)?;
        info!(
            "event=note_delete module=notes status=ok user_id={} note_id={note_id}",
            owner.user_id()
        );
        Ok(())
    }
}
