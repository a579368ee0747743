//! Note model, list projection and editable draft.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `NEW_NOTE_ID` is a sentinel and never identifies a stored note.

use super::timestamp::format_display_timestamp;
use super::user::UserId;
use super::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stable note identifier assigned by storage.
pub type NoteId = i64;

/// Sentinel id meaning "new note" in view/save flows.
pub const NEW_NOTE_ID: NoteId = 0;

/// Stored note, only ever returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List entry: id, title and a formatted "last touched" timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub display_timestamp: String,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl NoteSummary {
    pub fn new(id: NoteId, title: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            display_timestamp: format_display_timestamp(&updated_at),
            updated_at,
        }
    }
}

/// Title/content pair as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Returns the trimmed draft, or `EmptyTitle` when no title remains.
    ///
    /// `self` is left untouched so callers can re-present rejected input.
    pub fn normalized(&self) -> Result<NoteDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(NoteDraft {
            title: title.to_string(),
            content: self.content.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteDraft, NoteSummary};
    use crate::model::validation::ValidationError;
    use chrono::{TimeZone, Utc};

    #[test]
    fn normalized_trims_title_and_content() {
        let draft = NoteDraft::new("  Shopping ", "\nmilk, eggs  ");
        let normalized = draft.normalized().expect("title present");
        assert_eq!(normalized.title, "Shopping");
        assert_eq!(normalized.content, "milk, eggs");
    }

    #[test]
    fn normalized_allows_empty_content() {
        let normalized = NoteDraft::new("T", "").normalized().expect("title present");
        assert_eq!(normalized.content, "");
    }

    #[test]
    fn normalized_rejects_blank_title_and_keeps_input() {
        let draft = NoteDraft::new("   ", "unsaved body");
        assert_eq!(draft.normalized(), Err(ValidationError::EmptyTitle));
        assert_eq!(draft.content, "unsaved body");
    }

    #[test]
    fn summary_formats_display_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();
        let summary = NoteSummary::new(7, "Year end".to_string(), at);
        assert_eq!(summary.display_timestamp, "31 Dec 2025 11:59 PM");
    }
}
