//! User account model and authenticated identity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stable account identifier assigned by storage.
pub type UserId = i64;

/// Persisted user account.
///
/// `password_hash` is an Argon2id PHC string; the raw password never reaches
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Normalized (trimmed, lowercase) email.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the identity value bound to sessions for this account.
    pub(crate) fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.email.clone())
    }
}

/// Verified identity of the caller.
///
/// Only the credential/session layer can construct this, so note operations
/// scoped by a `UserIdentity` can never be driven by a raw user id taken from
/// untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    user_id: UserId,
    email: String,
}

impl UserIdentity {
    pub(crate) fn new(user_id: UserId, email: String) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Email cached for display; not authoritative.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

/// Normalizes an email for storage and lookup: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM \n"), "alice@example.com");
    }

    #[test]
    fn normalize_email_of_blank_is_empty() {
        assert!(normalize_email("   ").is_empty());
    }
}
