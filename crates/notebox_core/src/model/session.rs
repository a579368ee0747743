//! Session key and session record.

use super::user::UserIdentity;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Opaque caller token mapped to a verified identity by the session store.
///
/// `Debug` output is redacted; the key is a bearer credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps a key presented by a caller. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Server-held association between a session key and an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: UserIdentity,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful register/login: the new key and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub session_key: SessionKey,
    pub identity: UserIdentity,
}
