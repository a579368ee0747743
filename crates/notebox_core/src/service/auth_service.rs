//! Credential and session use-case service.
//!
//! # Responsibility
//! - Register accounts, verify logins, issue and destroy sessions.
//! - Provide `require_session`, the single gate in front of every protected
//!   operation.
//!
//! # Invariants
//! - Unknown email and wrong password fail with the same
//!   `AuthError::InvalidCredentials`.
//! - Sessions are only created after successful registration or login.
//! - Raw passwords and full emails are never logged.

use crate::auth::password::{hash_password, verify_dummy, verify_password, PasswordHashError};
use crate::auth::Credentials;
use crate::logging::redact_email;
use crate::model::session::{Session, SessionGrant, SessionKey};
use crate::model::user::UserIdentity;
use crate::model::validation::ValidationError;
use crate::repo::session_repo::SessionStore;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::{error, info, warn};

/// Service error for credential/session use-cases.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing email or password on registration.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Registration conflict; the caller should direct the user to log in.
    #[error("email already registered")]
    DuplicateAccount,
    /// Login failure; never says which part was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// No valid session bound to the caller.
    #[error("authentication required")]
    AuthRequired,
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail => Self::DuplicateAccount,
            other => Self::Repo(other),
        }
    }
}

/// Credential & session facade over account and session storage.
pub struct AuthService<U: UserRepository, S: SessionStore> {
    users: U,
    sessions: S,
}

impl<U: UserRepository, S: SessionStore> AuthService<U, S> {
    pub fn new(users: U, sessions: S) -> Self {
        Self { users, sessions }
    }

    /// Creates an account and logs it in.
    ///
    /// # Errors
    /// - `Validation` when email or password is empty.
    /// - `DuplicateAccount` when the normalized email is taken, including a
    ///   concurrent registration winning the insert.
    pub fn register(&self, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        let credentials = Credentials::try_from_parts(email, password)?;

        if self.users.find_by_email(credentials.email())?.is_some() {
            info!("event=auth_register module=auth status=rejected reason=duplicate");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = hash_password(credentials.password())?;
        let user_id =
            self.users
                .insert_user(credentials.email(), password_hash.as_str(), Utc::now())?;
        info!(
            "event=auth_register module=auth status=ok user_id={user_id} email={}",
            redact_email(credentials.email())
        );

        self.establish_session(UserIdentity::new(user_id, credentials.email().to_string()))
    }

    /// Verifies credentials and starts a session.
    ///
    /// Blank input, unknown email and wrong password all yield
    /// `InvalidCredentials`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        let Ok(credentials) = Credentials::try_from_parts(email, password) else {
            warn!("event=auth_login module=auth status=rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(user) = self.users.find_by_email(credentials.email())? else {
            verify_dummy(credentials.password());
            warn!("event=auth_login module=auth status=rejected");
            return Err(AuthError::InvalidCredentials);
        };

        match verify_password(credentials.password(), user.password_hash.as_str()) {
            Ok(true) => {}
            Ok(false) => {
                warn!("event=auth_login module=auth status=rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                error!(
                    "event=auth_login module=auth status=error user_id={} error={err}",
                    user.id
                );
                return Err(AuthError::InvalidCredentials);
            }
        }

        info!("event=auth_login module=auth status=ok user_id={}", user.id);
        self.establish_session(user.identity())
    }

    /// Destroys the session bound to `key`. Absent sessions are fine.
    pub fn terminate(&self, key: &SessionKey) -> Result<(), AuthError> {
        self.sessions.clear(key)?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    /// Resolves the caller's identity or refuses with `AuthRequired`.
    ///
    /// A session whose account no longer exists is cleared and refused.
    pub fn require_session(&self, key: Option<&SessionKey>) -> Result<UserIdentity, AuthError> {
        let Some(key) = key else {
            return Err(AuthError::AuthRequired);
        };

        let Some(session) = self.sessions.get(key)? else {
            return Err(AuthError::AuthRequired);
        };

        if self.users.find_by_id(session.identity.user_id())?.is_none() {
            warn!(
                "event=auth_session module=auth status=revoked reason=account_missing user_id={}",
                session.identity.user_id()
            );
            self.sessions.clear(key)?;
            return Err(AuthError::AuthRequired);
        }

        Ok(session.identity)
    }

    fn establish_session(&self, identity: UserIdentity) -> Result<SessionGrant, AuthError> {
        let session_key = SessionKey::generate();
        let session = Session {
            identity: identity.clone(),
            created_at: Utc::now(),
        };
        self.sessions.set(&session_key, &session)?;

        Ok(SessionGrant {
            session_key,
            identity,
        })
    }
}
