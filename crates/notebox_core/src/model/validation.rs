//! Input validation failures shared by auth and note use-cases.

/// Missing or empty required field.
///
/// Recoverable: callers re-prompt with the rejected input preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email is required")]
    EmptyEmail,
    #[error("password is required")]
    EmptyPassword,
    #[error("title is required")]
    EmptyTitle,
}
