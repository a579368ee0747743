//! Domain model for accounts, sessions and notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own input normalization rules (email casing, title trimming).
//!
//! # Invariants
//! - Every note has exactly one owner, fixed at creation.
//! - `UserIdentity` values are only minted by the credential/session layer.
//! - Timestamps are UTC; `updated_at >= created_at`.

pub mod note;
pub mod session;
pub mod timestamp;
pub mod user;
pub mod validation;
