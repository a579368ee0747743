//! Credential primitives: validated login input and password hashing.
//!
//! # Invariants
//! - Raw passwords live only inside `Credentials` and are zeroized on drop.
//! - Password hashes are Argon2id PHC strings with a random per-hash salt.

pub mod credentials;
pub mod password;

pub use credentials::Credentials;
pub use password::{hash_password, verify_password, PasswordHashError};
