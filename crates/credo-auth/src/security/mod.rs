//! Cryptographic building blocks.
//!
//! This module provides password hashing, password strength evaluation and
//! the key pair used to sign session tokens.

mod password_hasher;
mod password_strength;
pub(crate) mod session_keys;

pub use password_hasher::{
    CredentialError, DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM, PasswordHasher,
};
pub use password_strength::{PasswordFeedback, PasswordStrength, PasswordStrengthResult};
pub use session_keys::SessionKeys;
