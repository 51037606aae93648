//! Persisted data structures.
//!
//! - [`User`] - a user record as held by the store
//! - [`UserRecord`] - the write payload for creating or replacing a user

mod user;

pub use user::{User, UserRecord, normalize_email};
