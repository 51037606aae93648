//! Request payloads accepted by the account lifecycle operations.
//!
//! Both payloads carry a plaintext password. It is hashed before anything is
//! written and never appears in `Debug` output.

use std::fmt;

use credo_store::UserRecord;
use serde::Deserialize;
use validator::Validate;

/// Candidate user for registration.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Login email address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Optional human-readable name.
    #[serde(default)]
    #[validate(length(min = 2, max = 64))]
    pub display_name: Option<String>,
}

impl NewUser {
    /// Creates a candidate without a display name.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Builds the store payload, replacing the plaintext with `password_hash`.
    pub(crate) fn into_record(self, password_hash: String) -> UserRecord {
        UserRecord {
            email: self.email,
            password_hash,
            display_name: self.display_name,
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Replacement values for an existing user.
///
/// The password is always rehashed and stored, so it must hold the user's
/// current (or new) plaintext password even when only other fields change.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// Login email address.
    pub email: String,
    /// Plaintext password, hashed and stored unconditionally.
    pub password: String,
    /// Optional human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserUpdate {
    /// Creates an update without a display name.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Builds the store payload, replacing the plaintext with `password_hash`.
    pub(crate) fn into_record(self, password_hash: String) -> UserRecord {
        UserRecord {
            email: self.email,
            password_hash,
            display_name: self.display_name,
        }
    }
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}
