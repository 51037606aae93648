//! User record model.
//!
//! The store only ever sees password hashes: plaintext passwords live on the
//! request types of the authentication core and are replaced before any write.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalizes an email address for storage and lookup.
///
/// Surrounding whitespace is removed and the address is lowercased, which
/// makes lookups case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A user record as held by the store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier assigned by the store.
    pub id: Uuid,
    /// Normalized login email address.
    pub email: String,
    /// PHC-formatted password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional human-readable name.
    pub display_name: Option<String>,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Timestamp when the user was created.
    pub created_at: Timestamp,
    /// Timestamp when the user was last written.
    pub updated_at: Timestamp,
    /// Timestamp of the first deactivation, if any.
    pub deactivated_at: Option<Timestamp>,
}

impl User {
    /// Returns whether the account may authenticate.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the account has been deactivated.
    #[inline]
    pub fn is_deactivated(&self) -> bool {
        !self.active
    }

    /// Returns whether the user has a non-empty display name.
    pub fn has_display_name(&self) -> bool {
        self.display_name
            .as_deref()
            .is_some_and(|display_name| !display_name.is_empty())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("active", &self.active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deactivated_at", &self.deactivated_at)
            .finish_non_exhaustive()
    }
}

/// Data for creating or replacing a user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    /// Login email address (normalized by the store).
    pub email: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Optional human-readable name.
    pub display_name: Option<String>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Timestamp::now();
        User {
            id: Uuid::now_v7(),
            email: "a@x.com".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            display_name: None,
            active: true,
            created_at: now,
            updated_at: now,
            deactivated_at: None,
        }
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn debug_output_omits_password_hash() {
        let user = sample_user();
        let debug = format!("{user:?}");
        assert!(!debug.contains("argon2id"));

        let record = UserRecord {
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            display_name: None,
        };
        assert!(!format!("{record:?}").contains("argon2id"));
    }

    #[test]
    fn serialization_skips_password_hash() -> anyhow::Result<()> {
        let json = serde_json::to_string(&sample_user())?;
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("\"active\":true"));
        Ok(())
    }

    #[test]
    fn display_name_presence() {
        let mut user = sample_user();
        assert!(!user.has_display_name());

        user.display_name = Some(String::new());
        assert!(!user.has_display_name());

        user.display_name = Some("Alice".to_owned());
        assert!(user.has_display_name());
    }
}
