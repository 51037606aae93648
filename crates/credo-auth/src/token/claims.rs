use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by a session token.
///
/// Only RFC 7519 registered claims are used. Timestamps are encoded as
/// integer seconds since the Unix epoch, as the RFC requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    pub audience: String,

    /// JWT ID, random per token.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Subject, the identifier of the authenticated user.
    #[serde(rename = "sub")]
    pub user_id: Uuid,

    /// Issued at.
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time.
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl SessionClaims {
    /// Checks if the token has expired based on the current time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the remaining lifetime of this token, or zero if expired.
    #[must_use]
    pub fn remaining_lifetime(&self) -> SignedDuration {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        if remaining.is_positive() {
            remaining
        } else {
            SignedDuration::ZERO
        }
    }
}
