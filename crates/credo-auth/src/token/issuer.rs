use std::fmt;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::TRACING_TARGET_TOKEN as TRACING_TARGET;
use crate::security::SessionKeys;
use crate::token::SessionClaims;

/// Default JWT issuer identifier.
pub const DEFAULT_ISSUER: &str = "credo";
/// Default JWT audience identifier.
pub const DEFAULT_AUDIENCE: &str = "credo:session";
/// Default session lifetime (24 hours).
pub const DEFAULT_LIFETIME: SignedDuration = SignedDuration::from_hours(24);

/// Failure outcome of token issuance or verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token could not be signed.
    #[error("session token could not be issued")]
    IssuanceFailed,
    /// The token is well-formed and authentic but past its expiry.
    #[error("session token has expired")]
    Expired,
    /// The token is malformed, forged, or meant for another issuer or audience.
    #[error("session token is invalid")]
    Invalid,
}

/// A signed session token together with the claims it carries.
#[derive(Clone)]
pub struct SessionToken {
    token: String,
    claims: SessionClaims,
}

impl SessionToken {
    /// Returns the encoded token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Returns the claims encoded in the token.
    #[inline]
    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Consumes the token and returns the encoded string.
    #[inline]
    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Issues and verifies stateless session tokens.
///
/// Tokens are EdDSA-signed JWTs binding a user id. Verification needs no
/// store lookup: the signature, issuer, audience and expiry are enough.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: SessionKeys,
    issuer: String,
    audience: String,
    lifetime: SignedDuration,
}

impl TokenIssuer {
    /// Creates an issuer with the default issuer, audience and lifetime.
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys,
            issuer: DEFAULT_ISSUER.to_owned(),
            audience: DEFAULT_AUDIENCE.to_owned(),
            lifetime: DEFAULT_LIFETIME,
        }
    }

    /// Sets the `iss` claim written and expected by this issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the `aud` claim written and expected by this issuer.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Sets how long issued tokens stay valid.
    pub fn with_lifetime(mut self, lifetime: SignedDuration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Returns how long issued tokens stay valid.
    #[inline]
    pub fn lifetime(&self) -> SignedDuration {
        self.lifetime
    }

    /// Issues a token bound to `user_id`.
    ///
    /// Every call produces a distinct token: the `jti` claim is random.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::IssuanceFailed`] when signing fails. The
    /// underlying cause is logged and not returned.
    pub fn issue(&self, user_id: Uuid) -> Result<SessionToken, TokenError> {
        let (issued_at, expires_at) = self.session_window().map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                user_id = %user_id,
                "session expiry is out of range"
            );
            TokenError::IssuanceFailed
        })?;

        let claims = SessionClaims {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            token_id: Uuid::new_v4(),
            user_id,
            issued_at,
            expires_at,
        };

        let header = Header::new(Algorithm::EdDSA);
        let token = encode(&header, &claims, self.keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                user_id = %user_id,
                "failed to encode session token"
            );
            TokenError::IssuanceFailed
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            token_id = %claims.token_id,
            user_id = %user_id,
            expires_at = %claims.expires_at,
            "session token issued"
        );

        Ok(SessionToken { token, claims })
    }

    /// Verifies a token and returns its claims.
    ///
    /// Checks the signature, the issuer, the audience, the expiry (with the
    /// default 60 second leeway) and the presence of the registered claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "exp"]);

        let token_data = decode::<SessionClaims>(token, self.keys.decoding_key(), &validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    tracing::debug!(target: TRACING_TARGET, "session token expired");
                    TokenError::Expired
                }
                _ => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        error = %e,
                        "session token rejected"
                    );
                    TokenError::Invalid
                }
            })?;

        let claims = token_data.claims;
        tracing::debug!(
            target: TRACING_TARGET,
            token_id = %claims.token_id,
            user_id = %claims.user_id,
            remaining = %claims.remaining_lifetime(),
            "session token verified"
        );

        Ok(claims)
    }

    /// Returns the issue and expiry instants for a token issued now.
    ///
    /// Claims travel as whole seconds, so both instants are truncated to keep
    /// issued and verified claims identical.
    fn session_window(&self) -> Result<(Timestamp, Timestamp), jiff::Error> {
        let issued_at = Timestamp::from_second(Timestamp::now().as_second())?;
        let expires_at = issued_at.checked_add(self.lifetime)?;
        Ok((issued_at, expires_at))
    }
}
