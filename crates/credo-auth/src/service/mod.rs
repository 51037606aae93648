//! Account lifecycle: login, registration, update and deactivation.
//!
//! [`AuthService`] ties the store, the validator, the password hasher and the
//! token issuer together. It holds no mutable state of its own, so one
//! instance (or any number of clones) can serve concurrent requests.

mod error;
mod request;

use credo_store::{StoreError, User, UserRepository};
use uuid::Uuid;

pub use self::error::{AuthError, AuthErrorReason, AuthResult};
pub use self::request::{NewUser, UserUpdate};
use crate::TRACING_TARGET_SERVICE as TRACING_TARGET;
use crate::security::{CredentialError, PasswordHasher};
use crate::token::{SessionClaims, SessionToken, TokenError, TokenIssuer};
use crate::validation::{StructuralValidator, UserValidator};

/// Account lifecycle manager.
///
/// Every dependency is injected at construction and used read-only.
#[derive(Debug, Clone)]
pub struct AuthService<S, V = StructuralValidator> {
    store: S,
    validator: V,
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

impl<S> AuthService<S> {
    /// Creates a service that validates registrations with the default
    /// [`StructuralValidator`].
    pub fn new(store: S, password_hasher: PasswordHasher, token_issuer: TokenIssuer) -> Self {
        Self {
            store,
            validator: StructuralValidator::default(),
            password_hasher,
            token_issuer,
        }
    }
}

impl<S, V> AuthService<S, V> {
    /// Replaces the registration validator.
    pub fn with_validator<W>(self, validator: W) -> AuthService<S, W> {
        AuthService {
            store: self.store,
            validator,
            password_hasher: self.password_hasher,
            token_issuer: self.token_issuer,
        }
    }

    /// Returns the user store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the token issuer.
    #[inline]
    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.token_issuer
    }

    /// Verifies a session token issued by [`login`](Self::login).
    #[inline]
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.token_issuer.verify(token)
    }
}

impl<S, V> AuthService<S, V>
where
    S: UserRepository + Sync,
    V: UserValidator + Sync,
{
    /// Authenticates a user and issues a session token.
    ///
    /// Checks run in a fixed order: the user must exist, be active and
    /// present the right password. The first failing check decides the
    /// reason, so the reason tells whether an email is registered.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<SessionToken> {
        let user = match self.store.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!(target: TRACING_TARGET, "login rejected: unknown email");
                return Err(AuthErrorReason::NoSuchUser.into_error());
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "login failed: user lookup failed"
                );
                return Err(AuthErrorReason::PersistenceFailed.with_context("user lookup failed"));
            }
        };

        if !user.is_active() {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user.id,
                "login rejected: account deactivated"
            );
            return Err(AuthErrorReason::AccountDeactivated.into_error());
        }

        match self
            .password_hasher
            .verify_password(password, &user.password_hash)
        {
            Ok(()) => {}
            Err(CredentialError::Mismatch) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    user_id = %user.id,
                    "login rejected: password mismatch"
                );
                return Err(AuthErrorReason::BadCredentials.into_error());
            }
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    user_id = %user.id,
                    error = %e,
                    "login rejected: stored password hash is unusable"
                );
                return Err(AuthErrorReason::BadCredentials.into_error());
            }
        }

        let token = self.token_issuer.issue(user.id).map_err(|_| {
            tracing::error!(
                target: TRACING_TARGET,
                user_id = %user.id,
                "login failed: session token could not be issued"
            );
            AuthErrorReason::TokenIssuanceFailed.into_error()
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            token_id = %token.claims().token_id,
            "user logged in"
        );

        Ok(token)
    }

    /// Registers a new user.
    ///
    /// The candidate is validated before the store is consulted. Validation
    /// errors come back unchanged inside [`AuthErrorReason::InvalidInput`].
    pub async fn register(&self, new_user: NewUser) -> AuthResult<User> {
        self.validator
            .validate_user(&new_user)
            .map_err(AuthError::invalid_input)?;

        match self.store.find_user_by_email(&new_user.email).await {
            Ok(None) => {}
            Ok(Some(existing)) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    user_id = %existing.id,
                    "registration rejected: email already registered"
                );
                return Err(AuthErrorReason::AlreadyExists.into_error());
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "registration failed: user lookup failed"
                );
                return Err(AuthErrorReason::PersistenceFailed.with_context("user lookup failed"));
            }
        }

        let password_hash = self.hash_password(&new_user.password)?;
        let user = self
            .store
            .create_user(new_user.into_record(password_hash))
            .await
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "registration failed: user could not be created"
                );
                AuthErrorReason::PersistenceFailed.with_context(store_context(&e))
            })?;

        tracing::info!(target: TRACING_TARGET, user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Replaces the email, password and display name of a user.
    ///
    /// The password is rehashed and stored on every call, even when it did
    /// not change. The update is not validated.
    pub async fn update(&self, user_id: Uuid, update: UserUpdate) -> AuthResult<User> {
        let password_hash = self.hash_password(&update.password)?;
        let user = self
            .store
            .update_user(user_id, update.into_record(password_hash))
            .await
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    user_id = %user_id,
                    error = %e,
                    "update failed: user could not be saved"
                );
                AuthErrorReason::PersistenceFailed.with_context(store_context(&e))
            })?;

        tracing::info!(target: TRACING_TARGET, user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Deactivates a user so it can no longer log in.
    ///
    /// Tokens issued earlier stay valid until they expire. Deactivating an
    /// inactive user succeeds.
    pub async fn deactivate_account(&self, user_id: Uuid) -> AuthResult<()> {
        let user = self.store.deactivate_user(user_id).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                user_id = %user_id,
                error = %e,
                "deactivation failed"
            );
            AuthErrorReason::DeactivationFailed.with_context(store_context(&e))
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            deactivated_at = ?user.deactivated_at,
            "user deactivated"
        );
        Ok(())
    }

    fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.password_hasher.hash_password(password).map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, "password hashing failed");
            AuthErrorReason::HashingFailed.into_error()
        })
    }
}

fn store_context(error: &StoreError) -> &'static str {
    match error {
        StoreError::NotFound => "user does not exist",
        StoreError::Conflict => "email is registered to another user",
        StoreError::Unavailable(_) => "user store is unavailable",
    }
}
