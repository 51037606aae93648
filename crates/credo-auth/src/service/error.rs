//! Classified failures of the account lifecycle operations.

use std::borrow::Cow;

use strum::{Display, EnumIter, IntoStaticStr};
use validator::ValidationErrors;

/// Result type alias for account lifecycle operations.
pub type AuthResult<T, E = AuthError> = std::result::Result<T, E>;

/// Why an account lifecycle operation failed.
///
/// The set is closed: callers branch on the reason instead of parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthErrorReason {
    /// No user is registered with the given email.
    NoSuchUser,
    /// The user exists but has been deactivated.
    AccountDeactivated,
    /// The password does not match.
    BadCredentials,
    /// Credentials were accepted but no token could be signed.
    TokenIssuanceFailed,
    /// A user with the given email is already registered.
    AlreadyExists,
    /// The password could not be hashed.
    HashingFailed,
    /// The store rejected or failed a lookup or write.
    PersistenceFailed,
    /// The store failed to deactivate the user.
    DeactivationFailed,
    /// The registration candidate failed validation.
    InvalidInput,
}

impl AuthErrorReason {
    /// Returns the reason as a snake_case string for logs and metrics.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns whether the failure comes from the system rather than from
    /// the caller's input or account state.
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::TokenIssuanceFailed
                | Self::HashingFailed
                | Self::PersistenceFailed
                | Self::DeactivationFailed
        )
    }

    /// Returns the default human-readable message.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::NoSuchUser => "authentication failed: no account is registered with this email",
            Self::AccountDeactivated => "authentication failed: the account has been deactivated",
            Self::BadCredentials => "authentication failed: the password is incorrect",
            Self::TokenIssuanceFailed => "a session token could not be issued, please try again",
            Self::AlreadyExists => {
                "an account with this email already exists, sign in or use another email"
            }
            Self::HashingFailed => "the password could not be processed, please try again",
            Self::PersistenceFailed => "the account could not be saved, please try again",
            Self::DeactivationFailed => "the account could not be deactivated",
            Self::InvalidInput => "the submitted account details are invalid",
        }
    }

    /// Creates an error with the default message.
    #[inline]
    pub fn into_error(self) -> AuthError {
        AuthError::new(self)
    }

    /// Creates an error with context appended to the default message.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'static, str>>) -> AuthError {
        AuthError::new(self).with_context(context)
    }
}

/// Failure of an account lifecycle operation.
///
/// Carries the reason, a human-readable message and optional context. Raw
/// errors from the hasher, the token signer or the store never end up here;
/// only validation errors are handed through, unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{reason}: {message}")]
#[must_use = "errors do nothing unless handled"]
pub struct AuthError {
    reason: AuthErrorReason,
    message: Cow<'static, str>,
    context: Option<Cow<'static, str>>,
    #[source]
    validation: Option<ValidationErrors>,
}

impl AuthError {
    /// Creates a new [`AuthError`] with the reason's default message.
    pub fn new(reason: AuthErrorReason) -> Self {
        Self {
            reason,
            message: Cow::Borrowed(reason.default_message()),
            context: None,
            validation: None,
        }
    }

    /// Creates an [`AuthErrorReason::InvalidInput`] error wrapping the
    /// validation errors as-is.
    pub fn invalid_input(errors: ValidationErrors) -> Self {
        Self {
            validation: Some(errors),
            ..Self::new(AuthErrorReason::InvalidInput)
        }
    }

    /// Replaces the message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    /// Attaches context about what went wrong.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'static, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Returns the failure reason.
    #[inline]
    pub fn reason(&self) -> AuthErrorReason {
        self.reason
    }

    /// Returns the message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the context if present.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the validation errors of an invalid registration candidate.
    #[inline]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.validation.as_ref()
    }
}

impl From<AuthErrorReason> for AuthError {
    #[inline]
    fn from(reason: AuthErrorReason) -> Self {
        Self::new(reason)
    }
}
