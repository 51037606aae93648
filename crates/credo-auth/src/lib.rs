#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for password hashing and verification.
pub const TRACING_TARGET_HASHER: &str = "credo_auth::hasher";

/// Tracing target for session key loading.
pub const TRACING_TARGET_KEYS: &str = "credo_auth::keys";

/// Tracing target for session token issuance and verification.
pub const TRACING_TARGET_TOKEN: &str = "credo_auth::token";

/// Tracing target for registration input validation.
pub const TRACING_TARGET_VALIDATION: &str = "credo_auth::validation";

/// Tracing target for account lifecycle operations.
///
/// Use this target for logging logins, registrations, updates and
/// deactivations.
pub const TRACING_TARGET_SERVICE: &str = "credo_auth::service";

mod config;
mod error;

pub mod security;
pub mod service;
pub mod token;
pub mod validation;

pub use crate::config::{AuthConfig, AuthConfigBuilder, AuthConfigBuilderError};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::service::{AuthError, AuthErrorReason, AuthResult, AuthService, NewUser, UserUpdate};
pub use crate::validation::{StructuralValidator, UserValidator};
