#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for the in-memory store.
///
/// Use this target for logging record creation, updates and deactivation.
pub const TRACING_TARGET_MEMORY: &str = "credo_store::memory";

mod memory;
pub mod model;
pub mod query;

use std::borrow::Cow;

pub use crate::memory::MemoryUserStore;
pub use crate::model::{User, UserRecord, normalize_email};
pub use crate::query::UserRepository;

/// Error type for all user store operations.
///
/// Only [`StoreError::NotFound`] is meaningful to the authentication core;
/// every other variant is treated as an opaque backend failure.
#[derive(Debug, thiserror::Error)]
#[must_use = "store errors should be handled appropriately"]
pub enum StoreError {
    /// No user matches the given identifier.
    #[error("user not found")]
    NotFound,

    /// The write would violate the unique email constraint.
    #[error("email address is already registered")]
    Conflict,

    /// The backend could not serve the request.
    ///
    /// This includes connection loss, timeouts and any driver-level failure.
    #[error("store unavailable: {0}")]
    Unavailable(Cow<'static, str>),
}

impl StoreError {
    /// Creates a new [`StoreError::Unavailable`] error.
    #[inline]
    pub fn unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns whether this error reports a missing user.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns whether this error reports a unique email violation.
    #[inline]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

/// Specialized [`Result`] type for store operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;
