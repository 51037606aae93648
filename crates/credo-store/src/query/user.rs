//! User repository contract.

use std::future::Future;

use uuid::Uuid;

use crate::StoreResult;
use crate::model::{User, UserRecord};

/// Repository for user record operations.
///
/// Implementations are shared between concurrent callers, so every method
/// takes `&self`. Any read-modify-write consistency for a single user is the
/// backend's responsibility.
pub trait UserRepository {
    /// Finds a user by email address.
    ///
    /// Email comparison is case-insensitive. Deactivated users are returned
    /// as well; `None` means no user holds this email.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Finds a user by its unique identifier.
    fn find_user_by_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Creates a new user.
    ///
    /// The backend assigns the identifier and timestamps, and the user starts
    /// out active. Fails with [`StoreError::Conflict`] when the email is taken.
    ///
    /// [`StoreError::Conflict`]: crate::StoreError::Conflict
    fn create_user(&self, record: UserRecord) -> impl Future<Output = StoreResult<User>> + Send;

    /// Replaces the email, password hash and display name of a user.
    ///
    /// Fails with [`StoreError::NotFound`] for an unknown identifier.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn update_user(
        &self,
        user_id: Uuid,
        record: UserRecord,
    ) -> impl Future<Output = StoreResult<User>> + Send;

    /// Marks a user as inactive.
    ///
    /// Deactivating an already inactive user succeeds and leaves the first
    /// deactivation timestamp in place.
    fn deactivate_user(&self, user_id: Uuid) -> impl Future<Output = StoreResult<User>> + Send;
}
