//! In-process user store.

use std::collections::HashMap;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{User, UserRecord, normalize_email};
use crate::query::UserRepository;
use crate::{StoreError, StoreResult, TRACING_TARGET_MEMORY};

/// User store backed by a hash map behind an async read-write lock.
///
/// Cloning is cheap and every clone shares the same records. Writers are
/// serialized by the lock, so updates to a single user never interleave.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<MemoryUserStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryUserStoreInner {
    users: HashMap<Uuid, User>,
    /// Normalized email to user id.
    emails: HashMap<String, Uuid>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users, active or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Returns whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }
}

impl UserRepository for MemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        let user = inner
            .emails
            .get(&normalize_email(email))
            .and_then(|user_id| inner.users.get(user_id))
            .cloned();

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn create_user(&self, record: UserRecord) -> StoreResult<User> {
        let email = normalize_email(&record.email);
        let mut inner = self.inner.write().await;

        if inner.emails.contains_key(&email) {
            tracing::debug!(
                target: TRACING_TARGET_MEMORY,
                "user creation rejected: email already registered"
            );
            return Err(StoreError::Conflict);
        }

        let now = Timestamp::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.clone(),
            password_hash: record.password_hash,
            display_name: record.display_name,
            active: true,
            created_at: now,
            updated_at: now,
            deactivated_at: None,
        };

        inner.emails.insert(email, user.id);
        inner.users.insert(user.id, user.clone());

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            user_id = %user.id,
            "user created"
        );

        Ok(user)
    }

    async fn update_user(&self, user_id: Uuid, record: UserRecord) -> StoreResult<User> {
        let email = normalize_email(&record.email);
        let mut inner = self.inner.write().await;
        let MemoryUserStoreInner { users, emails } = &mut *inner;

        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;

        if emails.get(&email).is_some_and(|owner| *owner != user_id) {
            tracing::debug!(
                target: TRACING_TARGET_MEMORY,
                user_id = %user_id,
                "user update rejected: email belongs to another user"
            );
            return Err(StoreError::Conflict);
        }

        if user.email != email {
            emails.remove(&user.email);
            emails.insert(email.clone(), user_id);
        }

        user.email = email;
        user.password_hash = record.password_hash;
        user.display_name = record.display_name;
        user.updated_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            user_id = %user_id,
            "user updated"
        );

        Ok(user.clone())
    }

    async fn deactivate_user(&self, user_id: Uuid) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;

        let now = Timestamp::now();
        user.active = false;
        user.deactivated_at.get_or_insert(now);
        user.updated_at = now;

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            user_id = %user_id,
            "user deactivated"
        );

        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            email: email.to_owned(),
            password_hash: "$argon2id$hash".to_owned(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults_to_active() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let user = store.create_user(record(" Alice@Example.com")).await?;

        assert!(user.active);
        assert_eq!(user.email, "alice@example.com");
        assert!(user.deactivated_at.is_none());
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_email_is_case_insensitive() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let created = store.create_user(record("a@x.com")).await?;

        let found = store.find_user_by_email("A@X.COM").await?;
        assert_eq!(found.map(|user| user.id), Some(created.id));
        assert!(store.find_user_by_email("b@x.com").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        store.create_user(record("a@x.com")).await?;

        let result = store.create_user(record("A@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict)));
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_fields_and_reindexes_email() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let user = store.create_user(record("a@x.com")).await?;

        let updated = store
            .update_user(
                user.id,
                UserRecord {
                    email: "b@x.com".to_owned(),
                    password_hash: "$argon2id$other".to_owned(),
                    display_name: Some("Bee".to_owned()),
                },
            )
            .await?;

        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.password_hash, "$argon2id$other");
        assert!(store.find_user_by_email("a@x.com").await?.is_none());
        assert!(store.find_user_by_email("b@x.com").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        store.create_user(record("a@x.com")).await?;
        let other = store.create_user(record("b@x.com")).await?;

        let result = store.update_user(other.id, record("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict)));

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();
        let result = store.update_user(Uuid::now_v7(), record("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let user = store.create_user(record("a@x.com")).await?;

        let first = store.deactivate_user(user.id).await?;
        let second = store.deactivate_user(user.id).await?;

        assert!(!first.active);
        assert!(!second.active);
        assert_eq!(first.deactivated_at, second.deactivated_at);

        let found = store.find_user_by_email("a@x.com").await?;
        assert!(found.is_some_and(|user| user.is_deactivated()));

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();
        let result = store.deactivate_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn clones_share_records() -> anyhow::Result<()> {
        let store = MemoryUserStore::new();
        let clone = store.clone();
        let user = store.create_user(record("a@x.com")).await?;

        assert!(clone.find_user_by_id(user.id).await?.is_some());
        Ok(())
    }
}
