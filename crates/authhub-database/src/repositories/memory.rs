//! In-process user store.
//!
//! Backs the service and API test suites. Uniqueness is checked and the
//! row inserted under one write lock, so concurrent registrations with the
//! same email produce exactly one success.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::types::UserKey;
use authhub_entity::oauth::OAuthProvider;
use authhub_entity::user::{NewUser, User};

use crate::store::UserStore;

#[derive(Debug, Default)]
struct State {
    next_key: i64,
    users: BTreeMap<UserKey, User>,
}

impl State {
    fn live(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_deleted())
    }
}

/// A [`UserStore`] backed by a map behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    state: RwLock<State>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-deleted users.
    pub async fn count(&self) -> usize {
        self.state.read().await.live().count()
    }

    /// Mark a user as deleted. Returns `false` if no live user has that key.
    pub async fn soft_delete(&self, key: UserKey) -> bool {
        let mut state = self.state.write().await;
        match state.users.get_mut(&key) {
            Some(user) if !user.is_deleted() => {
                user.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserRepository {
    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;

        if state.live().any(|u| u.email == data.email) {
            return Err(AppError::already_exists("Email is already registered"));
        }
        if let (Some(provider), Some(provider_id)) = (data.provider, data.provider_id.as_deref()) {
            let taken = state.live().any(|u| {
                u.provider == Some(provider) && u.provider_id.as_deref() == Some(provider_id)
            });
            if taken {
                return Err(AppError::already_exists("OAuth identity is already linked"));
            }
        }
        if state.live().any(|u| u.external_id == data.external_id) {
            return Err(AppError::already_exists("External id collision"));
        }

        state.next_key += 1;
        let now = Utc::now();
        let user = User {
            key: UserKey(state.next_key),
            external_id: data.external_id.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            name: data.name.clone(),
            avatar_url: data.avatar_url.clone(),
            provider: data.provider,
            provider_id: data.provider_id.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.insert(user.key, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.live().find(|u| u.email == email).cloned())
    }

    async fn find_by_key(&self, key: UserKey) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&key).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .live()
            .find(|u| u.provider == Some(provider) && u.provider_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(&user.key)
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.key)))?;

        stored.name = user.name.clone();
        stored.avatar_url = user.avatar_url.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use authhub_core::ErrorKind;
    use authhub_entity::oauth::OAuthIdentity;

    fn password_user(email: &str) -> NewUser {
        NewUser::with_password(email.to_string(), "Ann".to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = MemoryUserRepository::new();
        repo.create(&password_user("ann@example.com")).await.unwrap();

        let err = repo
            .create(&password_user("ann@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_has_one_winner() {
        let repo = Arc::new(MemoryUserRepository::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(&password_user("race@example.com")).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e.kind, ErrorKind::AlreadyExists),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_free_the_email() {
        let repo = MemoryUserRepository::new();
        let first = repo.create(&password_user("gone@example.com")).await.unwrap();
        assert!(repo.soft_delete(first.key).await);

        assert!(repo.find_by_key(first.key).await.unwrap().is_none());
        assert!(repo.find_by_email("gone@example.com").await.unwrap().is_none());

        let second = repo.create(&password_user("gone@example.com")).await.unwrap();
        assert_ne!(first.key, second.key);
    }

    #[tokio::test]
    async fn test_provider_lookup_and_update() {
        let repo = MemoryUserRepository::new();
        let identity = OAuthIdentity {
            provider: OAuthProvider::Google,
            provider_id: "g-1".to_string(),
            email: "g@example.com".to_string(),
            name: "G".to_string(),
            avatar_url: None,
        };
        let created = repo.create(&NewUser::from_identity(&identity)).await.unwrap();

        let mut found = repo
            .find_by_provider(OAuthProvider::Google, "g-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.key, created.key);
        assert!(
            repo.find_by_provider(OAuthProvider::Github, "g-1")
                .await
                .unwrap()
                .is_none()
        );

        found.name = "Gee".to_string();
        let updated = repo.update(&found).await.unwrap();
        assert_eq!(updated.name, "Gee");
        assert_eq!(updated.external_id, created.external_id);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let repo = MemoryUserRepository::new();
        let mut user = repo.create(&password_user("x@example.com")).await.unwrap();
        repo.soft_delete(user.key).await;
        user.name = "Changed".to_string();

        let err = repo.update(&user).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
