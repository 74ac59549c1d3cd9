//! User self-service operations: profile viewing.

use std::sync::Arc;
use std::time::Duration;

use authhub_core::bounded;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_database::UserStore;
use authhub_entity::user::UserProfile;

use crate::context::RequestContext;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// Identity store.
    store: Arc<dyn UserStore>,
    /// Deadline for store calls.
    call_timeout: Duration,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(store: Arc<dyn UserStore>, call_timeout: Duration) -> Self {
        Self {
            store,
            call_timeout,
        }
    }

    /// Gets the caller's public profile.
    ///
    /// Fails with `NotFound` if the account was deleted after the token
    /// was issued.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<UserProfile> {
        bounded(
            self.call_timeout,
            "find user by key",
            self.store.find_by_key(ctx.user_key),
        )
        .await?
        .map(|user| user.profile())
        .ok_or_else(|| AppError::not_found("User not found"))
    }
}
