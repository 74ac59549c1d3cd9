//! Session orchestrator: every sign-in flow ends in a freshly issued token.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use authhub_auth::oauth::generate_state;
use authhub_auth::{PasswordHasher, PasswordValidator, ProviderRegistry, TokenAuthority};
use authhub_core::bounded;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_database::UserStore;
use authhub_entity::oauth::OAuthIdentity;
use authhub_entity::user::{NewUser, User};

use super::types::{AuthSession, LoginInput, OAuthRedirect, RegisterInput};
use crate::context::RequestContext;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 100;

/// Handles registration, login, OAuth login, logout, and token checks.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// Identity store.
    store: Arc<dyn UserStore>,
    /// Token authority.
    authority: Arc<TokenAuthority>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    validator: Arc<PasswordValidator>,
    /// Configured OAuth providers.
    providers: Arc<ProviderRegistry>,
    /// Deadline applied to each store, cache, and provider call.
    call_timeout: Duration,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        store: Arc<dyn UserStore>,
        authority: Arc<TokenAuthority>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        providers: Arc<ProviderRegistry>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            authority,
            hasher,
            validator,
            providers,
            call_timeout,
        }
    }

    /// Creates a password account and signs it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        let email = normalize_email(&input.email)?;
        let name = normalize_name(&input.name)?;
        self.validator.validate(&input.password)?;

        let existing = bounded(
            self.call_timeout,
            "find user by email",
            self.store.find_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            return Err(AppError::already_exists("Email is already registered"));
        }

        let hash = self.hash_password(input.password).await?;

        // A concurrent registration that got past the lookup is rejected
        // by the store's unique index as AlreadyExists.
        let user = bounded(
            self.call_timeout,
            "create user",
            self.store.create(&NewUser::with_password(email, name, hash)),
        )
        .await?;

        info!(user = %user.external_id, "User registered");
        self.open_session(&user).await
    }

    /// Signs in with email and password.
    ///
    /// Unknown email, missing hash, corrupt hash, and wrong password all
    /// fail with the same `InvalidCredentials` error after the same amount
    /// of hashing work.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        let email = input.email.trim().to_lowercase();

        let user = bounded(
            self.call_timeout,
            "find user by email",
            self.store.find_by_email(&email),
        )
        .await?;

        let hash = user
            .as_ref()
            .and_then(|u| u.password_hash.clone())
            .filter(|h| !h.is_empty());

        let verified = match self.verify_password(input.password, hash).await {
            Ok(verified) => verified,
            Err(e) => {
                warn!(error = %e, "Stored password hash is unreadable");
                false
            }
        };

        match user {
            Some(user) if verified => {
                info!(user = %user.external_id, "User logged in");
                self.open_session(&user).await
            }
            _ => Err(AppError::invalid_credentials()),
        }
    }

    /// Builds the provider redirect for `provider` with a fresh state value.
    pub fn oauth_authorization_url(&self, provider: &str) -> AppResult<OAuthRedirect> {
        let idp = self.providers.resolve(provider)?;
        let state = generate_state();
        let url = idp.authorization_url(&state)?;
        Ok(OAuthRedirect {
            provider: idp.kind(),
            url,
            state,
        })
    }

    /// Completes an OAuth callback: exchange the code, then find or create
    /// the user bound to the provider identity, then sign in.
    pub async fn oauth_login(&self, provider: &str, code: &str) -> AppResult<AuthSession> {
        let idp = self.providers.resolve(provider)?;
        if code.trim().is_empty() {
            return Err(AppError::validation("Authorization code is required"));
        }

        let identity = bounded(
            self.call_timeout,
            "OAuth code exchange",
            idp.exchange_code(code),
        )
        .await?;
        if !identity.has_email() {
            return Err(AppError::oauth_exchange_failed(
                identity.provider,
                "provider returned no verified email",
            ));
        }

        let existing = bounded(
            self.call_timeout,
            "find user by provider",
            self.store
                .find_by_provider(identity.provider, &identity.provider_id),
        )
        .await?;

        let user = match existing {
            Some(user) => self.reconcile_profile(user, &identity).await,
            None => self.create_oauth_user(&identity).await?,
        };

        info!(
            user = %user.external_id,
            provider = %identity.provider,
            "User logged in via OAuth"
        );
        self.open_session(&user).await
    }

    /// Revokes the token the request was made with.
    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<()> {
        bounded(
            self.call_timeout,
            "revoke token",
            self.authority.revoke_token(&ctx.token),
        )
        .await?;
        info!(user = %ctx.user_key, "User logged out");
        Ok(())
    }

    /// Revokes every cached token of the caller.
    pub async fn logout_all(&self, ctx: &RequestContext) -> AppResult<()> {
        bounded(
            self.call_timeout,
            "revoke user tokens",
            self.authority.revoke_all_user_tokens(ctx.user_key),
        )
        .await?;
        info!(user = %ctx.user_key, "User logged out everywhere");
        Ok(())
    }

    /// Validates a presented token and builds the request context.
    pub async fn authenticate(&self, token: &str) -> AppResult<RequestContext> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::invalid_token("Missing token"));
        }
        let claims = bounded(
            self.call_timeout,
            "validate token",
            self.authority.validate_token(token),
        )
        .await?;
        Ok(RequestContext::from_claims(&claims, token))
    }

    async fn create_oauth_user(&self, identity: &OAuthIdentity) -> AppResult<User> {
        // No silent linking onto an account that owns the same email.
        let by_email = bounded(
            self.call_timeout,
            "find user by email",
            self.store.find_by_email(&identity.email),
        )
        .await?;
        if by_email.is_some() {
            return Err(AppError::already_exists(
                "Email is already registered with another account",
            ));
        }

        let user = bounded(
            self.call_timeout,
            "create user",
            self.store.create(&NewUser::from_identity(identity)),
        )
        .await?;
        info!(
            user = %user.external_id,
            provider = %identity.provider,
            "User created from OAuth profile"
        );
        Ok(user)
    }

    /// Best-effort refresh of name and avatar. A failed update keeps the
    /// stored record and still lets the login through.
    async fn reconcile_profile(&self, user: User, identity: &OAuthIdentity) -> User {
        if !user.needs_profile_refresh(identity) {
            return user;
        }

        let mut refreshed = user.clone();
        refreshed.apply_identity(identity);

        match bounded(self.call_timeout, "update user", self.store.update(&refreshed)).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(user = %user.external_id, error = %e, "Failed to refresh OAuth profile");
                user
            }
        }
    }

    async fn open_session(&self, user: &User) -> AppResult<AuthSession> {
        let issued = bounded(
            self.call_timeout,
            "issue token",
            self.authority.issue_token(user.key, &user.email),
        )
        .await?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.profile(),
        })
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    /// Without a stored hash the dummy hash is verified instead.
    async fn verify_password(&self, password: String, hash: Option<String>) -> AppResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify_password(&password, &hash),
            None => {
                hasher.verify_dummy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    let well_formed = email.len() <= MAX_EMAIL_LENGTH
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !well_formed {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(email)
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}
