//! `AuthService`: registration, login, logout, and identity resolution.
//!
//! This is the entry point for the route layer. It ties together all the
//! layers: store → password → session → gate.

use std::path::Path;

use quill_gate::{AuthorizationRequirement, Decision, authorize};
use quill_password::{HashedPassword, PasswordHasher, Zeroizing};
use quill_session::{RequestContext, SessionManager, SessionState};
use quill_store::{
    CredentialStore, Identity, JsonFileCredentialStore, MemoryCredentialStore,
    NewIdentity, UserId, validate_login, validate_registration,
};
use tokio::sync::Mutex;

use crate::{AuthError, AuthPolicy, QuillConfig};

/// Plaintext behind the decoy hash that unknown-email logins are checked
/// against. No identity ever has this hash, so it never matches anything.
const DECOY_PASSWORD: &str = "quill-decoy-password";

/// The auth core, generic over where identities are stored.
///
/// Share one instance across all request tasks (wrap it in an `Arc`).
/// The session table sits behind an async mutex, and the lock is never
/// held while a password is being hashed.
pub struct AuthService<S: CredentialStore> {
    store: S,
    hasher: PasswordHasher,
    sessions: Mutex<SessionManager>,
    policy: AuthPolicy,
    /// Verified against on unknown-email logins in unified mode, so those
    /// cost one Argon2 run like a real account. `None` when the mode is off.
    decoy_hash: Option<HashedPassword>,
}

impl<S: CredentialStore> AuthService<S> {
    /// Builds the service around an existing store.
    ///
    /// The store decides which id becomes admin; build it with
    /// `config.policy.admin_id()` so the two agree.
    ///
    /// With `unify_login_errors` set, this hashes the decoy password once,
    /// inline.
    ///
    /// # Errors
    /// Returns [`AuthError::Password`] if the hashing parameters are invalid.
    pub fn new(store: S, config: QuillConfig) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(&config.password)?;
        let decoy_hash = if config.policy.unify_login_errors {
            Some(hasher.hash(DECOY_PASSWORD)?)
        } else {
            None
        };
        Ok(Self {
            store,
            hasher,
            sessions: Mutex::new(SessionManager::new(config.session)),
            policy: config.policy,
            decoy_hash,
        })
    }

    /// Registers a new identity and logs the client in as it.
    ///
    /// # Errors
    /// - [`AuthError::InvalidInput`]: a field failed validation
    /// - [`AuthError::DuplicateEmail`]: the email already has an account;
    ///   nothing is created or overwritten
    /// - [`AuthError::StoreUnavailable`]: the store could not be reached
    pub async fn register(
        &self,
        ctx: &mut RequestContext,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        validate_registration(name, email, password)?;

        // Cheap early exit that skips hashing. The store's own uniqueness
        // check below is what actually settles races.
        if self.store.find_by_email(email).await?.is_some() {
            tracing::debug!("registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self
            .hasher
            .hash_blocking(Zeroizing::new(password.to_string()))
            .await?;
        let identity = self
            .store
            .create(NewIdentity {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(
            user_id = %identity.id,
            role = %identity.role,
            "identity registered"
        );

        self.sessions.lock().await.login_into(ctx, identity.id);
        Ok(identity)
    }

    /// Checks an email/password pair and, on success, logs the client in.
    ///
    /// A failed attempt leaves `ctx` untouched.
    ///
    /// # Errors
    /// - [`AuthError::InvalidInput`]: a field failed validation
    /// - [`AuthError::UserNotFound`] / [`AuthError::WrongPassword`]: the
    ///   login failed ([`AuthError::InvalidCredentials`] for both when
    ///   `unify_login_errors` is set)
    /// - [`AuthError::StoreUnavailable`]: the store could not be reached
    pub async fn login(
        &self,
        ctx: &mut RequestContext,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        validate_login(email, password)?;

        let Some(credential) = self.store.credential_for(email).await? else {
            if let Some(decoy) = &self.decoy_hash {
                // Spend the same hashing time a real account would cost.
                self.hasher
                    .verify_blocking(Zeroizing::new(password.to_string()), decoy.clone())
                    .await;
                tracing::debug!("login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
            tracing::debug!("login rejected: unknown email");
            return Err(AuthError::UserNotFound);
        };

        let matched = self
            .hasher
            .verify_blocking(
                Zeroizing::new(password.to_string()),
                credential.password_hash().clone(),
            )
            .await;
        if !matched {
            tracing::debug!(
                user_id = %credential.identity().id,
                "login rejected: wrong password"
            );
            return Err(if self.policy.unify_login_errors {
                AuthError::InvalidCredentials
            } else {
                AuthError::WrongPassword
            });
        }

        let identity = credential.into_identity();
        self.sessions.lock().await.login_into(ctx, identity.id);
        tracing::info!(user_id = %identity.id, "login succeeded");
        Ok(identity)
    }

    /// Ends the client's session. Always succeeds, even when there was
    /// nothing to end.
    pub async fn logout(&self, ctx: &mut RequestContext) {
        self.sessions.lock().await.logout(ctx);
    }

    /// Resolves who the request is logged in as.
    ///
    /// Read-only. `Ok(None)` for anonymous requests, unknown or expired
    /// tokens, and sessions whose identity no longer exists.
    pub async fn current_identity(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<Identity>, AuthError> {
        let user_id = self.sessions.lock().await.resolve(ctx);
        match user_id {
            Some(user_id) => Ok(self.store.find_by_id(user_id).await?),
            None => Ok(None),
        }
    }

    /// The request's session state, without touching the store.
    pub async fn session_state(&self, ctx: &RequestContext) -> SessionState {
        self.sessions.lock().await.state(ctx)
    }

    /// Resolves the current identity and runs it through the gate.
    ///
    /// Returns the identity (if any) on success, so the route can
    /// attribute the work it's about to do.
    ///
    /// # Errors
    /// - [`AuthError::NotAuthenticated`] / [`AuthError::Forbidden`]: the
    ///   gate denied the request
    /// - [`AuthError::StoreUnavailable`]: the store could not be reached
    pub async fn require(
        &self,
        ctx: &RequestContext,
        requirement: AuthorizationRequirement,
    ) -> Result<Option<Identity>, AuthError> {
        let identity = self.current_identity(ctx).await?;
        match authorize(requirement, identity.as_ref()) {
            Decision::Allow => Ok(identity),
            Decision::Deny(reason) => {
                tracing::debug!(%requirement, %reason, "request denied");
                Err(reason.into())
            }
        }
    }

    /// Revokes every session `user_id` holds. Returns how many ended.
    pub async fn logout_everywhere(&self, user_id: UserId) -> usize {
        self.sessions.lock().await.logout_everywhere(user_id)
    }

    /// Frees expired sessions. Returns how many were dropped.
    pub async fn sweep_expired_sessions(&self) -> usize {
        self.sessions.lock().await.expire_stale().len()
    }

    /// Number of sessions currently held, expired ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// The underlying credential store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl AuthService<MemoryCredentialStore> {
    /// A service over a fresh in-memory store, admin id taken from config.
    pub fn in_memory(config: QuillConfig) -> Result<Self, AuthError> {
        let store = MemoryCredentialStore::new(config.policy.admin_id());
        Self::new(store, config)
    }
}

impl AuthService<JsonFileCredentialStore> {
    /// A service over the JSON credential file at `path`.
    pub async fn open_json_file(
        path: impl AsRef<Path>,
        config: QuillConfig,
    ) -> Result<Self, AuthError> {
        let store =
            JsonFileCredentialStore::open(path, config.policy.admin_id()).await?;
        Self::new(store, config)
    }
}
