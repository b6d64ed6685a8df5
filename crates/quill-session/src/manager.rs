//! The session manager: tracks every live login.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Issuing a session when a user logs in
//! - Resolving the token a request carries back to a user id
//! - Tearing sessions down on logout, expiry, or revocation
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself: it uses a plain
//! `HashMap`. The auth service owns one behind a `tokio::sync::Mutex`, and
//! every mutation below completes within a single lock acquisition.

use std::collections::HashMap;

use quill_store::UserId;

use crate::{
    RequestContext, Session, SessionConfig, SessionError, SessionState,
    SessionToken,
};

/// Manages all live sessions.
///
/// ## Lifecycle
///
/// ```text
/// login() ──→ [Authenticated] ──→ logout() / revoke() ──→ [gone]
///                   │
///                   ▼ (ttl elapsed)
///           resolves as Anonymous ──→ expire_stale() ──→ [gone]
/// ```
pub struct SessionManager {
    /// All sessions, keyed by token.
    ///
    /// A user may appear under several tokens (one per device).
    sessions: HashMap<SessionToken, Session>,

    /// Lifetime policy.
    config: SessionConfig,

    /// Sequence number for the next issued session.
    next_sequence: u64,
}

impl SessionManager {
    /// Creates a new, empty session manager with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            next_sequence: 0,
        }
    }

    /// Establishes a new session for `user_id` and returns it.
    ///
    /// Always mints a fresh token; existing sessions of the same user on
    /// other devices are left alone unless `max_sessions_per_user` forces
    /// the oldest out.
    pub fn login(&mut self, user_id: UserId) -> &Session {
        if let Some(limit) = self.config.max_sessions_per_user {
            self.evict_oldest(user_id, limit.saturating_sub(1));
        }

        let session = Session::new(user_id, self.next_sequence);
        self.next_sequence += 1;
        let token = session.token.clone();
        self.sessions.insert(token.clone(), session);

        tracing::info!(%user_id, "session created");

        // The entry was inserted on the line above.
        self.sessions.get(&token).expect("just inserted")
    }

    /// Checks a token strictly, reporting why it doesn't resolve.
    ///
    /// # Errors
    /// - [`SessionError::InvalidToken`]: never issued or already revoked
    /// - [`SessionError::SessionExpired`]: older than the configured TTL
    pub fn validate(&self, token: &SessionToken) -> Result<UserId, SessionError> {
        let session = self
            .sessions
            .get(token)
            .ok_or(SessionError::InvalidToken)?;

        if session.is_expired(self.config.ttl()) {
            return Err(SessionError::SessionExpired(session.user_id));
        }
        Ok(session.user_id)
    }

    /// Resolves the user a request is logged in as.
    ///
    /// Read-only: calling it any number of times changes nothing. Anonymous
    /// requests, unknown tokens, and expired sessions all yield `None`.
    pub fn resolve(&self, ctx: &RequestContext) -> Option<UserId> {
        let token = ctx.token()?;
        match self.validate(token) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                tracing::debug!(error = %e, "session did not resolve");
                None
            }
        }
    }

    /// The request's position in the Anonymous ⇄ Authenticated machine.
    pub fn state(&self, ctx: &RequestContext) -> SessionState {
        match self.resolve(ctx) {
            Some(user_id) => SessionState::Authenticated(user_id),
            None => SessionState::Anonymous,
        }
    }

    /// Binds a new session for `user_id` to `ctx`.
    ///
    /// Any session the context already carried is revoked first, so a
    /// token planted before login never becomes authenticated.
    pub fn login_into(&mut self, ctx: &mut RequestContext, user_id: UserId) {
        if let Some(previous) = ctx.take_token() {
            self.revoke(&previous);
        }
        let token = self.login(user_id).token.clone();
        ctx.set_token(token);
    }

    /// Ends the session `ctx` carries and clears it from the context.
    ///
    /// Idempotent: logging out an anonymous context, or one whose session
    /// already expired, succeeds and does nothing. Returns `true` if a
    /// live session row was removed.
    pub fn logout(&mut self, ctx: &mut RequestContext) -> bool {
        match ctx.take_token() {
            Some(token) => self.revoke(&token).is_some(),
            None => false,
        }
    }

    /// Removes the session for `token`, returning it if it existed.
    pub fn revoke(&mut self, token: &SessionToken) -> Option<Session> {
        let removed = self.sessions.remove(token);
        if let Some(session) = &removed {
            tracing::info!(user_id = %session.user_id, "session revoked");
        }
        removed
    }

    /// Revokes every session belonging to `user_id`.
    ///
    /// Returns how many were removed.
    pub fn logout_everywhere(&mut self, user_id: UserId) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.user_id != user_id);
        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(%user_id, removed, "all sessions revoked");
        }
        removed
    }

    /// Drops every session that has outlived its TTL.
    ///
    /// Expired sessions already resolve as anonymous; this only frees their
    /// memory. Call it periodically. Returns the owners of the dropped
    /// sessions (one entry per session).
    pub fn expire_stale(&mut self) -> Vec<UserId> {
        let ttl = self.config.ttl();
        let mut expired = Vec::new();

        self.sessions.retain(|_, session| {
            if session.is_expired(ttl) {
                expired.push(session.user_id);
                false
            } else {
                true
            }
        });

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expired sessions dropped");
        }
        expired
    }

    /// Looks up a session by token, expired or not.
    pub fn get(&self, token: &SessionToken) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// Returns how many sessions `user_id` currently holds (any age).
    pub fn sessions_for(&self, user_id: UserId) -> usize {
        self.sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    /// Returns the number of sessions (any age).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Revokes `user_id`'s oldest sessions until at most `keep` remain.
    fn evict_oldest(&mut self, user_id: UserId, keep: usize) {
        let mut owned: Vec<(SessionToken, u64)> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.user_id == user_id)
            .map(|(token, s)| (token.clone(), s.sequence))
            .collect();

        if owned.len() <= keep {
            return;
        }

        owned.sort_by_key(|(_, sequence)| *sequence);
        let excess = owned.len() - keep;
        for (token, _) in owned.into_iter().take(excess) {
            self.revoke(&token);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
