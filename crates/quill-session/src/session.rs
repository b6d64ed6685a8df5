//! Session types: the data structures that represent a logged-in client.
//!
//! A "session" is the server's record that some client proved who it is.
//! It tracks:
//! - WHO is logged in (`UserId`)
//! - HOW the client proves it on later requests (a secret token)
//! - WHEN it started (so we know when to expire it)

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use quill_store::UserId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Random bytes per token. 256 bits makes guessing infeasible.
const TOKEN_BYTES: usize = 32;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Session lifetime policy.
///
/// Expiry is absolute: a session dies `ttl_secs` after login no matter how
/// active it is. Resolving a session never extends it, which keeps
/// [`SessionManager::resolve`](crate::SessionManager::resolve) free of
/// side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a session in seconds, measured from login.
    ///
    /// Default: 86400 (one day). With 0 every session is born expired,
    /// which is only useful in tests.
    pub ttl_secs: u64,

    /// Upper bound on concurrent sessions per user (one per device,
    /// typically). Logging in beyond it evicts that user's oldest session.
    ///
    /// Default: `None` (unbounded).
    pub max_sessions_per_user: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            max_sessions_per_user: None,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// The opaque secret a client presents to prove it is logged in.
///
/// A 64-character lowercase hex string. It is the only piece of client
/// state the server trusts, so it never appears in logs: `Debug` is
/// redacted and there is no `Display`. Use [`as_str`](Self::as_str) to
/// write it into a cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draws a new token from the thread-local CSPRNG.
    pub(crate) fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// The token's wire form, for the host to hand to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parses a token presented by a client (for example a cookie value).
///
/// Only checks shape; whether the server ever issued it is the
/// [`SessionManager`](crate::SessionManager)'s call.
impl FromStr for SessionToken {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == TOKEN_BYTES * 2
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(SessionError::MalformedToken)
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// What a request context currently amounts to.
///
/// ```text
///   Anonymous ──(login)──→ Authenticated ──(logout / expiry)──→ Anonymous
/// ```
///
/// There is no third state: an expired or revoked token is simply
/// Anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(UserId),
}

impl SessionState {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single logged-in session: the handle returned by a successful login.
///
/// A user may hold several at once (one per device). Each is independent:
/// logging out on one device leaves the others alive.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which user this session authenticates.
    pub user_id: UserId,

    /// The secret the client presents on every request.
    pub token: SessionToken,

    /// When the session was established.
    pub created_at: Instant,

    /// Issue order within the owning manager; breaks `created_at` ties.
    pub(crate) sequence: u64,
}

impl Session {
    pub(crate) fn new(user_id: UserId, sequence: u64) -> Self {
        Self {
            user_id,
            token: SessionToken::generate(),
            created_at: Instant::now(),
            sequence,
        }
    }

    /// Returns `true` once the session is at least `ttl` old.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}
