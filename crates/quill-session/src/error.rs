//! Error types for the session layer.

use quill_store::UserId;

/// Reasons a presented session token doesn't resolve to a user.
///
/// Callers on the request path usually collapse all of these into
/// "anonymous" via [`SessionManager::resolve`](crate::SessionManager::resolve);
/// the distinction exists for logging and for strict validation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token is not well-formed (wrong length or not hex).
    #[error("malformed session token")]
    MalformedToken,

    /// The token is well-formed but the server never issued it, or it has
    /// already been revoked.
    #[error("unknown session token")]
    InvalidToken,

    /// The session outlived its configured lifetime.
    #[error("session expired for user {0}")]
    SessionExpired(UserId),
}
