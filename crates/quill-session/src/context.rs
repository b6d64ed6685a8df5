//! Per-request session state as the host hands it to Quill.

use crate::SessionToken;

/// The session-relevant slice of one incoming request.
///
/// Holds at most one [`SessionToken`] (typically lifted from a cookie).
/// Quill writes a fresh token here on login and clears it on logout; the
/// host mirrors those changes back to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    token: Option<SessionToken>,
}

impl RequestContext {
    /// A request that carries no session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A request presenting `token`.
    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    /// Builds a context from a raw cookie value.
    ///
    /// Malformed values are treated as no session at all.
    pub fn from_cookie(value: Option<&str>) -> Self {
        let token = value.and_then(|raw| match raw.parse() {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unusable session cookie");
                None
            }
        });
        Self { token }
    }

    /// The token this request presents, if any.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub(crate) fn set_token(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    pub(crate) fn take_token(&mut self) -> Option<SessionToken> {
        self.token.take()
    }
}
