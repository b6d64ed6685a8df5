//! What the route layer does with a denial.

use crate::DenyReason;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// The response a route should produce for a denied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Send the visitor to the login page, remembering where they were
    /// headed so the login flow can bounce them back. `next` is only ever
    /// a same-site path.
    RedirectToLogin { next: Option<String> },

    /// Refuse outright. No redirect: logging in again won't change the
    /// answer.
    AccessDenied,
}

impl Rejection {
    /// Maps a denial for a request to `path` onto a route response.
    pub fn for_denial(reason: DenyReason, path: Option<&str>) -> Self {
        match reason {
            DenyReason::NotAuthenticated => Self::RedirectToLogin {
                next: path.filter(|p| is_local_path(p)).map(str::to_string),
            },
            DenyReason::Forbidden => Self::AccessDenied,
        }
    }

    /// The HTTP status this rejection corresponds to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RedirectToLogin { .. } => 302,
            Self::AccessDenied => 403,
        }
    }

    /// The redirect target, if this rejection redirects.
    ///
    /// `next` travels percent-encoded as a single query value, so a path
    /// carrying its own `?` or `&` can't add parameters to the login URL.
    pub fn location(&self) -> Option<String> {
        match self {
            Self::RedirectToLogin { next: Some(next) } if is_local_path(next) => {
                Some(format!("{LOGIN_PATH}?next={}", urlencoding::encode(next)))
            }
            Self::RedirectToLogin { .. } => Some(LOGIN_PATH.to_string()),
            Self::AccessDenied => None,
        }
    }
}

/// `true` for paths on this site: one leading `/`, not the `//host` or
/// `/\host` forms browsers treat as another origin.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

impl From<DenyReason> for Rejection {
    fn from(reason: DenyReason) -> Self {
        Self::for_denial(reason, None)
    }
}
