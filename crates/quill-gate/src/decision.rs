//! The gate itself.

use quill_store::Identity;

use crate::AuthorizationRequirement;

/// Why the gate said no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// Nobody is logged in. The caller should send the user to log in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Someone is logged in, but not with enough privilege. Logging in
    /// again won't help, so no redirect.
    #[error("forbidden")]
    Forbidden,
}

/// The outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts to a `Result` so route code can use `?`.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// Decides whether `identity` may perform an operation that demands
/// `requirement`.
///
/// | Requirement         | Allowed when                 | Otherwise                        |
/// |---------------------|------------------------------|----------------------------------|
/// | `Public`            | always                       | n/a                              |
/// | `AuthenticatedOnly` | an identity is present       | `NotAuthenticated`               |
/// | `AdminOnly`         | the identity is the admin    | `NotAuthenticated` / `Forbidden` |
pub fn authorize(
    requirement: AuthorizationRequirement,
    identity: Option<&Identity>,
) -> Decision {
    match (requirement, identity) {
        (AuthorizationRequirement::Public, _) => Decision::Allow,
        (_, None) => Decision::Deny(DenyReason::NotAuthenticated),
        (AuthorizationRequirement::AuthenticatedOnly, Some(_)) => Decision::Allow,
        (AuthorizationRequirement::AdminOnly, Some(who)) if who.is_admin() => {
            Decision::Allow
        }
        (AuthorizationRequirement::AdminOnly, Some(_)) => {
            Decision::Deny(DenyReason::Forbidden)
        }
    }
}
