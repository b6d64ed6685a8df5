//! The access tiers an operation can demand.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a protected operation requires of the caller.
///
/// Attached by the route that owns the operation. Tiers are cumulative:
/// anything an `AuthenticatedOnly` caller may do, an admin may do too.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationRequirement {
    /// Anyone, logged in or not.
    #[default]
    Public,
    /// Any logged-in identity.
    AuthenticatedOnly,
    /// Only the administrator.
    AdminOnly,
}

impl fmt::Display for AuthorizationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::AuthenticatedOnly => write!(f, "authenticated-only"),
            Self::AdminOnly => write!(f, "admin-only"),
        }
    }
}
