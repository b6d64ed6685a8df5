//! Identity types: the durable record of a registered user.

use std::fmt;

use quill_password::HashedPassword;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// A unique identifier for a registered user.
///
/// Ids are assigned by the store in insertion order, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The id that receives [`Role::Admin`] unless configured otherwise.
///
/// The first account registered on a fresh store becomes the blog's
/// administrator.
pub const DEFAULT_ADMIN_ID: UserId = UserId(1);

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What an identity is allowed to do beyond being logged in.
///
/// Assigned once, by the store, when the identity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May author, edit, and delete posts.
    Admin,
    /// May comment and write their own posts.
    Member,
}

impl Role {
    /// The role a freshly created identity with `id` receives.
    pub fn for_new_identity(id: UserId, admin_id: UserId) -> Self {
        if id == admin_id {
            Self::Admin
        } else {
            Self::Member
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A registered user as every layer above the store sees them.
///
/// Carries no password material. Posts and comments refer to an identity
/// by its [`UserId`] only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique, compared byte-for-byte (case-sensitive as stored).
    pub email: String,
    pub role: Role,
}

impl Identity {
    /// Returns `true` if this identity holds [`Role::Admin`].
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

// ---------------------------------------------------------------------------
// NewIdentity / StoredCredential
// ---------------------------------------------------------------------------

/// The fields needed to create an identity. The store assigns id and role.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub password_hash: HashedPassword,
}

/// An identity together with its password hash: one row of the table.
///
/// This is the only shape in which a hash leaves a store. The hash is
/// reachable solely as an opaque [`HashedPassword`], which can be verified
/// but not read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    #[serde(flatten)]
    identity: Identity,
    password_hash: HashedPassword,
}

impl StoredCredential {
    pub(crate) fn new(identity: Identity, password_hash: HashedPassword) -> Self {
        Self {
            identity,
            password_hash,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}
