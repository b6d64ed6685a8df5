//! Login session management for Quill.
//!
//! This crate handles what happens between "the password checked out" and
//! "the user clicked log out":
//!
//! 1. **Issuing**: binding a fresh random token to a user id
//!    ([`SessionManager::login`])
//! 2. **Resolving**: turning the token a request carries back into a user
//!    id, without side effects ([`SessionManager::resolve`])
//! 3. **Teardown**: logout, expiry, and per-user revocation
//!
//! # How it fits in the stack
//!
//! ```text
//! Auth Service (above)  ← maps resolved user ids to identities
//!     ↕
//! Session Layer (this crate)  ← token → user id, lifetime policy
//!     ↕
//! Credential Store (below)  ← provides UserId
//! ```
//!
//! The token's transport (cookie, header, query string) is the host's
//! concern. It arrives here inside a [`RequestContext`].

mod context;
mod error;
mod manager;
mod session;

pub use context::RequestContext;
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionState, SessionToken};
