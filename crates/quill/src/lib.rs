//! # Quill
//!
//! Authentication and authorization core for a server-rendered blog.
//!
//! Quill answers three questions for the route layer: *who is this?*
//! (sessions), *can they prove it?* (passwords), and *may they do this?*
//! (the gate). [`AuthService`] composes the layers; hosts only deal with
//! it, a [`RequestContext`], and [`AuthError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill::prelude::*;
//!
//! # async fn demo() -> Result<(), AuthError> {
//! let auth = AuthService::new(MemoryCredentialStore::default(), QuillConfig::default())?;
//!
//! let mut ctx = RequestContext::anonymous();
//! let alice = auth.register(&mut ctx, "Alice", "a@x.com", "pw1").await?;
//! assert_eq!(auth.current_identity(&ctx).await?, Some(alice));
//!
//! auth.require(&ctx, AuthorizationRequirement::AdminOnly).await?;
//! auth.logout(&mut ctx).await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod logging;
mod service;

pub use config::{AuthPolicy, ConfigError, QuillConfig};
pub use error::AuthError;
pub use service::AuthService;

pub use quill_gate::{
    AuthorizationRequirement, Decision, DenyReason, Rejection, authorize,
};
pub use quill_password::{PasswordConfig, PasswordError, PasswordHasher};
pub use quill_session::{RequestContext, SessionConfig, SessionState, SessionToken};
pub use quill_store::{
    CredentialStore, Identity, JsonFileCredentialStore, MemoryCredentialStore,
    NewIdentity, Role, StoreError, StoredCredential, UserId,
};

/// Everything a route layer typically needs.
pub mod prelude {
    pub use crate::{
        AuthError, AuthService, AuthorizationRequirement, CredentialStore, Decision,
        DenyReason, Identity, JsonFileCredentialStore, MemoryCredentialStore,
        QuillConfig, Rejection, RequestContext, Role, UserId, authorize,
    };
}
