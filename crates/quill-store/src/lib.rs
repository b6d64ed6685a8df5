//! Credential storage for Quill.
//!
//! This crate defines who a user *is* and where that record lives:
//!
//! - **Identity types** ([`Identity`], [`UserId`], [`Role`]): the durable
//!   user record every other layer talks about
//! - **The store contract** ([`CredentialStore`] trait): lookup by email or
//!   id, and create-with-unique-email
//! - **Implementations**: [`MemoryCredentialStore`] for tests and single
//!   process deployments, [`JsonFileCredentialStore`] for a persistent file
//! - **Input rules** ([`validate_registration`], [`validate_login`]): the
//!   field constraints the identity table imposes
//!
//! The password hash only ever leaves a store inside a
//! [`StoredCredential`], and only as an opaque
//! [`HashedPassword`](quill_password::HashedPassword).

#![allow(async_fn_in_trait)]

mod error;
mod identity;
mod json_file;
mod memory;
mod store;
mod table;
mod validate;

pub use error::StoreError;
pub use identity::{
    DEFAULT_ADMIN_ID, Identity, NewIdentity, Role, StoredCredential, UserId,
};
pub use json_file::JsonFileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use store::CredentialStore;
pub use validate::{
    Field, InvalidInput, MAX_EMAIL_LEN, MAX_NAME_LEN, validate_login,
    validate_registration,
};
