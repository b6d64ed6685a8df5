//! The credential store contract.
//!
//! Quill doesn't care whether identities live in memory, in a file, or in
//! a database. It only needs the handful of operations below, expressed
//! as the [`CredentialStore`] trait. The auth service is generic over it,
//! so swapping storage never touches the login or registration flows.

use std::future::Future;

use crate::{Identity, NewIdentity, StoreError, StoredCredential, UserId};

/// Persists identities and their password hashes.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every request task.
/// - `'static` → it lives as long as the service that owns it.
///
/// # Atomicity
///
/// [`create`](Self::create) must check email uniqueness and insert the row
/// as one atomic step. Two concurrent calls with the same email must not
/// both succeed; the loser gets [`StoreError::DuplicateEmail`].
pub trait CredentialStore: Send + Sync + 'static {
    /// Looks up an identity by exact email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Identity>, StoreError>> + Send;

    /// Looks up an identity by id.
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<Identity>, StoreError>> + Send;

    /// Looks up the full row (identity plus opaque hash) for a login
    /// attempt.
    fn credential_for(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<StoredCredential>, StoreError>> + Send;

    /// Creates a new identity, assigning its id and role.
    ///
    /// # Errors
    /// - [`StoreError::DuplicateEmail`]: the email is already present
    /// - [`StoreError::Unavailable`]: the write could not be persisted
    fn create(
        &self,
        new: NewIdentity,
    ) -> impl Future<Output = Result<Identity, StoreError>> + Send;

    /// Returns the number of stored identities.
    fn count(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;
}
