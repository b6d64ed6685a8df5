//! Error types for the storage layer.

/// Errors that can occur while reading or writing identities.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An identity with this email already exists.
    ///
    /// The message never includes the email.
    #[error("email already registered")]
    DuplicateEmail,

    /// The backing storage could not be read or written.
    #[error("credential store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// The backing storage was readable but its contents are not a valid
    /// identity table.
    #[error("credential store is corrupt: {0}")]
    Corrupt(String),
}
