//! Error types for the password layer.

/// Errors that can occur while hashing a password.
///
/// Verification never produces an error: a malformed stored hash is a
/// failed verification. None of these messages carry the plaintext.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Argon2 rejected the configured cost parameters.
    #[error("invalid password hashing parameters: {0}")]
    InvalidParams(String),

    /// The configured salt length is outside what the PHC format allows.
    #[error("salt length {0} is out of range")]
    SaltLength(usize),

    /// The hash computation itself failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The blocking task running the hash was cancelled or panicked.
    #[error("password hashing task failed: {0}")]
    Task(String),
}
