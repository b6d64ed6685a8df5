//! Password hashing for Quill.
//!
//! This crate owns the only code that ever touches a plaintext password:
//!
//! 1. **Hashing**: turning a plaintext into an opaque, salted
//!    [`HashedPassword`] ([`PasswordHasher::hash`])
//! 2. **Verification**: checking a plaintext against a stored hash in
//!    constant time ([`PasswordHasher::verify`])
//!
//! The algorithm (Argon2id) and its work factor are chosen by
//! [`PasswordConfig`], never by the caller.
//!
//! # How it fits in the stack
//!
//! ```text
//! Auth Service (above)  ← hashes on register, verifies on login
//!     ↕
//! Password layer (this crate)  ← Argon2id, PHC strings
//!     ↕
//! Credential Store (beside)  ← persists the opaque HashedPassword
//! ```

mod config;
mod error;
mod hasher;

pub use config::PasswordConfig;
pub use error::PasswordError;
pub use hasher::{HashedPassword, PasswordHasher};
pub use zeroize::Zeroizing;
