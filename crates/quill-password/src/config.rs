//! Work-factor configuration for password hashing.

use serde::{Deserialize, Serialize};

/// Argon2id cost parameters and output sizes.
///
/// Every stored hash records the parameters it was produced with (the PHC
/// string carries them), so raising the cost here only affects new hashes.
/// Existing hashes keep verifying with their original parameters.
///
/// `#[serde(default)]` lets a config file override a single field and
/// inherit the rest from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    ///
    /// Default: 19456 (19 MiB), the OWASP baseline for Argon2id.
    pub memory_kib: u32,

    /// Number of passes over memory (time cost).
    pub iterations: u32,

    /// Degree of parallelism (lanes).
    pub parallelism: u32,

    /// Length in bytes of the derived digest.
    pub output_len: usize,

    /// Length in bytes of the random salt drawn for each hash.
    pub salt_len: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
            output_len: 32,
            salt_len: 16,
        }
    }
}

impl PasswordConfig {
    /// The cheapest parameters Argon2 accepts.
    ///
    /// Only for test suites, where hundreds of hashes would otherwise
    /// dominate the run time. Never use this in production.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
            salt_len: 16,
        }
    }
}
