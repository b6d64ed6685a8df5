//! Argon2id hashing and constant-time verification.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{PasswordConfig, PasswordError};

/// Shortest salt we accept: 64 bits, the floor the PHC format recommends.
const MIN_SALT_LEN: usize = 8;

/// Longest salt that still fits a PHC salt field (64 base64 chars).
const MAX_SALT_LEN: usize = 48;

// ---------------------------------------------------------------------------
// HashedPassword
// ---------------------------------------------------------------------------

/// An opaque, salted password hash in PHC string format.
///
/// The only things you can do with one are store it (it serializes as a
/// plain string) and hand it back to [`PasswordHasher::verify`]. There is
/// no `Display`, and `Debug` is redacted, so a hash can't end up in a log
/// line by accident.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wraps a hash string loaded from storage.
    ///
    /// No validation happens here; a malformed value simply never
    /// verifies.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    fn as_phc(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// PasswordHasher
// ---------------------------------------------------------------------------

struct Inner {
    argon2: Argon2<'static>,
    salt_len: usize,
    /// Verifications run so far, across every clone.
    verifications: AtomicU64,
}

/// Hashes and verifies passwords with Argon2id.
///
/// Cloning is cheap (the configured engine sits behind an `Arc`), which is
/// what lets [`hash_blocking`](Self::hash_blocking) move a copy onto
/// Tokio's blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<Inner>,
}

impl PasswordHasher {
    /// Builds a hasher from the given cost parameters.
    ///
    /// # Errors
    /// - [`PasswordError::SaltLength`] if `salt_len` is outside 8..=48
    /// - [`PasswordError::InvalidParams`] if Argon2 rejects the costs
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&config.salt_len) {
            return Err(PasswordError::SaltLength(config.salt_len));
        }

        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(config.output_len),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
                salt_len: config.salt_len,
                verifications: AtomicU64::new(0),
            }),
        })
    }

    /// Hashes `plaintext` with a freshly drawn random salt.
    ///
    /// Two calls with the same plaintext produce different hashes.
    pub fn hash(&self, plaintext: &str) -> Result<HashedPassword, PasswordError> {
        let mut salt_bytes = vec![0u8; self.inner.salt_len];
        rand::rng().fill(salt_bytes.as_mut_slice());

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        let phc = self
            .inner
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?
            .to_string();

        Ok(HashedPassword(phc))
    }

    /// Returns `true` if `plaintext` matches `stored`.
    ///
    /// The digest comparison is constant-time. The parameters recorded in
    /// the stored hash are used, not the ones this hasher was built with.
    /// Fails closed: an unparseable hash returns `false`.
    pub fn verify(&self, plaintext: &str, stored: &HashedPassword) -> bool {
        self.inner.verifications.fetch_add(1, Ordering::Relaxed);
        let Ok(parsed) = PasswordHash::new(stored.as_phc()) else {
            tracing::warn!("stored password hash is malformed; rejecting");
            return false;
        };
        self.inner
            .argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on Tokio's blocking pool.
    ///
    /// Argon2 is slow on purpose; running it inline would stall every
    /// other task scheduled on the same worker thread.
    ///
    /// The plaintext copy is wiped when the task drops it.
    pub async fn hash_blocking(
        &self,
        plaintext: Zeroizing<String>,
    ) -> Result<HashedPassword, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// [`verify`](Self::verify) on Tokio's blocking pool.
    ///
    /// A failed task counts as a mismatch.
    pub async fn verify_blocking(
        &self,
        plaintext: Zeroizing<String>,
        stored: HashedPassword,
    ) -> bool {
        let hasher = self.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored))
            .await
        {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "password verification task failed");
                false
            }
        }
    }
}

impl PasswordHasher {
    /// How many verifications this hasher (and its clones) has run,
    /// successful or not.
    pub fn verifications(&self) -> u64 {
        self.inner.verifications.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .field("salt_len", &self.inner.salt_len)
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================
