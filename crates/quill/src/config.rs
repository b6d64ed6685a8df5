//! Top-level configuration for the auth core.

use std::path::Path;

use quill_password::PasswordConfig;
use quill_session::SessionConfig;
use quill_store::UserId;
use serde::{Deserialize, Serialize};

/// Errors loading a [`QuillConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Auth behavior that isn't about sessions or hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPolicy {
    /// The identity id that becomes the administrator on creation.
    ///
    /// Default: 1 (the first account registered).
    pub admin_id: u64,

    /// Collapse "unknown email" and "wrong password" into one
    /// [`InvalidCredentials`](crate::AuthError::InvalidCredentials) so
    /// login responses can't be used to probe which emails have accounts.
    ///
    /// Default: `false`, the blog's historical behavior.
    pub unify_login_errors: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            admin_id: 1,
            unify_login_errors: false,
        }
    }
}

impl AuthPolicy {
    pub fn admin_id(&self) -> UserId {
        UserId(self.admin_id)
    }
}

/// Everything [`AuthService`](crate::AuthService) can be tuned with.
///
/// Every section has sensible defaults; a config file only needs the
/// fields it wants to change:
///
/// ```json
/// { "session": { "ttl_secs": 3600 }, "policy": { "unify_login_errors": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub session: SessionConfig,
    pub password: PasswordConfig,
    pub policy: AuthPolicy,
}

impl QuillConfig {
    /// Parses a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
