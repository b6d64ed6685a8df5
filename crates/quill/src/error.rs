//! Unified error type for the Quill auth core.

use quill_gate::{DenyReason, Rejection};
use quill_password::PasswordError;
use quill_store::{InvalidInput, StoreError};

/// Everything the auth core can report to the route layer.
///
/// Every variant except [`StoreUnavailable`](Self::StoreUnavailable) and
/// [`Password`](Self::Password) is an ordinary user-facing outcome: show
/// [`user_message`](Self::user_message) as a flash message, or redirect.
/// None of the messages contain a password, a hash, or a session token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Registration with an email that already has an account.
    #[error("email already registered")]
    DuplicateEmail,

    /// Login with an email nobody registered.
    #[error("user not found")]
    UserNotFound,

    /// Login with the right email but the wrong password.
    #[error("wrong password")]
    WrongPassword,

    /// Login failed, and policy says not to tell the user why.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A form field failed validation.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// The operation requires a logged-in identity.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The logged-in identity lacks the privilege the operation requires.
    #[error("forbidden")]
    Forbidden,

    /// The credential store could not be reached or read.
    #[error("credential store unavailable")]
    StoreUnavailable(#[source] StoreError),

    /// Password hashing failed (misconfiguration or a crashed worker).
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl AuthError {
    /// `true` if the route layer should answer with a flash message or a
    /// redirect; `false` if this is a server failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_) | Self::Password(_))
    }

    /// Text suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateEmail => "Email already registered".to_string(),
            Self::UserNotFound => {
                "User not found, please check what you wrote".to_string()
            }
            Self::WrongPassword => "Wrong Password".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::InvalidInput(e) => {
                let mut field = e.field.to_string();
                if let Some(first) = field.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                format!("{field} {}", e.reason)
            }
            Self::NotAuthenticated => "Please log in to continue".to_string(),
            Self::Forbidden => "You don't have access to this page".to_string(),
            Self::StoreUnavailable(_) | Self::Password(_) => {
                "Something went wrong, please try again later".to_string()
            }
        }
    }

    /// The route response for a gate denial, if this error is one.
    pub fn rejection(&self, path: Option<&str>) -> Option<Rejection> {
        match self {
            Self::NotAuthenticated => {
                Some(Rejection::for_denial(DenyReason::NotAuthenticated, path))
            }
            Self::Forbidden => Some(Rejection::for_denial(DenyReason::Forbidden, path)),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            other => Self::StoreUnavailable(other),
        }
    }
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotAuthenticated => Self::NotAuthenticated,
            DenyReason::Forbidden => Self::Forbidden,
        }
    }
}
