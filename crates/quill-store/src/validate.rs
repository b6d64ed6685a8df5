//! Field rules for registration and login input.
//!
//! These mirror the identity table's columns: a name fits in 25
//! characters, an email in 50. Checks run before any lookup or hashing, so
//! malformed input never costs a store round-trip.

use std::fmt;

/// Longest display name the identity table holds.
pub const MAX_NAME_LEN: usize = 25;

/// Longest email the identity table holds.
pub const MAX_EMAIL_LEN: usize = 50;

/// Which input field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Password => write!(f, "password"),
        }
    }
}

/// A field that failed validation, with a short reason.
///
/// Never echoes the submitted value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidInput {
    pub field: Field,
    pub reason: &'static str,
}

impl InvalidInput {
    fn new(field: Field, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

/// Validates the fields of a registration form.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), InvalidInput> {
    if name.trim().is_empty() {
        return Err(InvalidInput::new(Field::Name, "is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(InvalidInput::new(Field::Name, "is too long"));
    }
    validate_login(email, password)
}

/// Validates the fields of a login form.
pub fn validate_login(email: &str, password: &str) -> Result<(), InvalidInput> {
    if email.trim().is_empty() {
        return Err(InvalidInput::new(Field::Email, "is required"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(InvalidInput::new(Field::Email, "is too long"));
    }
    if !looks_like_email(email) {
        return Err(InvalidInput::new(Field::Email, "is not an email address"));
    }
    if password.is_empty() {
        return Err(InvalidInput::new(Field::Password, "is required"));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace. Deliverability is not our
/// problem; this only catches obvious typos.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
