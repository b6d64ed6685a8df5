//! Authorization for Quill.
//!
//! Every protected operation declares an [`AuthorizationRequirement`].
//! [`authorize`] weighs it against the identity the session layer resolved
//! and returns a [`Decision`]. That's the whole gate: no I/O, no state, so
//! the policy table can be tested exhaustively.
//!
//! [`Rejection`] translates a denial into what the route layer should send
//! back: a redirect to the login page, or a plain 403.

mod decision;
mod rejection;
mod requirement;

pub use decision::{Decision, DenyReason, authorize};
pub use rejection::{LOGIN_PATH, Rejection};
pub use requirement::AuthorizationRequirement;
