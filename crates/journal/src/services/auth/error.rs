//! Authentication error types.

use thiserror::Error;

use pivot_journal_core::EmailError;

/// Errors that can occur during authentication operations.
///
/// Auth errors are caught at the call site and rendered as a user-facing
/// message; they never take the application down.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// Password does not match the account.
    #[error("wrong password")]
    WrongPassword,

    /// An account already exists for the email.
    #[error("email already in use")]
    EmailInUse,

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Anything else the auth service reports.
    #[error("auth error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// The message shown to the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Invalid email address.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongPassword => "Incorrect password.",
            Self::EmailInUse => "Email already in use.",
            Self::WeakPassword(_) => "Password should be at least 6 characters.",
            Self::Unknown(_) => "Authentication failed.",
        }
    }
}
