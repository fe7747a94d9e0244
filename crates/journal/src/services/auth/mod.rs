//! Session/identity provider.
//!
//! Wraps an [`AuthBackend`] and owns the current-session state. Consumers
//! observe login/logout transitions through a `watch` channel, including the
//! initial resolution to "no user".

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;

use pivot_journal_core::{Email, UserSession};

use crate::backend::AuthBackend;

/// Minimum password length (the hosted service's rule).
const MIN_PASSWORD_LENGTH: usize = 6;

/// Session/identity provider over an auth backend.
///
/// Validates input at the edge (email shape, password strength) and keeps
/// the current [`UserSession`] in a `watch` channel so the entry store and
/// autosave controller can scope themselves to it.
pub struct AuthService<B> {
    backend: Arc<B>,
    current: watch::Sender<Option<UserSession>>,
}

impl<B: AuthBackend> AuthService<B> {
    /// Create a provider with no signed-in user.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        let (current, _) = watch::channel(None);
        Self { backend, current }
    }

    /// The currently signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserSession> {
        self.current.borrow().clone()
    }

    /// Observe auth state changes.
    ///
    /// The receiver sees every login/logout transition; its initial value is
    /// the state at subscription time.
    #[must_use]
    pub fn watch_auth(&self) -> watch::Receiver<Option<UserSession>> {
        self.current.subscribe()
    }

    /// Sign in as an anonymous guest.
    ///
    /// # Errors
    ///
    /// Returns whatever the backend reports; guests have no credentials to
    /// reject, so failures are infrastructure-level.
    pub async fn sign_in_anonymously(&self) -> Result<UserSession, AuthError> {
        let session = self.backend.sign_in_anonymously().await?;
        tracing::info!(user = %session.user_id, "signed in anonymously");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed,
    /// `AuthError::UserNotFound` or `AuthError::WrongPassword` on bad
    /// credentials.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        let email = Email::parse(email)?;
        let session = self.backend.sign_in_with_password(&email, password).await?;
        tracing::info!(user = %session.user_id, "signed in with password");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Create a new email/password account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed,
    /// `AuthError::WeakPassword` if the password is under 6 characters,
    /// `AuthError::EmailInUse` if an account already exists.
    pub async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let session = self.backend.create_account(&email, password).await?;
        tracing::info!(user = %session.user_id, "account created");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Restore a previously persisted session without re-authenticating.
    ///
    /// The hosted provider keeps auth state on the device between launches;
    /// this is the equivalent for embedders that persist the session
    /// themselves.
    pub fn resume(&self, session: UserSession) {
        tracing::info!(user = %session.user_id, "session resumed");
        self.current.send_replace(Some(session));
    }

    /// Sign out the current user.
    ///
    /// All entry store activity for the session must stop; the app context
    /// closes the session on this transition.
    pub fn sign_out(&self) {
        if let Some(session) = self.current.send_replace(None) {
            tracing::info!(user = %session.user_id, "signed out");
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    use secrecy::ExposeSecret;

    if password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
