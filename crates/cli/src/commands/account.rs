//! Account commands: guest, create, login, logout.

use secrecy::SecretString;
use tracing::info;

use pivot_journal::JournalConfig;
use pivot_journal::services::auth::AuthError;

use super::{build_app, clear_session, store_session};

/// Start an anonymous guest session and persist it.
///
/// # Errors
///
/// Returns an error if the backend cannot issue a guest identity or the
/// session cannot be persisted.
pub async fn guest(config: &JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_app(config)?;
    let session = app.auth().sign_in_anonymously().await.map_err(surface)?;
    store_session(config, &session)?;
    info!(user = %session.user_id, "guest session started");
    Ok(())
}

/// Create an email/password account, sign it in, and persist the session.
///
/// # Errors
///
/// Returns an error if the email is malformed, the password is too short, or
/// the email is already registered.
pub async fn create(
    config: &JournalConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_app(config)?;
    let session = app
        .auth()
        .create_account(email, &SecretString::from(password))
        .await
        .map_err(surface)?;
    store_session(config, &session)?;
    info!(user = %session.user_id, "account created and signed in");
    Ok(())
}

/// Sign in to an existing account and persist the session.
///
/// # Errors
///
/// Returns an error on unknown email or wrong password.
pub async fn login(
    config: &JournalConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_app(config)?;
    let session = app
        .auth()
        .sign_in_with_password(email, &SecretString::from(password))
        .await
        .map_err(surface)?;
    store_session(config, &session)?;
    info!(user = %session.user_id, "signed in");
    Ok(())
}

/// End the current session.
///
/// # Errors
///
/// Returns an error if the persisted session file cannot be removed.
pub fn logout(config: &JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    clear_session(config)?;
    info!("signed out");
    Ok(())
}

/// Convert an auth failure into its user-facing message.
fn surface(e: AuthError) -> Box<dyn std::error::Error> {
    e.user_message().into()
}
