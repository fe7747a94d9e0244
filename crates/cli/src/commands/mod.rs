//! CLI command implementations.

pub mod account;
pub mod entry;
pub mod export;
pub mod prompt;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pivot_journal::backend::FsBackend;
use pivot_journal::{JournalApp, JournalConfig};
use pivot_journal_core::UserSession;

/// File holding the persisted session between CLI invocations.
const SESSION_FILE: &str = "session.json";

/// How long to let the initial snapshot (and any pending migration) land
/// after opening a session, before reading or exporting.
const SNAPSHOT_GRACE: Duration = Duration::from_millis(200);

fn session_path(config: &JournalConfig) -> PathBuf {
    config.data_dir.join(SESSION_FILE)
}

/// The session persisted by the last `account` command, if any.
pub fn load_session(config: &JournalConfig) -> Option<UserSession> {
    let bytes = fs::read(session_path(config)).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "persisted session is unreadable, ignoring");
            None
        }
    }
}

/// Persist the session for later invocations.
pub fn store_session(
    config: &JournalConfig,
    session: &UserSession,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(&config.data_dir)?;
    fs::write(session_path(config), serde_json::to_vec_pretty(session)?)?;
    Ok(())
}

/// Forget the persisted session.
pub fn clear_session(config: &JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    match fs::remove_file(session_path(config)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Build the app context over the filesystem backend.
///
/// The collection root is scoped by app id, mirroring the remote layout.
pub fn build_app(config: &JournalConfig) -> Result<JournalApp<FsBackend>, Box<dyn std::error::Error>> {
    let root = config.data_dir.join(&config.app_id);
    let backend = Arc::new(FsBackend::open(root)?);
    Ok(JournalApp::new(config.clone(), backend)?)
}

/// Build the app context and, if a session is persisted, resume it and open
/// an editing session. Returns whether a session is open.
pub async fn build_app_with_session(
    config: &JournalConfig,
) -> Result<(JournalApp<FsBackend>, bool), Box<dyn std::error::Error>> {
    let mut app = build_app(config)?;
    let Some(session) = load_session(config) else {
        return Ok((app, false));
    };

    app.auth().resume(session);
    app.open_session()?;
    // Let the initial snapshot merge (and any pending migration) complete.
    tokio::time::sleep(SNAPSHOT_GRACE).await;
    Ok((app, true))
}
