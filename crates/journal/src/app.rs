//! The client context.
//!
//! [`JournalApp`] is the explicitly constructed object tying a backend, the
//! identity provider, the local cache, and (while signed in) one active
//! editing session together. No ambient singletons: everything the sync
//! engine needs is passed in at construction and torn down at close.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use pivot_journal_core::{Day, SaveStatus, catalog};

use crate::autosave::AutosaveController;
use crate::backend::{AuthBackend, EntryBackend};
use crate::cache::{CacheError, LocalCache};
use crate::config::JournalConfig;
use crate::export::render_export;
use crate::services::auth::AuthService;
use crate::store::EntryStore;

/// Errors from session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session operation needs a signed-in user.
    #[error("no signed-in user")]
    NotSignedIn,
    /// The local cache could not be opened or written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// One signed-in editing session.
struct ActiveSession<B> {
    store: Arc<EntryStore<B>>,
    autosave: AutosaveController<B>,
    listener: JoinHandle<()>,
    status: watch::Receiver<SaveStatus>,
    current_day: Day,
}

impl<B> Drop for ActiveSession<B> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// The journal client context.
///
/// Owns the auth provider and at most one [`ActiveSession`]. The typical
/// lifecycle: construct, sign in through [`auth`](Self::auth), call
/// [`open_session`](Self::open_session), edit, then
/// [`sign_out`](Self::sign_out).
pub struct JournalApp<B> {
    config: JournalConfig,
    backend: Arc<B>,
    auth: AuthService<B>,
    cache: LocalCache,
    session: Option<ActiveSession<B>>,
}

impl<B: EntryBackend + AuthBackend> JournalApp<B> {
    /// Construct the context over a backend.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Cache` if the local cache directory cannot be
    /// created.
    pub fn new(config: JournalConfig, backend: Arc<B>) -> Result<Self, SessionError> {
        let cache = LocalCache::open(&config.data_dir)?;
        let auth = AuthService::new(Arc::clone(&backend));
        Ok(Self {
            config,
            backend,
            auth,
            cache,
            session: None,
        })
    }

    /// The session/identity provider.
    #[must_use]
    pub const fn auth(&self) -> &AuthService<B> {
        &self.auth
    }

    /// The device-local cache (pre-auth scratch storage).
    #[must_use]
    pub const fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Open an editing session for the signed-in user.
    ///
    /// Subscribes over the user's collection, starts the listener task, and
    /// restores the last-viewed day. Idempotent per sign-in: an existing
    /// session is replaced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` without a current user.
    pub fn open_session(&mut self) -> Result<(), SessionError> {
        let user = self
            .auth
            .current_user()
            .ok_or(SessionError::NotSignedIn)?;

        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let status_tx = Arc::new(status_tx);

        let store = Arc::new(EntryStore::new(
            Arc::clone(&self.backend),
            user.user_id,
            self.cache.clone(),
            Arc::clone(&status_tx),
        ));
        let listener = store.spawn_listener();

        let autosave = AutosaveController::new(
            Arc::clone(&self.backend),
            store.entries_handle(),
            status_tx,
            self.auth.watch_auth(),
            self.config.debounce,
        );

        let current_day = self.cache.last_day().unwrap_or(Day::FIRST);

        self.session = Some(ActiveSession {
            store,
            autosave,
            listener,
            status,
            current_day,
        });
        Ok(())
    }

    /// Close the active session, cancelling pending autosave writes.
    pub fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.autosave.cancel_all();
            session.listener.abort();
        }
    }

    /// Sign out and close the session.
    pub fn sign_out(&mut self) {
        self.close_session();
        self.auth.sign_out();
    }

    /// Whether an editing session is open.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The currently viewed day.
    #[must_use]
    pub fn current_day(&self) -> Day {
        self.session
            .as_ref()
            .map_or(Day::FIRST, |s| s.current_day)
    }

    /// Navigate to a day.
    ///
    /// Out-of-range values (0, 366, ...) leave the current day unchanged.
    /// Returns whether navigation happened; the new position is persisted
    /// for the next session.
    pub fn change_day(&mut self, day: u16) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Ok(day) = Day::new(day) else {
            return false;
        };

        session.current_day = day;
        if let Err(e) = self.cache.set_last_day(day) {
            tracing::warn!(error = %e, "cannot persist last viewed day");
        }
        true
    }

    /// Edit the entry for the currently viewed day.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` without an open session.
    pub fn edit_current(&self, text: &str) -> Result<(), SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotSignedIn)?;
        session.autosave.edit(session.current_day, text);
        Ok(())
    }

    /// Current save status for the session.
    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.session
            .as_ref()
            .map_or(SaveStatus::Idle, |s| *s.status.borrow())
    }

    /// Snapshot of the entries mapping.
    ///
    /// With no session open this falls back to the local cache, so a
    /// signed-out export still sees scratch entries.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<Day, String> {
        self.session.as_ref().map_or_else(
            || self.cache.entries().unwrap_or_default(),
            |s| s.store.entries(),
        )
    }

    /// The entry text for one day, if present.
    #[must_use]
    pub fn entry(&self, day: Day) -> Option<String> {
        self.entries().get(&day).cloned()
    }

    /// Render the journal as plain text.
    #[must_use]
    pub fn export(&self) -> String {
        render_export(catalog(), &self.entries())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    async fn signed_in_app() -> (JournalApp<MemoryBackend>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::with_data_dir(dir.path());
        let mut app = JournalApp::new(config, Arc::new(MemoryBackend::new())).unwrap();
        app.auth().sign_in_anonymously().await.unwrap();
        app.open_session().unwrap();
        (app, dir)
    }

    #[tokio::test]
    async fn test_open_session_requires_user() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::with_data_dir(dir.path());
        let mut app = JournalApp::new(config, Arc::new(MemoryBackend::new())).unwrap();
        assert!(matches!(
            app.open_session(),
            Err(SessionError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_navigation_bounds() {
        let (mut app, _dir) = signed_in_app().await;
        assert_eq!(app.current_day(), Day::FIRST);

        assert!(app.change_day(42));
        assert_eq!(app.current_day().get(), 42);

        // Day 0 and day 366 leave the position unchanged.
        assert!(!app.change_day(0));
        assert_eq!(app.current_day().get(), 42);
        assert!(!app.change_day(366));
        assert_eq!(app.current_day().get(), 42);
    }

    #[tokio::test]
    async fn test_last_day_restored_on_next_session() {
        let (mut app, _dir) = signed_in_app().await;
        app.change_day(77);
        app.close_session();

        app.open_session().unwrap();
        assert_eq!(app.current_day().get(), 77);
    }

    #[tokio::test]
    async fn test_edit_current_is_optimistic() {
        let (mut app, _dir) = signed_in_app().await;
        app.change_day(5);
        app.edit_current("immediately visible").unwrap();

        assert_eq!(
            app.entry(Day::new(5).unwrap()).as_deref(),
            Some("immediately visible")
        );
        assert_eq!(app.save_status(), SaveStatus::Saving);
    }

    #[tokio::test]
    async fn test_edit_without_session_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::with_data_dir(dir.path());
        let app = JournalApp::new(config, Arc::new(MemoryBackend::new())).unwrap();
        assert!(app.edit_current("nope").is_err());
    }

    #[tokio::test]
    async fn test_signed_out_export_sees_scratch_entries() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::with_data_dir(dir.path());
        let app = JournalApp::new(config, Arc::new(MemoryBackend::new())).unwrap();
        app.cache()
            .set_entry(Day::new(1).unwrap(), "scratch")
            .unwrap();

        let exported = app.export();
        assert!(exported.contains("My Entry:\nscratch\n"));
    }

    #[tokio::test]
    async fn test_sign_out_closes_session() {
        let (mut app, _dir) = signed_in_app().await;
        assert!(app.has_session());

        app.sign_out();
        assert!(!app.has_session());
        assert!(app.auth().current_user().is_none());
        assert_eq!(app.save_status(), SaveStatus::Idle);
    }
}
