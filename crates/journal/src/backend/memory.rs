//! In-memory backend for tests and local experimentation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use pivot_journal_core::{Day, Email, UserId, UserSession};

use super::password::{hash_password, verify_password};
use super::{AuthBackend, EntryBackend, EntryDoc, SUBSCRIPTION_BUFFER, SnapshotEvent};
use crate::error::SyncError;
use crate::services::auth::AuthError;

#[derive(Default)]
struct UserState {
    docs: BTreeMap<Day, EntryDoc>,
    subscribers: Vec<mpsc::Sender<SnapshotEvent>>,
}

struct Account {
    user_id: UserId,
    password_hash: String,
}

/// In-process implementation of [`EntryBackend`] and [`AuthBackend`].
///
/// Keeps every user's collection in memory and pushes a fresh snapshot to
/// subscribers after each committed write. Tests can inject write failures
/// with [`fail_writes`](Self::fail_writes) and simulate out-of-order remote
/// deliveries with [`push_snapshot`](Self::push_snapshot).
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<HashMap<UserId, UserState>>,
    accounts: Mutex<HashMap<Email, Account>>,
    fail_writes: AtomicBool,
    upserts: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with `SyncError::WriteFailed`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful single-document upserts.
    #[must_use]
    pub fn persisted_upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Number of successful batch commits.
    #[must_use]
    pub fn committed_batches(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Current documents for a user, in day order.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    #[must_use]
    pub fn docs(&self, user: &UserId) -> Vec<EntryDoc> {
        #[allow(clippy::unwrap_used)]
        let state = self.state.lock().unwrap();
        state
            .get(user)
            .map(|s| s.docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Push an arbitrary snapshot to the user's subscribers without touching
    /// the stored documents. Simulates a (possibly stale) remote delivery.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn push_snapshot(&self, user: &UserId, docs: Vec<EntryDoc>) {
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        notify(state.entry(user.clone()).or_default(), Ok(docs));
    }

    /// Push a subscription error to the user's subscribers.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn push_error(&self, user: &UserId, message: &str) {
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        notify(
            state.entry(user.clone()).or_default(),
            Err(SyncError::SubscriptionFailed(message.to_owned())),
        );
    }

    fn write_guard(&self) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(SyncError::WriteFailed("injected failure".to_owned()))
        } else {
            Ok(())
        }
    }
}

/// Deliver an event to every live subscriber.
///
/// A full buffer drops the event for that subscriber only; snapshots
/// supersede each other, so the next delivery catches it up.
fn notify(state: &mut UserState, event: SnapshotEvent) {
    state.subscribers.retain(|tx| {
        !matches!(
            tx.try_send(clone_event(&event)),
            Err(TrySendError::Closed(_))
        )
    });
}

fn clone_event(event: &SnapshotEvent) -> SnapshotEvent {
    match event {
        Ok(docs) => Ok(docs.clone()),
        Err(SyncError::SubscriptionFailed(m)) => Err(SyncError::SubscriptionFailed(m.clone())),
        Err(SyncError::WriteFailed(m)) => Err(SyncError::WriteFailed(m.clone())),
        Err(SyncError::MigrationFailed(m)) => Err(SyncError::MigrationFailed(m.clone())),
    }
}

impl EntryBackend for MemoryBackend {
    fn subscribe(&self, user: &UserId) -> mpsc::Receiver<SnapshotEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        let user_state = state.entry(user.clone()).or_default();
        let initial: Vec<EntryDoc> = user_state.docs.values().cloned().collect();
        // Initial snapshot; capacity is fresh, so this cannot fail.
        let _ = tx.try_send(Ok(initial));
        user_state.subscribers.push(tx);
        rx
    }

    async fn upsert(&self, user: &UserId, doc: EntryDoc) -> Result<(), SyncError> {
        self.write_guard()?;
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        let user_state = state.entry(user.clone()).or_default();
        user_state.docs.insert(doc.day, doc);
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let snapshot: Vec<EntryDoc> = user_state.docs.values().cloned().collect();
        notify(user_state, Ok(snapshot));
        Ok(())
    }

    async fn commit_batch(&self, user: &UserId, docs: Vec<EntryDoc>) -> Result<(), SyncError> {
        self.write_guard()?;
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        let user_state = state.entry(user.clone()).or_default();
        for doc in docs {
            user_state.docs.insert(doc.day, doc);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        let snapshot: Vec<EntryDoc> = user_state.docs.values().cloned().collect();
        notify(user_state, Ok(snapshot));
        Ok(())
    }
}

impl AuthBackend for MemoryBackend {
    async fn sign_in_anonymously(&self) -> Result<UserSession, AuthError> {
        Ok(UserSession::anonymous(UserId::random()))
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        #[allow(clippy::unwrap_used)]
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.get(email).ok_or(AuthError::UserNotFound)?;
        verify_password(password.expose_secret(), &account.password_hash)?;
        Ok(UserSession::registered(account.user_id.clone()))
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        #[allow(clippy::unwrap_used)]
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        let user_id = UserId::random();
        let password_hash = hash_password(password.expose_secret())?;
        accounts.insert(
            email.clone(),
            Account {
                user_id: user_id.clone(),
                password_hash,
            },
        );
        Ok(UserSession::registered(user_id))
    }
}
