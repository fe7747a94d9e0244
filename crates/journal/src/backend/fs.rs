//! Filesystem backend for development use.
//!
//! Persists each user's collection as JSON files under
//! `<root>/users/<uid>/journal_entries/day_<n>.json` and accounts in
//! `<root>/users.json`, mirroring the path scoping of the hosted store
//! (application id, then user id, then collection). Subscribers get a
//! reloaded snapshot after every committed write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use pivot_journal_core::{Email, UserId, UserSession};

use super::password::{hash_password, verify_password};
use super::{AuthBackend, EntryBackend, EntryDoc, SUBSCRIPTION_BUFFER, SnapshotEvent};
use crate::error::SyncError;
use crate::services::auth::AuthError;

const ACCOUNTS_FILE: &str = "users.json";
const COLLECTION_DIR: &str = "journal_entries";

#[derive(Serialize, Deserialize)]
struct StoredAccount {
    user_id: UserId,
    password_hash: String,
}

/// JSON-file implementation of [`EntryBackend`] and [`AuthBackend`].
pub struct FsBackend {
    root: PathBuf,
    subscribers: Mutex<HashMap<UserId, Vec<mpsc::Sender<SnapshotEvent>>>>,
    // Serializes read-modify-write cycles on users.json.
    accounts_lock: Mutex<()>,
}

impl FsBackend {
    /// Open a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::SubscriptionFailed` if the root directory cannot
    /// be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| SyncError::SubscriptionFailed(format!("cannot create {root:?}: {e}")))?;
        Ok(Self {
            root,
            subscribers: Mutex::new(HashMap::new()),
            accounts_lock: Mutex::new(()),
        })
    }

    fn collection_dir(&self, user: &UserId) -> PathBuf {
        self.root
            .join("users")
            .join(user.as_str())
            .join(COLLECTION_DIR)
    }

    /// Load all documents of a user's collection, in day order.
    ///
    /// A missing directory is an empty collection. Files that fail to parse
    /// are skipped with a warning rather than failing the whole snapshot.
    fn load_collection(&self, user: &UserId) -> Result<Vec<EntryDoc>, SyncError> {
        let dir = self.collection_dir(user);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| SyncError::SubscriptionFailed(format!("cannot read {dir:?}: {e}")))?;

        let mut docs = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| SyncError::SubscriptionFailed(format!("cannot read {dir:?}: {e}")))?
                .path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_doc(&path) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(?path, error = %e, "skipping unreadable document");
                }
            }
        }
        docs.sort_by_key(|d| d.day);
        Ok(docs)
    }

    fn write_doc(&self, user: &UserId, doc: &EntryDoc) -> Result<(), SyncError> {
        let dir = self.collection_dir(user);
        fs::create_dir_all(&dir)
            .map_err(|e| SyncError::WriteFailed(format!("cannot create {dir:?}: {e}")))?;

        let path = dir.join(format!("{}.json", doc.doc_id()));
        let json = serde_json::to_vec_pretty(doc)
            .map_err(|e| SyncError::WriteFailed(format!("cannot encode document: {e}")))?;

        // Write-then-rename so a crash never leaves a torn document behind.
        let tmp = dir.join(format!(".{}.tmp", doc.doc_id()));
        fs::write(&tmp, json)
            .map_err(|e| SyncError::WriteFailed(format!("cannot write {tmp:?}: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| SyncError::WriteFailed(format!("cannot rename to {path:?}: {e}")))?;
        Ok(())
    }

    /// Push a freshly loaded snapshot to the user's subscribers.
    fn notify(&self, user: &UserId) {
        let event = self.load_collection(user);
        #[allow(clippy::unwrap_used)]
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(senders) = subscribers.get_mut(user) {
            senders.retain(|tx| {
                let cloned = match &event {
                    Ok(docs) => Ok(docs.clone()),
                    Err(e) => Err(SyncError::SubscriptionFailed(e.to_string())),
                };
                !matches!(tx.try_send(cloned), Err(TrySendError::Closed(_)))
            });
        }
    }

    fn accounts_path(&self) -> PathBuf {
        self.root.join(ACCOUNTS_FILE)
    }

    fn load_accounts(&self) -> Result<HashMap<String, StoredAccount>, AuthError> {
        let path = self.accounts_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(&path)
            .map_err(|e| AuthError::Unknown(format!("cannot read {path:?}: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::Unknown(format!("cannot parse {path:?}: {e}")))
    }

    fn store_accounts(&self, accounts: &HashMap<String, StoredAccount>) -> Result<(), AuthError> {
        let path = self.accounts_path();
        let json = serde_json::to_vec_pretty(accounts)
            .map_err(|e| AuthError::Unknown(format!("cannot encode accounts: {e}")))?;
        fs::write(&path, json)
            .map_err(|e| AuthError::Unknown(format!("cannot write {path:?}: {e}")))
    }
}

fn read_doc(path: &Path) -> Result<EntryDoc, SyncError> {
    let bytes = fs::read(path)
        .map_err(|e| SyncError::SubscriptionFailed(format!("cannot read {path:?}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| SyncError::SubscriptionFailed(format!("cannot parse {path:?}: {e}")))
}

impl EntryBackend for FsBackend {
    fn subscribe(&self, user: &UserId) -> mpsc::Receiver<SnapshotEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        // Initial snapshot; capacity is fresh, so try_send cannot be full.
        let _ = tx.try_send(self.load_collection(user));
        #[allow(clippy::unwrap_used)]
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.entry(user.clone()).or_default().push(tx);
        rx
    }

    async fn upsert(&self, user: &UserId, doc: EntryDoc) -> Result<(), SyncError> {
        self.write_doc(user, &doc)?;
        self.notify(user);
        Ok(())
    }

    async fn commit_batch(&self, user: &UserId, docs: Vec<EntryDoc>) -> Result<(), SyncError> {
        // Best-effort atomicity: each document lands via write-then-rename,
        // and subscribers only see the collection after the whole batch.
        for doc in &docs {
            self.write_doc(user, doc)?;
        }
        self.notify(user);
        Ok(())
    }
}

impl AuthBackend for FsBackend {
    async fn sign_in_anonymously(&self) -> Result<UserSession, AuthError> {
        Ok(UserSession::anonymous(UserId::random()))
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        #[allow(clippy::unwrap_used)]
        let _guard = self.accounts_lock.lock().unwrap();
        let accounts = self.load_accounts()?;
        let account = accounts.get(email.as_str()).ok_or(AuthError::UserNotFound)?;
        verify_password(password.expose_secret(), &account.password_hash)?;
        Ok(UserSession::registered(account.user_id.clone()))
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, AuthError> {
        #[allow(clippy::unwrap_used)]
        let _guard = self.accounts_lock.lock().unwrap();
        let mut accounts = self.load_accounts()?;
        if accounts.contains_key(email.as_str()) {
            return Err(AuthError::EmailInUse);
        }
        let user_id = UserId::random();
        let password_hash = hash_password(password.expose_secret())?;
        accounts.insert(
            email.as_str().to_owned(),
            StoredAccount {
                user_id: user_id.clone(),
                password_hash,
            },
        );
        self.store_accounts(&accounts)?;
        Ok(UserSession::registered(user_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pivot_journal_core::Day;

    fn day(n: u16) -> Day {
        Day::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let user = UserId::from("u1");

        backend
            .upsert(&user, EntryDoc::now(day(12), "hello"))
            .await
            .unwrap();

        let docs = backend.load_collection(&user).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].day, day(12));
        assert_eq!(docs[0].text, "hello");
    }

    #[tokio::test]
    async fn test_documents_are_keyed_by_day() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let user = UserId::from("u1");

        backend
            .upsert(&user, EntryDoc::now(day(1), "old"))
            .await
            .unwrap();
        backend
            .upsert(&user, EntryDoc::now(day(1), "new"))
            .await
            .unwrap();

        let docs = backend.load_collection(&user).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "new");

        let path = dir
            .path()
            .join("users/u1/journal_entries")
            .join("day_1.json");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_subscription_sees_writes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let user = UserId::from("u1");

        let mut rx = backend.subscribe(&user);
        assert!(rx.recv().await.unwrap().unwrap().is_empty());

        backend
            .upsert(&user, EntryDoc::now(day(2), "written"))
            .await
            .unwrap();
        let snapshot = rx.recv().await.unwrap().unwrap();
        assert_eq!(snapshot[0].text, "written");
    }

    #[tokio::test]
    async fn test_collections_are_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        backend
            .upsert(&alice, EntryDoc::now(day(1), "alice's entry"))
            .await
            .unwrap();

        assert!(backend.load_collection(&bob).unwrap().is_empty());
        assert_eq!(backend.load_collection(&alice).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        let user = UserId::from("u1");

        backend
            .upsert(&user, EntryDoc::now(day(1), "good"))
            .await
            .unwrap();
        let collection = dir.path().join("users/u1/journal_entries");
        fs::write(collection.join("day_2.json"), b"{ not json").unwrap();

        let docs = backend.load_collection(&user).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "good");
    }

    #[tokio::test]
    async fn test_accounts_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let email = Email::parse("user@example.com").unwrap();
        let password = SecretString::from("hunter22");

        let created = {
            let backend = FsBackend::open(dir.path()).unwrap();
            backend.create_account(&email, &password).await.unwrap()
        };

        let backend = FsBackend::open(dir.path()).unwrap();
        let signed_in = backend
            .sign_in_with_password(&email, &password)
            .await
            .unwrap();
        assert_eq!(signed_in.user_id, created.user_id);
    }
}
