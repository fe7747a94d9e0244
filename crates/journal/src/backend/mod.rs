//! Backend ports for the hosted services the journal depends on.
//!
//! The journal is a client: entries live in a per-user remote document
//! collection and identity comes from an auth service. Both are modeled as
//! traits here so the sync engine stays independent of any one vendor.
//! [`MemoryBackend`] is the in-process implementation used by tests;
//! [`FsBackend`] persists to local JSON files for development use.

mod fs;
mod memory;
mod password;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

use std::future::Future;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use pivot_journal_core::{Day, Email, UserId, UserSession};

use crate::error::SyncError;
use crate::services::auth::AuthError;

/// Capacity of a subscription channel.
///
/// Snapshots supersede each other, so a small buffer is enough; a slow
/// consumer drops intermediate snapshots rather than blocking the backend.
pub(crate) const SUBSCRIPTION_BUFFER: usize = 16;

/// A document in the user's `journal_entries` collection, keyed `day_<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDoc {
    /// Day this entry belongs to; the document identity.
    pub day: Day,
    /// Free-text entry body.
    pub text: String,
    /// Server-side timestamp of the last write.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl EntryDoc {
    /// Build a document stamped with the current time.
    #[must_use]
    pub fn now(day: Day, text: impl Into<String>) -> Self {
        Self {
            day,
            text: text.into(),
            updated_at: Utc::now(),
        }
    }

    /// The document key within the collection.
    #[must_use]
    pub fn doc_id(&self) -> String {
        format!("day_{}", self.day)
    }
}

/// One delivery on a live subscription: a full snapshot of the collection,
/// or a subscription error.
pub type SnapshotEvent = Result<Vec<EntryDoc>, SyncError>;

/// Port for the per-user remote document collection.
///
/// Reads are push-based: [`subscribe`](Self::subscribe) delivers an initial
/// snapshot and a fresh one after every committed write. Writes are
/// single-document upserts or an atomic multi-document batch.
pub trait EntryBackend: Send + Sync + 'static {
    /// Open a live subscription over the user's collection.
    ///
    /// The subscription is not cancellable mid-delivery; dropping the
    /// receiver ends it.
    fn subscribe(&self, user: &UserId) -> mpsc::Receiver<SnapshotEvent>;

    /// Create or replace the document for `doc.day`, preserving unrelated
    /// documents (merge semantics).
    fn upsert(
        &self,
        user: &UserId,
        doc: EntryDoc,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Commit a batch of upserts as one atomic write.
    ///
    /// Used by the local-cache migration; idempotent because documents are
    /// keyed by day.
    fn commit_batch(
        &self,
        user: &UserId,
        docs: Vec<EntryDoc>,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// Port for the hosted authentication service.
///
/// Input validation (email shape, password strength) happens in
/// [`AuthService`](crate::services::auth::AuthService) before these are
/// called; implementations only check credentials against their records.
pub trait AuthBackend: Send + Sync + 'static {
    /// Create a guest identity.
    fn sign_in_anonymously(&self) -> impl Future<Output = Result<UserSession, AuthError>> + Send;

    /// Sign in an existing email/password account.
    fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<UserSession, AuthError>> + Send;

    /// Create a new email/password account and sign it in.
    fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<UserSession, AuthError>> + Send;
}
