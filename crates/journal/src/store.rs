//! The entry store.
//!
//! Maintains the authoritative day-to-text mapping for the signed-in user,
//! kept live by a backend subscription, and owns the one-time migration of
//! device-local entries into the remote collection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use pivot_journal_core::{Day, SaveStatus, UserId};

use crate::backend::{EntryBackend, EntryDoc, SnapshotEvent};
use crate::cache::LocalCache;

/// Per-session entry store for one user.
///
/// The in-memory mapping is shared with the autosave controller (optimistic
/// writes land here first) and updated from subscription snapshots on a
/// single listener task. Snapshot delivery is not guaranteed monotonic
/// relative to optimistic writes; a stale snapshot can transiently win until
/// the pending debounced write lands. Accepted eventual-consistency window
/// under the single-writer-per-user assumption.
pub struct EntryStore<B> {
    backend: Arc<B>,
    user: UserId,
    entries: Arc<Mutex<BTreeMap<Day, String>>>,
    status: Arc<watch::Sender<SaveStatus>>,
    cache: LocalCache,
    migrating: AtomicBool,
}

impl<B: EntryBackend> EntryStore<B> {
    /// Create a store for `user`, scoped to one session.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        user: UserId,
        cache: LocalCache,
        status: Arc<watch::Sender<SaveStatus>>,
    ) -> Self {
        Self {
            backend,
            user,
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            status,
            cache,
            migrating: AtomicBool::new(false),
        }
    }

    /// Shared handle on the in-memory mapping, for the autosave controller.
    #[must_use]
    pub fn entries_handle(&self) -> Arc<Mutex<BTreeMap<Day, String>>> {
        Arc::clone(&self.entries)
    }

    /// Snapshot of the current mapping.
    ///
    /// # Panics
    ///
    /// Panics if the entries mutex is poisoned.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<Day, String> {
        #[allow(clippy::unwrap_used)]
        self.entries.lock().unwrap().clone()
    }

    /// The text for one day, if present.
    ///
    /// # Panics
    ///
    /// Panics if the entries mutex is poisoned.
    #[must_use]
    pub fn entry(&self, day: Day) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        self.entries.lock().unwrap().get(&day).cloned()
    }

    /// Open the subscription and consume it on a background task.
    ///
    /// Each snapshot is merged and then re-evaluates the migration trigger;
    /// a subscription error degrades the status to `Error` and leaves the
    /// mapping unchanged. The task ends when the backend drops the channel
    /// or the handle is aborted at session close.
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.backend.subscribe(&self.user);
        let store = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                store.handle_event(event).await;
            }
            tracing::debug!(user = %store.user, "subscription channel closed");
        })
    }

    /// Process one subscription delivery.
    pub async fn handle_event(&self, event: SnapshotEvent) {
        match event {
            Ok(docs) => {
                self.apply_snapshot(docs);
                self.migrate_if_needed().await;
            }
            Err(e) => {
                tracing::error!(user = %self.user, error = %e, "subscription error");
                self.status.send_replace(SaveStatus::Error);
            }
        }
    }

    /// Merge a snapshot into the in-memory mapping.
    ///
    /// Documents with empty text are ignored (shape check). If the snapshot
    /// yields zero entries and a local cache exists, the mapping becomes the
    /// cache contents wholesale: first-run bootstrap, remote is empty so
    /// local is authoritative. Otherwise the mapping is the union of the
    /// previous state and the snapshot, snapshot winning per key.
    pub fn apply_snapshot(&self, docs: Vec<EntryDoc>) {
        let loaded: BTreeMap<Day, String> = docs
            .into_iter()
            .filter(|doc| !doc.text.is_empty())
            .map(|doc| (doc.day, doc.text))
            .collect();

        #[allow(clippy::unwrap_used)]
        let mut entries = self.entries.lock().unwrap();
        if loaded.is_empty() {
            if let Some(local) = self.cache.entries() {
                tracing::debug!(
                    user = %self.user,
                    count = local.len(),
                    "remote empty, bootstrapping from local cache"
                );
                *entries = local;
                return;
            }
        }
        entries.extend(loaded);
    }

    /// Run the local-to-remote migration if its trigger holds.
    ///
    /// Trigger: a local cache is present and the in-memory mapping is
    /// non-empty (at least one snapshot round-trip has completed). The cache
    /// is deleted only after the batch commit is confirmed; on failure it is
    /// kept for the next trigger re-evaluation. At-least-once delivery is
    /// fine here since the batch is an idempotent upsert keyed by day.
    pub async fn migrate_if_needed(&self) {
        if !self.cache.has_entries() || self.is_empty() {
            return;
        }

        // One migration in flight at a time.
        if self
            .migrating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.migrate().await;
        self.migrating.store(false, Ordering::SeqCst);
    }

    async fn migrate(&self) {
        let Some(local) = self.cache.entries() else {
            return;
        };
        if local.is_empty() {
            // Nothing to commit; the empty cache object stays in place.
            return;
        }

        let docs: Vec<EntryDoc> = local
            .into_iter()
            .map(|(day, text)| EntryDoc::now(day, text))
            .collect();
        let count = docs.len();

        match self.backend.commit_batch(&self.user, docs).await {
            Ok(()) => {
                tracing::info!(user = %self.user, count, "migration complete, clearing local cache");
                if let Err(e) = self.cache.clear_entries() {
                    tracing::error!(user = %self.user, error = %e, "cannot clear migrated cache");
                }
            }
            Err(e) => {
                // Keep the cache: never delete the source before the copy is
                // confirmed. The next snapshot re-evaluates the trigger.
                tracing::error!(user = %self.user, error = %e, "migration failed");
            }
        }
    }

    fn is_empty(&self) -> bool {
        #[allow(clippy::unwrap_used)]
        self.entries.lock().unwrap().is_empty()
    }
}
