//! Debounced autosave.
//!
//! Every text edit lands in the in-memory mapping immediately (optimistic,
//! pre-persist) and schedules a write for after a quiet period. Rescheduling
//! cancels and replaces the previous task for that day; only the most recent
//! pending write per day ever executes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use pivot_journal_core::{Day, SaveStatus, UserSession};

use crate::backend::{EntryBackend, EntryDoc};

/// Debounced persistence of entry edits, one pending write per day.
///
/// The scheduled write captures the day and text at edit time, so switching
/// the viewed day before the timer fires still writes to the day the edit
/// was made on.
pub struct AutosaveController<B> {
    backend: Arc<B>,
    entries: Arc<Mutex<BTreeMap<Day, String>>>,
    status: Arc<watch::Sender<SaveStatus>>,
    auth: watch::Receiver<Option<UserSession>>,
    pending: Mutex<HashMap<Day, JoinHandle<()>>>,
    debounce: Duration,
}

impl<B: EntryBackend> AutosaveController<B> {
    /// Create a controller writing through `backend` into the shared mapping.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        entries: Arc<Mutex<BTreeMap<Day, String>>>,
        status: Arc<watch::Sender<SaveStatus>>,
        auth: watch::Receiver<Option<UserSession>>,
        debounce: Duration,
    ) -> Self {
        Self {
            backend,
            entries,
            status,
            auth,
            pending: Mutex::new(HashMap::new()),
            debounce,
        }
    }

    /// Record a text edit for `day`.
    ///
    /// Applies the edit to the in-memory mapping immediately, moves the
    /// status to `Saving`, and (re)schedules the debounced write. Any
    /// earlier pending write for the same day is cancelled and superseded.
    ///
    /// # Panics
    ///
    /// Panics if the entries or pending mutex is poisoned.
    pub fn edit(&self, day: Day, text: impl Into<String>) {
        let text = text.into();

        {
            #[allow(clippy::unwrap_used)]
            let mut entries = self.entries.lock().unwrap();
            entries.insert(day, text.clone());
        }
        self.status.send_replace(SaveStatus::Saving);

        let task = tokio::spawn(flush(
            Arc::clone(&self.backend),
            self.auth.clone(),
            Arc::clone(&self.status),
            day,
            text,
            self.debounce,
        ));

        #[allow(clippy::unwrap_used)]
        let mut pending = self.pending.lock().unwrap();
        if let Some(previous) = pending.insert(day, task) {
            previous.abort();
        }
    }

    /// Cancel every pending write without firing it.
    ///
    /// Session close cancels rather than flushes; an edit inside the
    /// debounce window at close time is lost, matching the app's observed
    /// behavior.
    ///
    /// # Panics
    ///
    /// Panics if the pending mutex is poisoned.
    pub fn cancel_all(&self) {
        #[allow(clippy::unwrap_used)]
        let mut pending = self.pending.lock().unwrap();
        for (_, task) in pending.drain() {
            task.abort();
        }
    }
}

impl<B> Drop for AutosaveController<B> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, task) in pending.drain() {
                task.abort();
            }
        }
    }
}

/// The scheduled write: wait out the quiet period, then persist.
async fn flush<B: EntryBackend>(
    backend: Arc<B>,
    auth: watch::Receiver<Option<UserSession>>,
    status: Arc<watch::Sender<SaveStatus>>,
    day: Day,
    text: String,
    debounce: Duration,
) {
    tokio::time::sleep(debounce).await;

    // No user at fire time: keep the edit in memory only.
    let Some(user) = auth.borrow().as_ref().map(|s| s.user_id.clone()) else {
        return;
    };

    match backend.upsert(&user, EntryDoc::now(day, text)).await {
        Ok(()) => {
            status.send_replace(SaveStatus::Saved);
        }
        Err(e) => {
            tracing::error!(%user, %day, error = %e, "entry save failed");
            status.send_replace(SaveStatus::Error);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use pivot_journal_core::UserId;

    fn day(n: u16) -> Day {
        Day::new(n).unwrap()
    }

    struct Fixture {
        backend: Arc<MemoryBackend>,
        controller: AutosaveController<MemoryBackend>,
        status: watch::Receiver<SaveStatus>,
        auth_tx: watch::Sender<Option<UserSession>>,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let (auth_tx, auth_rx) =
            watch::channel(Some(UserSession::anonymous(UserId::from("u1"))));
        let controller = AutosaveController::new(
            Arc::clone(&backend),
            Arc::new(Mutex::new(BTreeMap::new())),
            Arc::new(status_tx),
            auth_rx,
            Duration::from_millis(1500),
        );
        Fixture {
            backend,
            controller,
            status,
            auth_tx,
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimistic_write_is_immediate() {
        let f = fixture();
        f.controller.edit(day(3), "draft");

        // Visible before any persistence happened.
        let entries = f.controller.entries.lock().unwrap().clone();
        assert_eq!(entries.get(&day(3)).map(String::as_str), Some("draft"));
        assert_eq!(f.backend.persisted_upserts(), 0);
        assert_eq!(*f.status.borrow(), SaveStatus::Saving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_rapid_edits() {
        let f = fixture();

        f.controller.edit(day(1), "h");
        settle().await;
        tokio::time::advance(Duration::from_millis(500)).await;

        f.controller.edit(day(1), "he");
        settle().await;
        tokio::time::advance(Duration::from_millis(500)).await;

        f.controller.edit(day(1), "hello");
        settle().await;
        tokio::time::advance(Duration::from_millis(1501)).await;
        settle().await;

        assert_eq!(f.backend.persisted_upserts(), 1);
        let docs = f.backend.docs(&UserId::from("u1"));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "hello");
        assert_eq!(*f.status.borrow(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_days_save_independently() {
        let f = fixture();
        f.controller.edit(day(1), "one");
        f.controller.edit(day(2), "two");
        settle().await;
        tokio::time::advance(Duration::from_millis(1501)).await;
        settle().await;

        assert_eq!(f.backend.persisted_upserts(), 2);
        let docs = f.backend.docs(&UserId::from("u1"));
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_waits_out_the_quiet_period() {
        let f = fixture();
        f.controller.edit(day(1), "early");
        settle().await;
        tokio::time::advance(Duration::from_millis(1400)).await;
        settle().await;

        assert_eq!(f.backend.persisted_upserts(), 0);

        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(f.backend.persisted_upserts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_user_at_fire_time_skips_save() {
        let f = fixture();
        f.controller.edit(day(1), "kept locally");
        f.auth_tx.send_replace(None);
        settle().await;
        tokio::time::advance(Duration::from_millis(1501)).await;
        settle().await;

        assert_eq!(f.backend.persisted_upserts(), 0);
        // The edit is retained in memory only.
        let entries = f.controller.entries.lock().unwrap().clone();
        assert_eq!(
            entries.get(&day(1)).map(String::as_str),
            Some("kept locally")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_sets_error_and_next_edit_retries() {
        let f = fixture();
        f.backend.fail_writes(true);
        f.controller.edit(day(1), "attempt");
        settle().await;
        tokio::time::advance(Duration::from_millis(1501)).await;
        settle().await;

        assert_eq!(*f.status.borrow(), SaveStatus::Error);
        assert_eq!(f.backend.persisted_upserts(), 0);

        f.backend.fail_writes(false);
        f.controller.edit(day(1), "attempt again");
        settle().await;
        tokio::time::advance(Duration::from_millis(1501)).await;
        settle().await;

        assert_eq!(*f.status.borrow(), SaveStatus::Saved);
        assert_eq!(f.backend.persisted_upserts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending_writes() {
        let f = fixture();
        f.controller.edit(day(1), "never persisted");
        settle().await;
        f.controller.cancel_all();
        tokio::time::advance(Duration::from_millis(2000)).await;
        settle().await;

        assert_eq!(f.backend.persisted_upserts(), 0);
    }
}
