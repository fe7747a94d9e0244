//! Integration tests for the Pivot Year journal.
//!
//! The tests in `tests/` exercise the full client data path - sign-in, the
//! entry store's snapshot merge, the one-time local-to-remote migration, and
//! debounced autosave - over the in-process backends, with no external
//! services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pivot-journal-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use pivot_journal::backend::{FsBackend, MemoryBackend};
use pivot_journal::{JournalApp, JournalConfig};

/// An app context over a throwaway filesystem backend.
pub struct FsJournal {
    pub dir: TempDir,
    pub app: JournalApp<FsBackend>,
}

/// An app context over the in-memory backend, with the backend handle
/// retained for snapshot injection and write counting.
pub struct MemoryJournal {
    pub dir: TempDir,
    pub backend: Arc<MemoryBackend>,
    pub app: JournalApp<MemoryBackend>,
}

/// Configuration rooted at `dir` with a test-friendly debounce.
#[must_use]
pub fn test_config(dir: &TempDir, debounce: Duration) -> JournalConfig {
    let mut config = JournalConfig::with_data_dir(dir.path());
    config.debounce = debounce;
    config
}

/// Fresh filesystem-backed journal in a temp directory.
///
/// # Panics
///
/// Panics if the temp directory or backend cannot be created.
#[must_use]
pub fn fs_journal(debounce: Duration) -> FsJournal {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = fs_app_at(&dir, debounce);
    FsJournal { dir, app }
}

/// Another app over the same directory, simulating a process restart.
///
/// # Panics
///
/// Panics if the backend cannot be opened.
#[must_use]
pub fn fs_app_at(dir: &TempDir, debounce: Duration) -> JournalApp<FsBackend> {
    let config = test_config(dir, debounce);
    let backend =
        Arc::new(FsBackend::open(config.data_dir.join(&config.app_id)).expect("open backend"));
    JournalApp::new(config, backend).expect("open app")
}

/// Fresh memory-backed journal in a temp directory.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn memory_journal(debounce: Duration) -> MemoryJournal {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(&dir, debounce);
    let backend = Arc::new(MemoryBackend::new());
    let app = JournalApp::new(config, Arc::clone(&backend)).expect("open app");
    MemoryJournal { dir, backend, app }
}

/// Let spawned tasks make progress without advancing paused time.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Poll `condition` until it holds or `timeout` elapses (real time).
///
/// # Panics
///
/// Panics when the timeout elapses first.
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
