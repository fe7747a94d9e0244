//! Synchronization error types.
//!
//! Sync failures never crash the application: they set the save-status
//! indicator and are logged, and the app degrades to a visibly stale state.

use thiserror::Error;

/// Errors that can occur while synchronizing entries with the backend.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The live subscription over the user's collection failed.
    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),

    /// A single-document upsert failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The local-to-remote migration batch failed to commit.
    #[error("migration failed: {0}")]
    MigrationFailed(String),
}
