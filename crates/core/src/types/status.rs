//! Save status for the sync indicator.

use core::fmt;

use serde::{Deserialize, Serialize};

/// State of the autosave/sync machinery for the current editing session.
///
/// Scoped to the session, never persisted. Transitions:
///
/// - any state -> `Saving` on a text edit
/// - `Saving` -> `Saved` when the debounced write lands
/// - `Saving` -> `Error` when a write or the subscription fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// No pending edits; nothing written yet this session.
    #[default]
    Idle,
    /// An edit is buffered and a debounced write is pending or in flight.
    Saving,
    /// The most recent write completed successfully.
    Saved,
    /// The most recent write or the subscription failed.
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Error => "error",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SaveStatus::default(), SaveStatus::Idle);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&SaveStatus::Saving).unwrap(),
            "\"saving\""
        );
    }
}
