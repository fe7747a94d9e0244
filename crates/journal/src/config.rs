//! Journal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PIVOT_DATA_DIR` - Directory for local data (default: `data`)
//! - `PIVOT_APP_ID` - Application id scoping the remote collection path
//!   (default: `pivot-year`)
//! - `PIVOT_DEBOUNCE_MS` - Autosave quiet period in milliseconds
//!   (default: `1500`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default autosave debounce window.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Journal application configuration.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Directory holding the local cache, the persisted CLI session, and the
    /// filesystem backend's data.
    pub data_dir: PathBuf,
    /// Application id; the remote collection is path-scoped by app id and
    /// user id.
    pub app_id: String,
    /// Quiet period after the last keystroke before the autosave write fires.
    pub debounce: Duration,
}

impl JournalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("PIVOT_DATA_DIR", "data"));
        let app_id = get_env_or_default("PIVOT_APP_ID", "pivot-year");
        let debounce_ms = get_env_or_default("PIVOT_DEBOUNCE_MS", "1500")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PIVOT_DEBOUNCE_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            data_dir,
            app_id,
            debounce: Duration::from_millis(debounce_ms),
        })
    }

    /// Configuration with defaults rooted at the given directory.
    ///
    /// Used by tests and embedders that do not want environment lookups.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            app_id: "pivot-year".to_owned(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
