//! Device-local cache.
//!
//! Two keys, stored as files in the data directory:
//!
//! - `pivotYearEntries` - JSON object mapping stringified day to entry text.
//!   Pre-authentication scratch storage and the migration source; deleted
//!   only after a confirmed migration commit, never on failure.
//! - `pivotYearLastDay` - last-viewed day number. UI restore only; never
//!   merged into entry data.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use pivot_journal_core::Day;

const ENTRIES_KEY: &str = "pivotYearEntries";
const LAST_DAY_KEY: &str = "pivotYearLastDay";

/// Errors writing to the local cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handle on the device-local cache directory.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Open the cache in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join(format!("{ENTRIES_KEY}.json"))
    }

    fn last_day_path(&self) -> PathBuf {
        self.dir.join(LAST_DAY_KEY)
    }

    /// The cached entries mapping, or `None` if the key is absent.
    ///
    /// Unreadable or unparseable content is treated as absent (and logged);
    /// day keys outside 1..=365 are skipped.
    #[must_use]
    pub fn entries(&self) -> Option<BTreeMap<Day, String>> {
        let path = self.entries_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(?path, error = %e, "cannot read local cache");
                return None;
            }
        };

        let raw: BTreeMap<String, String> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(?path, error = %e, "local cache is not valid JSON, ignoring");
                return None;
            }
        };

        let mut entries = BTreeMap::new();
        for (key, text) in raw {
            match key.parse::<Day>() {
                Ok(day) => {
                    entries.insert(day, text);
                }
                Err(_) => {
                    tracing::warn!(key, "skipping cache entry with invalid day");
                }
            }
        }
        Some(entries)
    }

    /// Whether the entries key is present.
    #[must_use]
    pub fn has_entries(&self) -> bool {
        self.entries_path().exists()
    }

    /// Write one entry into the cache (pre-auth scratch storage).
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache file cannot be written.
    pub fn set_entry(&self, day: Day, text: &str) -> Result<(), CacheError> {
        let mut entries = self.entries().unwrap_or_default();
        entries.insert(day, text.to_owned());

        let raw: BTreeMap<String, &str> = entries
            .iter()
            .map(|(day, text)| (day.to_string(), text.as_str()))
            .collect();
        let json = serde_json::to_vec_pretty(&raw)?;
        fs::write(self.entries_path(), json)?;
        Ok(())
    }

    /// Remove the entries key entirely.
    ///
    /// Called exactly once per migration, after the commit is confirmed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the file exists but cannot be removed.
    pub fn clear_entries(&self) -> Result<(), CacheError> {
        match fs::remove_file(self.entries_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The last-viewed day, if one was recorded and is valid.
    #[must_use]
    pub fn last_day(&self) -> Option<Day> {
        let raw = fs::read_to_string(self.last_day_path()).ok()?;
        raw.trim().parse().ok()
    }

    /// Record the last-viewed day.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the file cannot be written.
    pub fn set_last_day(&self, day: Day) -> Result<(), CacheError> {
        fs::write(self.last_day_path(), day.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(n: u16) -> Day {
        Day::new(n).unwrap()
    }

    #[test]
    fn test_absent_entries_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        assert!(cache.entries().is_none());
        assert!(!cache.has_entries());
    }

    #[test]
    fn test_set_and_read_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();

        cache.set_entry(day(5), "hello").unwrap();
        cache.set_entry(day(6), "world").unwrap();

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get(&day(5)).map(String::as_str), Some("hello"));
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = LocalCache::open(dir.path()).unwrap();
            cache.set_entry(day(1), "persisted").unwrap();
        }
        let cache = LocalCache::open(dir.path()).unwrap();
        assert_eq!(
            cache.entries().unwrap().get(&day(1)).map(String::as_str),
            Some("persisted")
        );
    }

    #[test]
    fn test_clear_entries_removes_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        cache.set_entry(day(1), "x").unwrap();

        cache.clear_entries().unwrap();
        assert!(!cache.has_entries());
        assert!(cache.entries().is_none());

        // Clearing an absent key is fine.
        cache.clear_entries().unwrap();
    }

    #[test]
    fn test_corrupt_cache_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        fs::write(dir.path().join("pivotYearEntries.json"), b"{ nope").unwrap();
        assert!(cache.entries().is_none());
    }

    #[test]
    fn test_invalid_day_keys_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("pivotYearEntries.json"),
            br#"{"5": "keep", "400": "drop", "abc": "drop"}"#,
        )
        .unwrap();

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&day(5)));
    }

    #[test]
    fn test_last_day_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        assert!(cache.last_day().is_none());

        cache.set_last_day(day(42)).unwrap();
        assert_eq!(cache.last_day(), Some(day(42)));
    }

    #[test]
    fn test_invalid_last_day_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();
        fs::write(dir.path().join("pivotYearLastDay"), "999").unwrap();
        assert!(cache.last_day().is_none());
    }
}
