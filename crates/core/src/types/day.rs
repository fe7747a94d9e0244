//! Day-of-year type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Day`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayError {
    /// The value is outside the journal's 1..=365 range.
    #[error("day must be between 1 and 365 (got {0})")]
    OutOfRange(u16),
}

/// A day of the journal year.
///
/// The journal covers exactly 365 days; a `Day` is always in `1..=365`.
/// Construction goes through [`Day::new`], so any `Day` value in the program
/// is valid by construction.
///
/// ## Examples
///
/// ```
/// use pivot_journal_core::Day;
///
/// let day = Day::new(183)?;
/// assert_eq!(day.get(), 183);
/// assert!(Day::new(0).is_err());
/// assert!(Day::new(366).is_err());
/// # Ok::<(), pivot_journal_core::DayError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Day(u16);

impl Day {
    /// The first day of the journal.
    pub const FIRST: Self = Self(1);

    /// The last day of the journal.
    pub const LAST: Self = Self(365);

    /// Number of days in the journal year.
    pub const COUNT: u16 = 365;

    /// Create a `Day` from a number.
    ///
    /// # Errors
    ///
    /// Returns `DayError::OutOfRange` if the value is not in `1..=365`.
    pub const fn new(value: u16) -> Result<Self, DayError> {
        if value >= 1 && value <= Self::COUNT {
            Ok(Self(value))
        } else {
            Err(DayError::OutOfRange(value))
        }
    }

    /// Get the underlying day number.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// The previous day, or `None` at the start of the year.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        if self.0 > 1 { Some(Self(self.0 - 1)) } else { None }
    }

    /// The next day, or `None` at the end of the year.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 < Self::COUNT {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// Zero-based index into the prompt catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Day {
    type Error = DayError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Day> for u16 {
    fn from(day: Day) -> Self {
        day.0
    }
}

impl std::str::FromStr for Day {
    type Err = DayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s.parse().map_err(|_| DayError::OutOfRange(0))?;
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_in_range() {
        assert_eq!(Day::new(1).unwrap().get(), 1);
        assert_eq!(Day::new(365).unwrap().get(), 365);
        assert_eq!(Day::new(183).unwrap().get(), 183);
    }

    #[test]
    fn test_new_out_of_range() {
        assert_eq!(Day::new(0), Err(DayError::OutOfRange(0)));
        assert_eq!(Day::new(366), Err(DayError::OutOfRange(366)));
    }

    #[test]
    fn test_prev_next_boundaries() {
        assert_eq!(Day::FIRST.prev(), None);
        assert_eq!(Day::LAST.next(), None);
        assert_eq!(Day::FIRST.next(), Some(Day::new(2).unwrap()));
        assert_eq!(Day::LAST.prev(), Some(Day::new(364).unwrap()));
    }

    #[test]
    fn test_index() {
        assert_eq!(Day::FIRST.index(), 0);
        assert_eq!(Day::LAST.index(), 364);
    }

    #[test]
    fn test_serde_roundtrip() {
        let day = Day::new(42).unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "42");

        let parsed: Day = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, day);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Day>("0").is_err());
        assert!(serde_json::from_str::<Day>("366").is_err());
    }

    #[test]
    fn test_from_str() {
        let day: Day = "100".parse().unwrap();
        assert_eq!(day.get(), 100);
        assert!("abc".parse::<Day>().is_err());
        assert!("400".parse::<Day>().is_err());
    }
}
