//! Work duration model.

use serde::{Deserialize, Serialize};

/// Minutes in one work hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Minutes in one work day (8 hours).
pub const MINUTES_PER_DAY: u64 = 8 * MINUTES_PER_HOUR;

/// Minutes in one work week (5 days).
pub const MINUTES_PER_WEEK: u64 = 5 * MINUTES_PER_DAY;

/// A work duration split into fixed-size buckets.
///
/// Values built from a minute count are in display normal form
/// (`days < 5`, `hours < 8`, `minutes < 60`). Values parsed from text keep
/// whatever integers the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Duration {
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl Duration {
    pub fn new(weeks: u64, days: u64, hours: u64, minutes: u64) -> Self {
        Self {
            weeks,
            days,
            hours,
            minutes,
        }
    }

    /// Returns true if every field is zero.
    pub fn is_zero(&self) -> bool {
        self.weeks == 0 && self.days == 0 && self.hours == 0 && self.minutes == 0
    }

    /// Returns true if the sub-week fields are within their bucket sizes.
    pub fn is_canonical(&self) -> bool {
        self.days < MINUTES_PER_WEEK / MINUTES_PER_DAY
            && self.hours < MINUTES_PER_DAY / MINUTES_PER_HOUR
            && self.minutes < MINUTES_PER_HOUR
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::codec::duration_to_string(self))
    }
}

impl std::str::FromStr for Duration {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(crate::codec::string_to_duration(s))
    }
}
