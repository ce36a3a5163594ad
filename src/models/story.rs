//! User story model.

use serde::{Deserialize, Serialize};

/// Point values offered when estimating a story.
pub const POINT_PALETTE: [u32; 9] = [0, 1, 2, 3, 5, 8, 13, 20, 40];

/// Largest value in [`POINT_PALETTE`].
pub const MAX_PALETTE_POINTS: u32 = 40;

/// A leaf estimation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story name
    pub name: String,

    /// Story points
    #[serde(default)]
    pub points: u32,

    /// Minutes derived from points and the minutes-per-point factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,

    /// User override, wins over `minutes` wherever time is shown or summed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_minutes: Option<u64>,
}

impl Story {
    /// Create an unestimated story.
    pub fn new(name: impl Into<String>, points: u32) -> Self {
        Self {
            name: name.into(),
            points,
            minutes: None,
            modified_minutes: None,
        }
    }

    pub fn with_minutes(mut self, minutes: u64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    pub fn with_modified_minutes(mut self, minutes: u64) -> Self {
        self.modified_minutes = Some(minutes);
        self
    }

    /// Minutes this story contributes: override, then computed, then zero.
    pub fn effective_minutes(&self) -> u64 {
        self.modified_minutes.or(self.minutes).unwrap_or(0)
    }

    /// Returns true if a manual override is set.
    pub fn is_overridden(&self) -> bool {
        self.modified_minutes.is_some()
    }

    /// Returns true if the points are one of the given palette values.
    pub fn in_palette(&self, palette: &[u32]) -> bool {
        palette.contains(&self.points)
    }

    /// Points relative to the largest palette value, clamped to `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        (self.points as f64 / MAX_PALETTE_POINTS as f64).min(1.0)
    }
}
