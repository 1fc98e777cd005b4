use crate::ids::LogicalId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open validity window `[effective_from, effective_to)`.
///
/// `effective_to = None` means the window is open-ended (still in force).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

impl ValidityWindow {
    /// Build a window, returning `None` when `effective_to <= effective_from`.
    pub fn new(effective_from: NaiveDate, effective_to: Option<NaiveDate>) -> Option<Self> {
        let window = Self {
            effective_from,
            effective_to,
        };
        window.is_well_formed().then_some(window)
    }

    pub fn open(effective_from: NaiveDate) -> Self {
        Self {
            effective_from,
            effective_to: None,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match self.effective_to {
            Some(to) => to > self.effective_from,
            None => true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.effective_to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.map_or(true, |to| date < to)
    }

    /// Two half-open windows intersect iff each starts before the other ends.
    pub fn overlaps(&self, other: &ValidityWindow) -> bool {
        let self_starts_before_other_ends = other
            .effective_to
            .map_or(true, |to| self.effective_from < to);
        let other_starts_before_self_ends = self
            .effective_to
            .map_or(true, |to| other.effective_from < to);
        self_starts_before_other_ends && other_starts_before_self_ends
    }
}

impl fmt::Display for ValidityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_to {
            Some(to) => write!(f, "[{}, {})", self.effective_from, to),
            None => write!(f, "[{}, ..)", self.effective_from),
        }
    }
}

/// An uncovered stretch `[gap_start, gap_end)` between two consecutive
/// versions of the same logical entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemporalGap {
    pub logical_id: LogicalId,
    pub gap_start: NaiveDate,
    pub gap_end: NaiveDate,
}

impl TemporalGap {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.gap_start <= date && date < self.gap_end
    }

    pub fn days(&self) -> i64 {
        (self.gap_end - self.gap_start).num_days()
    }
}

impl fmt::Display for TemporalGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uncovered over [{}, {})",
            self.logical_id, self.gap_start, self.gap_end
        )
    }
}
