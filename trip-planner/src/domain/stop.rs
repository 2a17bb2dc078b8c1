//! Stop index type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dense index identifying a physical stop in the transit data.
///
/// Indices are assigned by the transit data provider and are only meaningful
/// together with it: stop `3` in one timetable has nothing to do with stop `3`
/// in another. Dense indices let per-stop state live in plain vectors.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::StopIndex;
///
/// let stop = StopIndex(3);
/// assert_eq!(stop.index(), 3);
/// assert_eq!(stop.to_string(), "#3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopIndex(pub u32);

impl StopIndex {
    /// Returns the index as a `usize`, for indexing per-stop vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for StopIndex {
    fn from(value: usize) -> Self {
        StopIndex(value as u32)
    }
}

impl fmt::Debug for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopIndex({})", self.0)
    }
}

impl fmt::Display for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
