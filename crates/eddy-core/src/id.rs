//! Strongly-typed identifiers for ranks and steps.

use std::fmt;

/// Identifies one process (rank) of a decomposed run.
///
/// Ranks are numbered x-fastest over the process grid:
/// `rank = ix + px * (iy + py * iz)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl Rank {
    /// The rank as a plain index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Monotonically increasing timestep counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
