//! Error types for grid construction and decomposition.

use eddy_core::{Axis, Rank};
use std::fmt;

/// Errors arising from subdomain construction or domain decomposition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// An active axis has zero cells.
    EmptyAxis {
        /// The empty axis.
        axis: Axis,
    },
    /// The process count along an axis is zero or exceeds its cell count.
    InvalidProcessCount {
        /// The axis being split.
        axis: Axis,
        /// Requested number of processes along the axis.
        processes: usize,
        /// Global cells along the axis.
        cells: usize,
    },
    /// A 2D decomposition asked for more than one process along z.
    PlanarProcesses {
        /// Requested number of processes along z.
        processes: usize,
    },
    /// A rank outside the decomposition was requested.
    RankOutOfRange {
        /// The requested rank.
        rank: Rank,
        /// Number of ranks in the decomposition.
        size: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis { axis } => write!(f, "axis {axis:?} has zero cells"),
            Self::InvalidProcessCount {
                axis,
                processes,
                cells,
            } => write!(
                f,
                "cannot split {cells} cells along {axis:?} across {processes} processes"
            ),
            Self::PlanarProcesses { processes } => write!(
                f,
                "a 2D decomposition needs exactly one process along z, got {processes}"
            ),
            Self::RankOutOfRange { rank, size } => {
                write!(f, "{rank} is outside a decomposition of {size} ranks")
            }
        }
    }
}

impl std::error::Error for GridError {}
