//! Rank neighbourhood in the process grid.

use eddy_core::{Face, Rank};

/// A rank's identity and its neighbour on each of the six faces.
///
/// A face on the edge of the global domain has no neighbour (`None`);
/// exchanges through it are no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelTopology {
    rank: Rank,
    size: usize,
    neighbours: [Option<Rank>; 6],
}

impl ParallelTopology {
    /// Build from explicit neighbours, indexed by [`Face::index`].
    pub fn new(rank: Rank, size: usize, neighbours: [Option<Rank>; 6]) -> Self {
        Self {
            rank,
            size,
            neighbours,
        }
    }

    /// A single rank with no neighbours.
    pub fn serial() -> Self {
        Self::new(Rank(0), 1, [None; 6])
    }

    /// This rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks in the decomposition.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The neighbour across `face`, if any.
    pub fn neighbour(&self, face: Face) -> Option<Rank> {
        self.neighbours[face.index()]
    }

    /// Whether `face` lies on the edge of the global domain.
    pub fn is_global_boundary(&self, face: Face) -> bool {
        self.neighbour(face).is_none()
    }
}
