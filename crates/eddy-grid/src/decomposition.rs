//! Block decomposition of the global grid over a process grid.
//!
//! Each axis is split into contiguous blocks: every block gets
//! `cells / processes` cells and the remainder goes one cell each to the
//! lowest-index blocks. Ranks are numbered x-fastest over the process grid.

use eddy_core::{Axis, Dim, Rank};

use crate::error::GridError;
use crate::subdomain::Subdomain;
use crate::topology::ParallelTopology;

/// The split of a global grid across `px * py * pz` ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decomposition {
    dim: Dim,
    global_size: [usize; 3],
    processes: [usize; 3],
}

impl Decomposition {
    /// Validate and build a decomposition.
    ///
    /// In 2D the z entries are normalized to one cell and must request
    /// exactly one process.
    pub fn new(
        dim: Dim,
        global_size: [usize; 3],
        processes: [usize; 3],
    ) -> Result<Self, GridError> {
        let mut global_size = global_size;
        if dim == Dim::Two {
            if processes[2] != 1 {
                return Err(GridError::PlanarProcesses {
                    processes: processes[2],
                });
            }
            global_size[2] = 1;
        }
        for &axis in dim.axes() {
            let cells = global_size[axis.index()];
            let procs = processes[axis.index()];
            if cells == 0 {
                return Err(GridError::EmptyAxis { axis });
            }
            if procs == 0 || procs > cells {
                return Err(GridError::InvalidProcessCount {
                    axis,
                    processes: procs,
                    cells,
                });
            }
        }
        Ok(Self {
            dim,
            global_size,
            processes,
        })
    }

    /// A single-rank decomposition.
    pub fn serial(dim: Dim, global_size: [usize; 3]) -> Result<Self, GridError> {
        Self::new(dim, global_size, [1, 1, 1])
    }

    /// Spatial dimension.
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Global interior cells per axis.
    pub fn global_size(&self) -> [usize; 3] {
        self.global_size
    }

    /// Processes per axis.
    pub fn processes(&self) -> [usize; 3] {
        self.processes
    }

    /// Total number of ranks.
    pub fn rank_count(&self) -> usize {
        self.processes.iter().product()
    }

    /// Position of `rank` in the process grid.
    pub fn process_coords(&self, rank: Rank) -> Result<[usize; 3], GridError> {
        let size = self.rank_count();
        if rank.0 >= size {
            return Err(GridError::RankOutOfRange { rank, size });
        }
        let [px, py, _] = self.processes;
        let r = rank.0;
        Ok([r % px, (r / px) % py, r / (px * py)])
    }

    /// Rank at position `coords` of the process grid.
    pub fn rank_at(&self, coords: [usize; 3]) -> Rank {
        let [px, py, _] = self.processes;
        Rank(coords[0] + px * (coords[1] + py * coords[2]))
    }

    /// Size and start of block `index` when splitting `cells` over `parts`.
    fn block(cells: usize, parts: usize, index: usize) -> (usize, usize) {
        let base = cells / parts;
        let rem = cells % parts;
        let size = base + usize::from(index < rem);
        let start = index * base + index.min(rem);
        (size, start)
    }

    /// The interior block owned by `rank`.
    pub fn subdomain(&self, rank: Rank) -> Result<Subdomain, GridError> {
        let coords = self.process_coords(rank)?;
        let mut local = [1usize; 3];
        let mut corner = [0usize; 3];
        for &axis in self.dim.axes() {
            let a = axis.index();
            let (size, start) = Self::block(self.global_size[a], self.processes[a], coords[a]);
            local[a] = size;
            corner[a] = start;
        }
        Subdomain::new(self.dim, local, corner)
    }

    /// Neighbours of `rank` on every face present in this dimension.
    pub fn topology(&self, rank: Rank) -> Result<ParallelTopology, GridError> {
        let coords = self.process_coords(rank)?;
        let mut neighbours = [None; 6];
        for &face in self.dim.faces() {
            let a = face.axis().index();
            let mut nc = coords;
            if face.is_low() {
                if coords[a] == 0 {
                    continue;
                }
                nc[a] -= 1;
            } else {
                if coords[a] + 1 == self.processes[a] {
                    continue;
                }
                nc[a] += 1;
            }
            neighbours[face.index()] = Some(self.rank_at(nc));
        }
        Ok(ParallelTopology::new(rank, self.rank_count(), neighbours))
    }

    /// Rank owning global cell `cell`, if inside the domain.
    pub fn owner_of(&self, cell: [usize; 3]) -> Option<Rank> {
        let mut coords = [0usize; 3];
        for &axis in self.dim.axes() {
            let a = axis.index();
            if cell[a] >= self.global_size[a] {
                return None;
            }
            coords[a] = (0..self.processes[a]).find(|&p| {
                let (size, start) = Self::block(self.global_size[a], self.processes[a], p);
                cell[a] >= start && cell[a] < start + size
            })?;
        }
        Some(self.rank_at(coords))
    }

    /// Per-axis interior size of every rank along `axis`, in process order.
    pub fn block_sizes(&self, axis: Axis) -> Vec<usize> {
        let a = axis.index();
        (0..self.processes[a])
            .map(|p| Self::block(self.global_size[a], self.processes[a], p).0)
            .collect()
    }
}
