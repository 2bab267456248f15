//! Per-cell obstacle flags.

use eddy_core::{Axis, Face, Real};

use crate::field::GridShape;
use crate::subdomain::Subdomain;

/// Bit set per cell: bit 0 marks the cell itself as an obstacle, bit
/// `1 + face.index()` marks the neighbour across `face` as one.
///
/// Flags are computed from global coordinates, so every rank derives the
/// same bits for the cells it shares with a neighbour and flags are never
/// exchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagField {
    shape: GridShape,
    data: Vec<u8>,
}

impl FlagField {
    /// The cell itself is solid.
    pub const OBSTACLE_SELF: u8 = 1 << 0;

    /// All-fluid flags.
    pub fn fluid(shape: GridShape) -> Self {
        Self {
            shape,
            data: vec![0; shape.len()],
        }
    }

    /// Bit marking the neighbour across `face` as solid.
    pub fn neighbour_bit(face: Face) -> u8 {
        1 << (1 + face.index())
    }

    /// Compute flags for every padded cell of `subdomain`.
    ///
    /// `is_obstacle` receives global cell coordinates, which fall outside
    /// the global grid for ghost cells at the domain edge.
    pub fn from_geometry(subdomain: &Subdomain, is_obstacle: impl Fn([isize; 3]) -> bool) -> Self {
        let shape = subdomain.shape();
        let mut flags = Self::fluid(shape);
        let dim = subdomain.dim();
        for k in 0..shape.nz() {
            for j in 0..shape.ny() {
                for i in 0..shape.nx() {
                    let global = [
                        subdomain.global_index(Axis::X, i),
                        subdomain.global_index(Axis::Y, j),
                        subdomain.global_index(Axis::Z, k),
                    ];
                    let mut bits = 0u8;
                    if is_obstacle(global) {
                        bits |= Self::OBSTACLE_SELF;
                    }
                    for &face in dim.faces() {
                        let mut n = global;
                        let a = face.axis().index();
                        n[a] += if face.is_low() { -1 } else { 1 };
                        if is_obstacle(n) {
                            bits |= Self::neighbour_bit(face);
                        }
                    }
                    flags.data[shape.index(i, j, k)] = bits;
                }
            }
        }
        flags
    }

    /// The padded extents.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Raw bits at `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> u8 {
        self.data[self.shape.index(i, j, k)]
    }

    /// Whether cell `(i, j, k)` is fluid.
    #[inline]
    pub fn is_fluid(&self, i: usize, j: usize, k: usize) -> bool {
        self.get(i, j, k) & Self::OBSTACLE_SELF == 0
    }

    /// Whether the neighbour of `(i, j, k)` across `face` is solid.
    #[inline]
    pub fn neighbour_is_obstacle(&self, i: usize, j: usize, k: usize, face: Face) -> bool {
        self.get(i, j, k) & Self::neighbour_bit(face) != 0
    }

    /// Fraction of solid cells, for diagnostics.
    pub fn obstacle_fraction(&self) -> Real {
        if self.data.is_empty() {
            return 0.0;
        }
        let solid = self
            .data
            .iter()
            .filter(|&&b| b & Self::OBSTACLE_SELF != 0)
            .count();
        solid as Real / self.data.len() as Real
    }
}
