//! Mesh spacing and cell positions.

use eddy_core::{Axis, Real};

use crate::subdomain::Subdomain;

/// Per-cell spacing and position lookups, indexed by padded coordinates.
///
/// Positions are those of the cell's low corner along the axis, in the
/// global frame.
pub trait Meshsize: Send + Sync {
    /// Width of cell `(i, j, k)` along `axis`.
    fn spacing(&self, axis: Axis, i: usize, j: usize, k: usize) -> Real;

    /// Position of the low face of cell `(i, j, k)` along `axis`.
    fn position(&self, axis: Axis, i: usize, j: usize, k: usize) -> Real;

    /// Physical length of the whole domain along `axis`.
    fn domain_length(&self, axis: Axis) -> Real;

    /// Smallest cell width along `axis` over the whole domain.
    fn min_spacing(&self, axis: Axis) -> Real;
}

/// Uniform spacing: `length / cells` along every active axis.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformMeshsize {
    spacing: [Real; 3],
    lengths: [Real; 3],
    subdomain: Subdomain,
}

impl UniformMeshsize {
    /// Spacing for `subdomain` of a global grid of `global_size` cells
    /// covering `lengths`.
    pub fn new(subdomain: Subdomain, global_size: [usize; 3], lengths: [Real; 3]) -> Self {
        let mut spacing = [1.0; 3];
        for &axis in subdomain.dim().axes() {
            let a = axis.index();
            spacing[a] = lengths[a] / global_size[a] as Real;
        }
        Self {
            spacing,
            lengths,
            subdomain,
        }
    }
}

impl Meshsize for UniformMeshsize {
    fn spacing(&self, axis: Axis, _i: usize, _j: usize, _k: usize) -> Real {
        self.spacing[axis.index()]
    }

    fn position(&self, axis: Axis, i: usize, j: usize, k: usize) -> Real {
        let padded = match axis {
            Axis::X => i,
            Axis::Y => j,
            Axis::Z => k,
        };
        self.subdomain.global_index(axis, padded) as Real * self.spacing[axis.index()]
    }

    fn domain_length(&self, axis: Axis) -> Real {
        self.lengths[axis.index()]
    }

    fn min_spacing(&self, axis: Axis) -> Real {
        self.spacing[axis.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Dim;

    #[test]
    fn positions_use_global_offset() {
        let sd = Subdomain::new(Dim::Two, [4, 8, 1], [4, 0, 0]).unwrap();
        let m = UniformMeshsize::new(sd, [8, 8, 1], [1.0, 2.0, 1.0]);
        assert_eq!(m.spacing(Axis::X, 0, 0, 0), 0.125);
        assert_eq!(m.spacing(Axis::Y, 0, 0, 0), 0.25);
        // Padded 2 is the first interior cell, global x = 4.
        assert_eq!(m.position(Axis::X, 2, 0, 0), 0.5);
        assert_eq!(m.position(Axis::Y, 0, 2, 0), 0.0);
        assert_eq!(m.domain_length(Axis::Y), 2.0);
    }
}
