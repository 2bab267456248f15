//! One rank's share of the global grid.

use std::ops::Range;

use eddy_core::{Axis, Dim, GHOST_HIGH, GHOST_LOW};

use crate::error::GridError;
use crate::field::GridShape;

/// The interior block a rank owns, plus its position in the global grid.
///
/// Padded indices along an active axis run over `[0, N)` with
/// `N = local + GHOST_LOW + GHOST_HIGH`; the interior is `[GHOST_LOW, N - 1)`.
/// In 2D the z axis is a single plane with `N = 1` and no ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subdomain {
    dim: Dim,
    local_size: [usize; 3],
    first_corner: [usize; 3],
}

impl Subdomain {
    /// Create a subdomain with the given interior size and global offset.
    ///
    /// In 2D the z components are ignored and normalized to a single plane
    /// at offset 0.
    pub fn new(
        dim: Dim,
        local_size: [usize; 3],
        first_corner: [usize; 3],
    ) -> Result<Self, GridError> {
        let mut local_size = local_size;
        let mut first_corner = first_corner;
        if dim == Dim::Two {
            local_size[2] = 1;
            first_corner[2] = 0;
        }
        for &axis in dim.axes() {
            if local_size[axis.index()] == 0 {
                return Err(GridError::EmptyAxis { axis });
            }
        }
        Ok(Self {
            dim,
            local_size,
            first_corner,
        })
    }

    /// A subdomain covering the whole global grid (single-rank runs).
    pub fn whole(dim: Dim, global_size: [usize; 3]) -> Result<Self, GridError> {
        Self::new(dim, global_size, [0; 3])
    }

    /// Spatial dimension.
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Whether `axis` is resolved by this subdomain (z is inactive in 2D).
    pub fn is_active(&self, axis: Axis) -> bool {
        axis != Axis::Z || self.dim == Dim::Three
    }

    /// Interior cells per axis.
    pub fn local_size(&self) -> [usize; 3] {
        self.local_size
    }

    /// Global index of the first interior cell per axis.
    pub fn first_corner(&self) -> [usize; 3] {
        self.first_corner
    }

    /// Padded extent along `axis`.
    pub fn padded(&self, axis: Axis) -> usize {
        if self.is_active(axis) {
            self.local_size[axis.index()] + GHOST_LOW + GHOST_HIGH
        } else {
            1
        }
    }

    /// Padded extents of every field over this subdomain.
    pub fn shape(&self) -> GridShape {
        GridShape::new(
            self.padded(Axis::X),
            self.padded(Axis::Y),
            self.padded(Axis::Z),
        )
    }

    /// Padded index range of the interior along `axis`.
    pub fn interior(&self, axis: Axis) -> Range<usize> {
        if self.is_active(axis) {
            GHOST_LOW..self.padded(axis) - GHOST_HIGH
        } else {
            0..1
        }
    }

    /// Global cell index of padded index `padded` along `axis`.
    ///
    /// Ghost cells map outside the rank's interior, possibly below zero or
    /// past the global extent at the edges of the whole domain.
    pub fn global_index(&self, axis: Axis, padded: usize) -> isize {
        if !self.is_active(axis) {
            return 0;
        }
        self.first_corner[axis.index()] as isize + padded as isize - GHOST_LOW as isize
    }

    /// Number of interior cells.
    pub fn interior_cells(&self) -> usize {
        self.local_size.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_extents_follow_ghost_convention() {
        let sd = Subdomain::new(Dim::Two, [4, 8, 99], [4, 0, 7]).unwrap();
        assert_eq!(sd.padded(Axis::X), 7);
        assert_eq!(sd.padded(Axis::Y), 11);
        assert_eq!(sd.padded(Axis::Z), 1);
        assert_eq!(sd.interior(Axis::X), 2..6);
        assert_eq!(sd.interior(Axis::Z), 0..1);
        assert_eq!(sd.first_corner(), [4, 0, 0]);
        assert_eq!(sd.interior_cells(), 32);
    }

    #[test]
    fn global_index_maps_ghosts_outside() {
        let sd = Subdomain::new(Dim::Three, [3, 3, 3], [6, 0, 3]).unwrap();
        assert_eq!(sd.global_index(Axis::X, 2), 6);
        assert_eq!(sd.global_index(Axis::X, 1), 5);
        assert_eq!(sd.global_index(Axis::Y, 0), -2);
        assert_eq!(sd.global_index(Axis::Z, 5), 6);
    }

    #[test]
    fn zero_sized_axis_rejected() {
        assert_eq!(
            Subdomain::new(Dim::Three, [3, 0, 3], [0; 3]),
            Err(GridError::EmptyAxis { axis: Axis::Y })
        );
        // z is ignored in 2D.
        assert!(Subdomain::new(Dim::Two, [3, 3, 0], [0; 3]).is_ok());
    }
}
