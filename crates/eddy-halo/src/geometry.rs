//! Which cells and components each ghost transfer carries.
//!
//! Every buffer length in the crate comes from a [`FacePlan`]. Fill and
//! read stencils walk the same plan, so producer and consumer can only
//! disagree if the two ranks disagree about the decomposition.
//!
//! Layers are padded indices along the face normal. With `N` the padded
//! extent:
//!
//! | kind      | face | fill                         | read                     |
//! |-----------|------|------------------------------|--------------------------|
//! | scalar    | low  | `2`                          | `1`                      |
//! | scalar    | high | `N-2`                        | `N-1`                    |
//! | staggered | low  | `2` all                      | `0` normal, `1` all      |
//! | staggered | high | `N-3` normal, `N-2` all      | `N-1` all                |
//!
//! The staggered high fill carries one extra value per row: the normal
//! component one layer further in, which the low neighbour needs for the
//! intermediate momentum on its low ghost face.

use std::ops::Range;

use eddy_core::{Axis, Face, GHOST_HIGH, GHOST_LOW};
use eddy_grid::Subdomain;
use eddy_stencil::face_span;
use smallvec::{smallvec, SmallVec};

use crate::kind::HaloKind;

/// The components of one cell a transfer carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Components {
    /// Every component of the field.
    All,
    /// Only the component along the given axis.
    Normal(Axis),
}

impl Components {
    /// Number of values this selection carries for a field with
    /// `components` values per cell.
    pub fn count(self, components: usize) -> usize {
        match self {
            Self::All => components,
            Self::Normal(_) => 1,
        }
    }

    /// Component indices, in transfer order.
    pub fn indices(self, components: usize) -> Range<usize> {
        match self {
            Self::All => 0..components,
            Self::Normal(axis) => axis.index()..axis.index() + 1,
        }
    }
}

/// One layer of cells copied to or from a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerCopy {
    /// Padded index along the face normal.
    pub layer: usize,
    /// Which components of each cell.
    pub components: Components,
}

/// How one face of one kind is packed or unpacked.
///
/// For every tangential position of the face span, in `k, j, i` order,
/// the plan's layers are visited in order and each contributes its
/// selected components. That sequence is the buffer layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacePlan {
    face: Face,
    components: usize,
    layers: SmallVec<[LayerCopy; 2]>,
    span: [Range<usize>; 3],
}

impl FacePlan {
    /// Layers packed into the buffer sent from `face`.
    pub fn fill(kind: HaloKind, subdomain: &Subdomain, face: Face) -> Self {
        let n = subdomain.padded(face.axis());
        let layers = match (kind.is_staggered(), face.is_low()) {
            (false, true) => smallvec![all(GHOST_LOW)],
            (false, false) => smallvec![all(n - 1 - GHOST_HIGH)],
            (true, true) => smallvec![all(GHOST_LOW)],
            (true, false) => smallvec![normal(n - 2 - GHOST_HIGH, face), all(n - 1 - GHOST_HIGH)],
        };
        Self::new(kind, subdomain, face, layers)
    }

    /// Layers the buffer received on `face` is unpacked into.
    pub fn read(kind: HaloKind, subdomain: &Subdomain, face: Face) -> Self {
        let n = subdomain.padded(face.axis());
        let layers = match (kind.is_staggered(), face.is_low()) {
            (false, true) => smallvec![all(GHOST_LOW - 1)],
            (false, false) => smallvec![all(n - 1)],
            (true, true) => smallvec![normal(GHOST_LOW - 2, face), all(GHOST_LOW - 1)],
            (true, false) => smallvec![all(n - 1)],
        };
        Self::new(kind, subdomain, face, layers)
    }

    fn new(
        kind: HaloKind,
        subdomain: &Subdomain,
        face: Face,
        layers: SmallVec<[LayerCopy; 2]>,
    ) -> Self {
        Self {
            face,
            components: kind.components(subdomain.dim()),
            layers,
            span: face_span(subdomain, face),
        }
    }

    /// The face this plan belongs to.
    pub fn face(&self) -> Face {
        self.face
    }

    /// The copied layers, in transfer order.
    pub fn layers(&self) -> &[LayerCopy] {
        &self.layers
    }

    /// Values per cell of the exchanged field.
    pub fn field_components(&self) -> usize {
        self.components
    }

    /// Values per tangential position.
    pub fn per_row(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.components.count(self.components))
            .sum()
    }

    /// Tangential positions on the face.
    pub fn rows(&self) -> usize {
        let normal = self.face.axis().index();
        self.span
            .iter()
            .enumerate()
            .filter(|&(a, _)| a != normal)
            .map(|(_, r)| r.len())
            .product()
    }

    /// Buffer length: `rows * per_row`.
    pub fn buffer_len(&self) -> usize {
        self.rows() * self.per_row()
    }
}

fn all(layer: usize) -> LayerCopy {
    LayerCopy {
        layer,
        components: Components::All,
    }
}

fn normal(layer: usize, face: Face) -> LayerCopy {
    LayerCopy {
        layer,
        components: Components::Normal(face.axis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Dim;

    #[test]
    fn staggered_faces_differ_by_one_component() {
        let sd = Subdomain::whole(Dim::Two, [4, 8, 1]).unwrap();
        let left = FacePlan::fill(HaloKind::Velocity, &sd, Face::Left);
        let right = FacePlan::fill(HaloKind::Velocity, &sd, Face::Right);
        assert_eq!(left.per_row(), 2);
        assert_eq!(right.per_row(), 3);
        assert_eq!(left.rows(), 8);
        assert_eq!(right.buffer_len(), 24);
        assert_eq!(right.layers()[0].layer, 4);
        assert_eq!(right.layers()[1].layer, 5);
    }

    #[test]
    fn scalar_layers() {
        let sd = Subdomain::whole(Dim::Three, [4, 5, 6]).unwrap();
        let fill = FacePlan::fill(HaloKind::Pressure, &sd, Face::Top);
        let read = FacePlan::read(HaloKind::Pressure, &sd, Face::Top);
        assert_eq!(fill.layers()[0].layer, 6);
        assert_eq!(read.layers()[0].layer, 7);
        assert_eq!(fill.per_row(), 1);
        // y faces: full padded x, interior z.
        assert_eq!(fill.rows(), 7 * 6);
        let low = FacePlan::read(HaloKind::Viscosity, &sd, Face::Front);
        assert_eq!(low.layers()[0].layer, 1);
    }

    #[test]
    fn low_staggered_read_reaches_second_ghost_layer() {
        let sd = Subdomain::whole(Dim::Three, [3, 3, 3]).unwrap();
        let read = FacePlan::read(HaloKind::Velocity, &sd, Face::Bottom);
        assert_eq!(
            read.layers(),
            &[
                LayerCopy {
                    layer: 0,
                    components: Components::Normal(Axis::Y)
                },
                LayerCopy {
                    layer: 1,
                    components: Components::All
                },
            ]
        );
        assert_eq!(read.per_row(), 4);
        assert_eq!(Components::Normal(Axis::Z).indices(3), 2..3);
    }
}
