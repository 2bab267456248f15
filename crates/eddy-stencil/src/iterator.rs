//! Deterministic traversals that drive stencils over a subdomain.
//!
//! Every traversal visits cells in one fixed nested order, outer to inner
//! `k, j, i`. A sender's fill sweep and the receiver's read sweep over the
//! matching face therefore enumerate the same tangential positions in the
//! same order, which is what keeps ghost buffers from being transposed.

use std::ops::Range;

use eddy_core::{Axis, Dim, Face, GHOST_HIGH, GHOST_LOW};
use eddy_grid::{Cell, FlowField, ParallelTopology, Subdomain};
use smallvec::SmallVec;

use crate::context::StencilContext;
use crate::stencil::{BoundaryStencil, FieldStencil, Wall};

type Faces = SmallVec<[Face; 6]>;

/// Padded index of the boundary interior layer of `face`.
fn boundary_layer(subdomain: &Subdomain, face: Face) -> usize {
    if face.is_low() {
        GHOST_LOW
    } else {
        subdomain.padded(face.axis()) - 1 - GHOST_HIGH
    }
}

/// The cells adjacent to `face` that a ghost exchange enumerates.
///
/// Along the normal axis the span is the single boundary interior layer.
/// Tangential axes that precede the normal axis (x before y before z)
/// cover their full padded extent, so ghost values received earlier in the
/// exchange order travel on to the next axis and reach the corners.
/// Tangential axes that follow it cover their interior only.
pub fn face_span(subdomain: &Subdomain, face: Face) -> [Range<usize>; 3] {
    let normal = face.axis();
    let layer = boundary_layer(subdomain, face);
    let mut span = [0..1, 0..1, 0..1];
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        span[axis.index()] = if axis == normal {
            layer..layer + 1
        } else if axis < normal {
            0..subdomain.padded(axis)
        } else {
            subdomain.interior(axis)
        };
    }
    span
}

/// The cells adjacent to a global wall: the boundary interior layer along
/// the normal axis and the full padded extent along every other axis.
fn wall_span(subdomain: &Subdomain, face: Face) -> [Range<usize>; 3] {
    let normal = face.axis();
    let layer = boundary_layer(subdomain, face);
    let mut span = [0..1, 0..1, 0..1];
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        span[axis.index()] = if axis == normal {
            layer..layer + 1
        } else {
            0..subdomain.padded(axis)
        };
    }
    span
}

fn sweep_wall<S: BoundaryStencil + ?Sized>(
    stencil: &mut S,
    flow: &mut FlowField,
    wall: Wall,
    span: [Range<usize>; 3],
) {
    let [rx, ry, rz] = span;
    for k in rz {
        for j in ry.clone() {
            for i in rx.clone() {
                stencil.apply_wall(flow, wall, Cell::new(i, j, k));
            }
        }
    }
}

// ── FieldIterator ──────────────────────────────────────────────────

/// Sweeps the interior, shifted by a low and a high offset on every active
/// axis.
///
/// With offsets `(lo, hi)` the visited padded range along an active axis is
/// `[GHOST_LOW + lo, N - GHOST_HIGH + hi)`, clamped to `[0, N)`. Negative
/// `lo` or positive `hi` reach into the ghost layers; `(0, 0)` is exactly
/// the interior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldIterator {
    low_offset: isize,
    high_offset: isize,
}

impl FieldIterator {
    /// An iterator with explicit offsets.
    pub fn new(low_offset: isize, high_offset: isize) -> Self {
        Self {
            low_offset,
            high_offset,
        }
    }

    /// The interior, no offsets.
    pub fn interior() -> Self {
        Self::default()
    }

    /// The visited range per axis for `subdomain`.
    pub fn ranges(&self, subdomain: &Subdomain) -> [Range<usize>; 3] {
        let mut ranges = [0..1, 0..1, 0..1];
        for &axis in subdomain.dim().axes() {
            let n = subdomain.padded(axis) as isize;
            let lo = (GHOST_LOW as isize + self.low_offset).clamp(0, n);
            let hi = (n - GHOST_HIGH as isize + self.high_offset).clamp(lo, n);
            ranges[axis.index()] = lo as usize..hi as usize;
        }
        ranges
    }

    /// Apply `stencil` at every visited cell in `k, j, i` order.
    pub fn iterate<S: FieldStencil + ?Sized>(
        &self,
        stencil: &mut S,
        ctx: &StencilContext<'_>,
        flow: &mut FlowField,
    ) {
        let [rx, ry, rz] = self.ranges(flow.subdomain());
        for k in rz {
            for j in ry.clone() {
                for i in rx.clone() {
                    stencil.apply(ctx, flow, Cell::new(i, j, k));
                }
            }
        }
    }
}

// ── GhostLayerIterator ─────────────────────────────────────────────

/// Visits the cells adjacent to each inter-rank face, face by face in
/// exchange order.
///
/// Only faces with a neighbour are visited; faces on the edge of the
/// global domain are skipped entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GhostLayerIterator {
    dim: Dim,
    faces: Faces,
}

impl GhostLayerIterator {
    /// Faces of `topology` that have a neighbour.
    pub fn new(dim: Dim, topology: &ParallelTopology) -> Self {
        Self::for_faces(
            dim,
            dim.faces()
                .iter()
                .copied()
                .filter(|&f| topology.neighbour(f).is_some()),
        )
    }

    /// An explicit list of faces, kept in exchange order.
    pub fn for_faces(dim: Dim, faces: impl IntoIterator<Item = Face>) -> Self {
        let mut faces: Faces = faces.into_iter().filter(|f| f.exists_in(dim)).collect();
        faces.sort();
        faces.dedup();
        Self { dim, faces }
    }

    /// The visited faces.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Apply `stencil` over every visited face.
    pub fn iterate<S: BoundaryStencil + ?Sized>(&self, stencil: &mut S, flow: &mut FlowField) {
        for &face in &self.faces {
            self.iterate_face(stencil, flow, face);
        }
    }

    /// Apply `stencil` over the span of a single face.
    pub fn iterate_face<S: BoundaryStencil + ?Sized>(
        &self,
        stencil: &mut S,
        flow: &mut FlowField,
        face: Face,
    ) {
        let span = face_span(flow.subdomain(), face);
        sweep_wall(stencil, flow, Wall::new(self.dim, face), span);
    }
}

// ── GlobalBoundaryIterator ─────────────────────────────────────────

/// Visits the cells adjacent to each wall of the global domain this rank
/// touches. Physical boundary conditions run through it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalBoundaryIterator {
    dim: Dim,
    faces: Faces,
}

impl GlobalBoundaryIterator {
    /// Faces of `topology` without a neighbour.
    pub fn new(dim: Dim, topology: &ParallelTopology) -> Self {
        let faces = dim
            .faces()
            .iter()
            .copied()
            .filter(|&f| topology.is_global_boundary(f))
            .collect();
        Self { dim, faces }
    }

    /// The visited walls.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Apply `stencil` on every global wall, in face order.
    pub fn iterate<S: BoundaryStencil + ?Sized>(&self, stencil: &mut S, flow: &mut FlowField) {
        for &face in &self.faces {
            let span = wall_span(flow.subdomain(), face);
            sweep_wall(stencil, flow, Wall::new(self.dim, face), span);
        }
    }
}
