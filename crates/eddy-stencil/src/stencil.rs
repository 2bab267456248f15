//! The [`FieldStencil`] and [`BoundaryStencil`] traits.

use eddy_core::{Axis, Dim, Face};
use eddy_grid::{Cell, FlowField};

use crate::context::StencilContext;

/// A named wall of a subdomain in a given dimension.
///
/// Replaces one method per wall and per dimension with a single tagged
/// value; a stencil matches on `face` and consults `dim` only where 2D and
/// 3D differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wall {
    /// Spatial dimension of the run.
    pub dim: Dim,
    /// The wall.
    pub face: Face,
}

impl Wall {
    /// Construct a wall.
    pub fn new(dim: Dim, face: Face) -> Self {
        Self { dim, face }
    }

    /// Axis normal to the wall.
    pub fn axis(&self) -> Axis {
        self.face.axis()
    }
}

/// An interior operator applied once per visited cell.
///
/// # Contract
///
/// - Reads a fixed-radius, face-only neighbourhood of `cell` (never a
///   diagonal ghost corner).
/// - Writes exactly the visited cell of its destination field(s) and
///   nothing else, so the result of a sweep does not depend on visit order.
/// - Reduction-style stencils accumulate into `self` and expose an
///   explicit reset that callers invoke before each sweep.
pub trait FieldStencil {
    /// Apply the operator at `cell`.
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell);
}

/// An operator applied at the cells adjacent to one wall.
///
/// `cell` is the boundary interior cell along the wall's normal axis
/// (padded index `GHOST_LOW` for a low wall, `N - 1 - GHOST_HIGH` for a
/// high wall) at one tangential position. Fill stencils pack values near
/// the wall into a flat buffer, read stencils unpack a buffer into the
/// ghost cells, and physical boundary conditions write the ghost layer
/// directly.
pub trait BoundaryStencil {
    /// Apply the operator at `cell` of `wall`.
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell);
}

impl<S: FieldStencil + ?Sized> FieldStencil for &mut S {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        (**self).apply(ctx, flow, cell)
    }
}

impl<S: BoundaryStencil + ?Sized> BoundaryStencil for &mut S {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        (**self).apply_wall(flow, wall, cell)
    }
}
