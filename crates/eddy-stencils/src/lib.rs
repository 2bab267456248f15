//! Reference stencils for the Eddy flow solver.
//!
//! A compact uniform-mesh discretization on the staggered grid, enough to
//! drive the timestep loop end to end. Each stencil reads a face-only
//! neighbourhood of radius one plus, for the mixed convective and strain
//! terms, the edge-adjacent cells that the double ghost exchange refreshes.
//!
//! # Per-step order
//!
//! 1. [`EddyViscosityStencil`] (turbulent runs only)
//! 2. [`MaxVelocityStencil`] or [`TurbulentTimestepStencil`]: local dt bound
//! 3. [`FghStencil`], then [`FghBoundaryStencil`] on the global walls
//! 4. [`RhsStencil`]
//! 5. [`VelocityStencil`], then [`ObstacleStencil`]
//! 6. [`VelocityBoundaryStencil`] on the global walls

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod init;
pub mod momentum;
pub mod rhs;
pub mod timestep;
pub mod turbulence;
pub mod velocity;

pub use boundary::{FghBoundaryStencil, VelocityBoundaryStencil, WallCondition};
pub use init::TaylorGreenInit;
pub use momentum::FghStencil;
pub use rhs::RhsStencil;
pub use timestep::{MaxVelocityStencil, TurbulentTimestepStencil};
pub use turbulence::{
    BoundaryLayer, EddyViscosityStencil, MixingLengthStencil, WallDistanceStencil, KARMAN,
};
pub use velocity::{ObstacleStencil, VelocityStencil};

use eddy_core::{Axis, GHOST_LOW};
use eddy_grid::{Cell, FlowField};

/// Whether both cells sharing the high face of `cell` along `axis` are fluid.
pub(crate) fn fluid_face(flow: &FlowField, cell: Cell, axis: Axis) -> bool {
    let n = cell.plus(axis);
    flow.flags.is_fluid(cell.i, cell.j, cell.k) && flow.flags.is_fluid(n.i, n.j, n.k)
}

/// Whether every coordinate of `cell` except the one along `axis` lies in
/// the interior or above it.
pub(crate) fn tangentially_interior(flow: &FlowField, cell: Cell, axis: Axis) -> bool {
    flow.subdomain()
        .dim()
        .axes()
        .iter()
        .all(|&e| e == axis || cell.get(e) >= GHOST_LOW)
}
