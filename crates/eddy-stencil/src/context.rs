//! Execution context passed to interior stencils.

use eddy_core::{Dim, Real};
use eddy_grid::Meshsize;

/// Physical constants shared by the discretization stencils.
///
/// Built once from the simulation configuration and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowParameters {
    /// Spatial dimension.
    pub dim: Dim,
    /// Reynolds number.
    pub reynolds: Real,
    /// Donor-cell blending factor for the convective terms, in `[0, 1]`.
    pub gamma: Real,
    /// Body force per axis.
    pub body_force: [Real; 3],
}

impl FlowParameters {
    /// Kinematic viscosity `1 / Re`.
    pub fn viscosity(&self) -> Real {
        1.0 / self.reynolds
    }
}

/// Read-only view handed to every [`FieldStencil`](crate::FieldStencil)
/// call: the physical parameters, the mesh, and the current timestep.
///
/// `dt` is a copy taken when the context is built; the adaptive-dt phase
/// is its only writer and builds a fresh context afterwards.
#[derive(Clone, Copy)]
pub struct StencilContext<'a> {
    params: &'a FlowParameters,
    meshsize: &'a dyn Meshsize,
    dt: Real,
}

impl<'a> StencilContext<'a> {
    /// Construct a context.
    pub fn new(params: &'a FlowParameters, meshsize: &'a dyn Meshsize, dt: Real) -> Self {
        Self {
            params,
            meshsize,
            dt,
        }
    }

    /// Physical parameters.
    pub fn params(&self) -> &FlowParameters {
        self.params
    }

    /// Mesh spacing and positions.
    pub fn meshsize(&self) -> &dyn Meshsize {
        self.meshsize
    }

    /// Current timestep.
    pub fn dt(&self) -> Real {
        self.dt
    }
}

impl std::fmt::Debug for StencilContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StencilContext")
            .field("params", self.params)
            .field("dt", &self.dt)
            .finish()
    }
}
