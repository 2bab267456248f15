//! Local stable-timestep reductions.
//!
//! Both stencils accumulate into `self` and must be reset before every
//! sweep. The orchestrator combines the local bound across ranks with a
//! global minimum.

use eddy_core::{Dim, Real};
use eddy_grid::{Cell, FlowField, Meshsize};
use eddy_stencil::{FieldStencil, StencilContext};

/// Diffusive bound `1 / (2 * nu * sum_d 1/h_d^2)`.
fn diffusive_limit(nu: Real, spacing: [Real; 3], dim: Dim) -> Real {
    let factor: Real = dim
        .axes()
        .iter()
        .map(|a| 1.0 / (spacing[a.index()] * spacing[a.index()]))
        .sum();
    1.0 / (2.0 * nu * factor)
}

// ── MaxVelocityStencil ─────────────────────────────────────────────

/// Tracks `max |u_d| / h_d` per axis over the visited cells.
#[derive(Clone, Debug, Default)]
pub struct MaxVelocityStencil {
    max: [Real; 3],
}

impl MaxVelocityStencil {
    /// A stencil with all maxima at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the accumulated maxima.
    pub fn reset(&mut self) {
        self.max = [0.0; 3];
    }

    /// Accumulated `max |u_d| / h_d` per axis.
    pub fn max_velocity(&self) -> [Real; 3] {
        self.max
    }

    /// Largest stable dt on this rank before the safety factor:
    /// the minimum of the diffusive bound for viscosity `1/Re` on the
    /// finest mesh spacing and `1 / max_d` for every axis.
    pub fn local_dt(&self, reynolds: Real, mesh: &dyn Meshsize, dim: Dim) -> Real {
        let mut dt = diffusive_bound(reynolds, mesh, dim);
        for &a in dim.axes() {
            let m = self.max[a.index()];
            if m > 0.0 {
                dt = dt.min(1.0 / m);
            }
        }
        dt
    }
}

impl FieldStencil for MaxVelocityStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        for &a in ctx.params().dim.axes() {
            let h = mesh.spacing(a, cell.i, cell.j, cell.k);
            let v = flow.velocity[(cell, a.index())].abs() / h;
            if v > self.max[a.index()] {
                self.max[a.index()] = v;
            }
        }
    }
}

// ── TurbulentTimestepStencil ───────────────────────────────────────

/// Per-cell minimum of the convective and diffusive bounds with the
/// effective viscosity `1/Re + nu_t`. Obstacle cells are skipped.
#[derive(Clone, Debug)]
pub struct TurbulentTimestepStencil {
    dt: Real,
}

impl Default for TurbulentTimestepStencil {
    fn default() -> Self {
        Self { dt: Real::INFINITY }
    }
}

impl TurbulentTimestepStencil {
    /// A stencil with no bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the accumulated bound.
    pub fn reset(&mut self) {
        self.dt = Real::INFINITY;
    }

    /// Smallest per-cell bound seen since the last reset.
    pub fn local_dt(&self) -> Real {
        self.dt
    }
}

impl FieldStencil for TurbulentTimestepStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        if !flow.flags.is_fluid(cell.i, cell.j, cell.k) {
            return;
        }
        let params = ctx.params();
        let mesh = ctx.meshsize();
        let nu = params.viscosity() + flow.viscosity[cell];
        let mut spacing = [1.0; 3];
        for &a in params.dim.axes() {
            spacing[a.index()] = mesh.spacing(a, cell.i, cell.j, cell.k);
        }
        let mut cell_dt = diffusive_limit(nu, spacing, params.dim);
        for &a in params.dim.axes() {
            let u = flow.velocity[(cell, a.index())].abs();
            if u > 0.0 {
                cell_dt = cell_dt.min(spacing[a.index()] / u);
            }
        }
        if cell_dt < self.dt {
            self.dt = cell_dt;
        }
    }
}

/// Diffusive bound for viscosity `1/Re` on the finest spacing of `mesh`.
pub fn diffusive_bound(reynolds: Real, mesh: &dyn Meshsize, dim: Dim) -> Real {
    let mut spacing = [1.0; 3];
    for &a in dim.axes() {
        spacing[a.index()] = mesh.min_spacing(a);
    }
    diffusive_limit(1.0 / reynolds, spacing, dim)
}
