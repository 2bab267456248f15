//! Prandtl mixing-length turbulence closure.
//!
//! Wall distance and mixing length are computed once at initialisation;
//! the eddy viscosity is recomputed at the start of every step and its
//! ghost layers exchanged like pressure.

use eddy_core::{Axis, Dim, Real};
use eddy_grid::{Cell, FlowField, Meshsize};
use eddy_stencil::{FieldStencil, StencilContext};

/// Von Kármán constant.
pub const KARMAN: Real = 0.41;

/// Boundary-layer thickness model limiting the mixing length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryLayer {
    /// No limit: `l_m = kappa * h`.
    #[default]
    None,
    /// Laminar flat plate, `delta = 4.91 x / sqrt(Re_x)`.
    Laminar,
    /// Turbulent flat plate, `delta = 0.382 x / Re_x^0.2`.
    Turbulent,
}

impl BoundaryLayer {
    /// Boundary-layer thickness at streamwise position `x`, or `None` when
    /// the model imposes no limit.
    pub fn thickness(self, x: Real, reynolds: Real) -> Option<Real> {
        let rex = reynolds * x;
        match self {
            Self::None => None,
            _ if x <= 0.0 => Some(0.0),
            Self::Laminar => Some(4.91 * x / rex.sqrt()),
            Self::Turbulent => Some(0.382 * x / rex.powf(0.2)),
        }
    }
}

fn centre(mesh: &dyn Meshsize, axis: Axis, c: Cell) -> Real {
    mesh.position(axis, c.i, c.j, c.k) + 0.5 * mesh.spacing(axis, c.i, c.j, c.k)
}

// ── WallDistanceStencil ────────────────────────────────────────────

/// Distance from the cell centre to the nearest wall of a channel,
/// optionally with a backward-facing step in its lower-left corner.
#[derive(Clone, Debug)]
pub struct WallDistanceStencil {
    lengths: [Real; 3],
    step: Option<(Real, Real)>,
}

impl WallDistanceStencil {
    /// Channel of the given lengths. `step` is the step's extent along x
    /// and y, if any.
    pub fn new(lengths: [Real; 3], step: Option<(Real, Real)>) -> Self {
        Self { lengths, step }
    }
}

impl FieldStencil for WallDistanceStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        let x = centre(mesh, Axis::X, cell);
        let y = centre(mesh, Axis::Y, cell);
        let ly = self.lengths[1];

        let mut h = match self.step {
            Some((sx, sy)) if y <= sy && x > sx => (x - sx).min(y).min(ly - y),
            Some((sx, sy)) if x < sx => (y - sy).min(ly - y),
            _ => y.min(ly - y),
        };
        if ctx.params().dim == Dim::Three {
            let z = centre(mesh, Axis::Z, cell);
            h = h.min(z).min(self.lengths[2] - z);
        }
        flow.wall_distance[cell] = h;
    }
}

// ── MixingLengthStencil ────────────────────────────────────────────

/// `l_m = min(kappa * h, 0.09 * delta(x))`.
#[derive(Clone, Debug)]
pub struct MixingLengthStencil {
    boundary_layer: BoundaryLayer,
}

impl MixingLengthStencil {
    /// Mixing length limited by `boundary_layer`.
    pub fn new(boundary_layer: BoundaryLayer) -> Self {
        Self { boundary_layer }
    }
}

impl FieldStencil for MixingLengthStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let h = flow.wall_distance[cell];
        let x = centre(ctx.meshsize(), Axis::X, cell);
        let lm = match self.boundary_layer.thickness(x, ctx.params().reynolds) {
            Some(delta) => (KARMAN * h).min(0.09 * delta),
            None => KARMAN * h,
        };
        flow.mixing_length[cell] = lm;
    }
}

// ── EddyViscosityStencil ───────────────────────────────────────────

/// `nu_t = l_m^2 * sqrt(S_ij S_ij)` from the cell-centred strain rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct EddyViscosityStencil;

impl EddyViscosityStencil {
    /// `d u_d / d x_e` at the centre of `c`.
    fn gradient(flow: &FlowField, mesh: &dyn Meshsize, c: Cell, d: Axis, e: Axis) -> Real {
        let u = &flow.velocity;
        let dd = d.index();
        if d == e {
            let h = mesh.spacing(e, c.i, c.j, c.k);
            return (u[(c, dd)] - u[(c.minus(d), dd)]) / h;
        }
        // Cell-centred u_d in the neighbours along e, central difference.
        let at = |cell: Cell| 0.5 * (u[(cell, dd)] + u[(cell.minus(d), dd)]);
        let up = c.plus(e);
        let dn = c.minus(e);
        let dist = mesh.spacing(e, c.i, c.j, c.k)
            + 0.5 * (mesh.spacing(e, up.i, up.j, up.k) + mesh.spacing(e, dn.i, dn.j, dn.k));
        (at(up) - at(dn)) / dist
    }
}

impl FieldStencil for EddyViscosityStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        let axes = ctx.params().dim.axes();
        let mut sum = 0.0;
        for (n, &d) in axes.iter().enumerate() {
            let sdd = Self::gradient(flow, mesh, cell, d, d);
            sum += sdd * sdd;
            for &e in &axes[n + 1..] {
                let sde = 0.5
                    * (Self::gradient(flow, mesh, cell, d, e)
                        + Self::gradient(flow, mesh, cell, e, d));
                sum += 2.0 * sde * sde;
            }
        }
        let lm = flow.mixing_length[cell];
        flow.viscosity[cell] = lm * lm * sum.sqrt();
    }
}
