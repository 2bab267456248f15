//! Intermediate momentum (F, G, H).

use eddy_core::{Axis, Real};
use eddy_grid::{Cell, FlowField};
use eddy_stencil::{FieldStencil, StencilContext};

use crate::{fluid_face, tangentially_interior};

/// Computes the intermediate momentum on every face the visited cell owns.
///
/// `F_d = u_d + dt * (nu * lap(u_d) - conv_d + g_d)`, with the convective
/// terms blended between central and donor-cell differences by `gamma`, and
/// `nu = 1/Re + nu_t` averaged onto the face.
///
/// Drive it with `FieldIterator::new(-1, 0)`: the extra low layer computes
/// the normal component on the low ghost face, which equals the value the
/// neighbouring rank computes for the same face. A component is only
/// written where the cell is interior along every other axis; faces that
/// touch an obstacle carry the velocity through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct FghStencil;

impl FghStencil {
    fn momentum(ctx: &StencilContext<'_>, flow: &FlowField, c: Cell, d: Axis) -> Real {
        let u = &flow.velocity;
        let params = ctx.params();
        let mesh = ctx.meshsize();
        let dd = d.index();
        let gamma = params.gamma;

        let u0 = u[(c, dd)];
        let mut laplacian = 0.0;
        let mut convection = 0.0;
        for &e in params.dim.axes() {
            let ee = e.index();
            let h = mesh.spacing(e, c.i, c.j, c.k);
            let up = u[(c.plus(e), dd)];
            let um = u[(c.minus(e), dd)];
            laplacian += (up - 2.0 * u0 + um) / (h * h);

            // Transport velocity along e, interpolated to the two edges of
            // the d-face that bound it along e.
            let (kr, kl) = if e == d {
                (0.5 * (u0 + up), 0.5 * (um + u0))
            } else {
                let cm = c.minus(e);
                (
                    0.5 * (u[(c, ee)] + u[(c.plus(d), ee)]),
                    0.5 * (u[(cm, ee)] + u[(cm.plus(d), ee)]),
                )
            };
            let central = kr * 0.5 * (u0 + up) - kl * 0.5 * (um + u0);
            let donor = kr.abs() * 0.5 * (u0 - up) - kl.abs() * 0.5 * (um - u0);
            convection += (central + gamma * donor) / h;
        }

        let nt = c.plus(d);
        let nu = params.viscosity()
            + 0.5
                * (flow.viscosity.get(c.i, c.j, c.k) + flow.viscosity.get(nt.i, nt.j, nt.k));
        u0 + ctx.dt() * (nu * laplacian - convection + params.body_force[dd])
    }
}

impl FieldStencil for FghStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        for &d in ctx.params().dim.axes() {
            if !tangentially_interior(flow, cell, d) {
                continue;
            }
            let value = if fluid_face(flow, cell, d) {
                Self::momentum(ctx, flow, cell, d)
            } else {
                flow.velocity[(cell, d.index())]
            };
            flow.fgh[(cell, d.index())] = value;
        }
    }
}
