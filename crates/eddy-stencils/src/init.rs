//! Scenario initial conditions.

use std::f64::consts::PI;

use eddy_core::{Axis, Real};
use eddy_grid::{Cell, FlowField};
use eddy_stencil::{FieldStencil, StencilContext};

/// Taylor–Green vortex in the x-y plane, one period across the domain.
///
/// `u = sin(2 pi x / Lx) cos(2 pi y / Ly)` and
/// `v = -(Ly / Lx) cos(2 pi x / Lx) sin(2 pi y / Ly)`, sampled at the face
/// each component lives on. The field is divergence free. Drive it over the
/// whole padded grid with `FieldIterator::new(-2, 1)`; other components
/// are left at zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaylorGreenInit;

impl FieldStencil for TaylorGreenInit {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        let two_pi = 2.0 * PI as Real;
        let lx = mesh.domain_length(Axis::X);
        let ly = mesh.domain_length(Axis::Y);
        let (i, j, k) = (cell.i, cell.j, cell.k);

        let x_low = mesh.position(Axis::X, i, j, k);
        let y_low = mesh.position(Axis::Y, i, j, k);
        let hx = mesh.spacing(Axis::X, i, j, k);
        let hy = mesh.spacing(Axis::Y, i, j, k);

        let (x, y) = (x_low + hx, y_low + 0.5 * hy);
        flow.velocity.set(i, j, k, 0, (two_pi * x / lx).sin() * (two_pi * y / ly).cos());

        let (x, y) = (x_low + 0.5 * hx, y_low + hy);
        let v = -(ly / lx) * (two_pi * x / lx).cos() * (two_pi * y / ly).sin();
        flow.velocity.set(i, j, k, 1, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Dim;
    use eddy_grid::{Meshsize, Subdomain, UniformMeshsize};
    use eddy_stencil::{FieldIterator, FlowParameters};

    #[test]
    fn vortex_is_divergence_free_and_fills_ghosts() {
        let sd = Subdomain::whole(Dim::Two, [8, 8, 1]).unwrap();
        let mesh = UniformMeshsize::new(sd, [8, 8, 1], [1.0, 2.0, 1.0]);
        let p = FlowParameters {
            dim: Dim::Two,
            reynolds: 100.0,
            gamma: 0.0,
            body_force: [0.0; 3],
        };
        let ctx = StencilContext::new(&p, &mesh, 0.1);
        let mut flow = FlowField::new(sd);
        FieldIterator::new(-2, 1).iterate(&mut TaylorGreenInit, &ctx, &mut flow);

        let (hx, hy) = (mesh.spacing(Axis::X, 0, 0, 0), mesh.spacing(Axis::Y, 0, 0, 0));
        for j in 2..10 {
            for i in 2..10 {
                let div = (flow.velocity.get(i, j, 0, 0) - flow.velocity.get(i - 1, j, 0, 0)) / hx
                    + (flow.velocity.get(i, j, 0, 1) - flow.velocity.get(i, j - 1, 0, 1)) / hy;
                assert!(div.abs() < 1e-12, "divergence {div} at ({i}, {j})");
            }
        }
        // Periodic: the low ghost column matches the last interior column.
        let a = flow.velocity.get(1, 4, 0, 0);
        let b = flow.velocity.get(9, 4, 0, 0);
        assert!((a - b).abs() < 1e-12);
        assert!(flow.velocity.get(0, 4, 0, 0) != 0.0);
    }
}
