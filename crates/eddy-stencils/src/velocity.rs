//! Velocity correction and obstacle fix-up.

use eddy_grid::{Cell, FlowField};
use eddy_stencil::{FieldStencil, StencilContext};

use crate::fluid_face;

/// Projects the intermediate momentum onto a divergence-free field:
/// `u_d = F_d - dt * dp/dx_d` on every fluid face the cell owns.
#[derive(Clone, Copy, Debug, Default)]
pub struct VelocityStencil;

impl FieldStencil for VelocityStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        for &d in ctx.params().dim.axes() {
            if !fluid_face(flow, cell, d) {
                continue;
            }
            let n = cell.plus(d);
            let dist = 0.5
                * (mesh.spacing(d, cell.i, cell.j, cell.k) + mesh.spacing(d, n.i, n.j, n.k));
            let dp = flow.pressure[n] - flow.pressure[cell];
            let dd = d.index();
            flow.velocity[(cell, dd)] = flow.fgh[(cell, dd)] - ctx.dt() / dist * dp;
        }
    }
}

/// Zeroes the velocity on every face the cell owns that touches an
/// obstacle.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObstacleStencil;

impl FieldStencil for ObstacleStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        for &d in ctx.params().dim.axes() {
            if !fluid_face(flow, cell, d) {
                flow.velocity[(cell, d.index())] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::{Dim, Real};
    use eddy_grid::{FlagField, Subdomain, UniformMeshsize};
    use eddy_stencil::{FieldIterator, FlowParameters};

    fn params() -> FlowParameters {
        FlowParameters {
            dim: Dim::Two,
            reynolds: 1.0,
            gamma: 0.0,
            body_force: [0.0; 3],
        }
    }

    #[test]
    fn pressure_gradient_corrects_velocity() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let mesh = UniformMeshsize::new(sd, [4, 4, 1], [1.0; 3]);
        let p = params();
        let ctx = StencilContext::new(&p, &mesh, 0.1);
        let mut flow = FlowField::new(sd);
        flow.fgh.fill(1.0);
        for j in 0..7 {
            for i in 0..7 {
                flow.pressure.set(i, j, 0, i as Real);
            }
        }
        FieldIterator::interior().iterate(&mut VelocityStencil, &ctx, &mut flow);
        // dp/dx = 1 / 0.25 = 4, times dt = 0.4.
        assert!((flow.velocity.get(3, 3, 0, 0) - 0.6).abs() < 1e-12);
        assert!((flow.velocity.get(3, 3, 0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn obstacle_faces_are_zeroed() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let mesh = UniformMeshsize::new(sd, [4, 4, 1], [1.0; 3]);
        let p = params();
        let ctx = StencilContext::new(&p, &mesh, 0.1);
        let flags = FlagField::from_geometry(&sd, |g| g[0] == 2 && g[1] == 2);
        let mut flow = FlowField::with_flags(sd, flags);
        flow.velocity.fill(1.0);
        FieldIterator::interior().iterate(&mut ObstacleStencil, &ctx, &mut flow);
        // Solid cell is padded (4, 4).
        assert_eq!(flow.velocity.get(4, 4, 0, 0), 0.0);
        assert_eq!(flow.velocity.get(4, 4, 0, 1), 0.0);
        assert_eq!(flow.velocity.get(3, 4, 0, 0), 0.0);
        assert_eq!(flow.velocity.get(4, 3, 0, 1), 0.0);
        assert_eq!(flow.velocity.get(3, 4, 0, 1), 1.0);
        assert_eq!(flow.velocity.get(2, 2, 0, 0), 1.0);
    }
}
