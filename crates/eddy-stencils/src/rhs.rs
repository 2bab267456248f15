//! Right-hand side of the pressure Poisson equation.

use eddy_grid::{Cell, FlowField};
use eddy_stencil::{FieldStencil, StencilContext};

/// `rhs = div(F, G, H) / dt` at the cell centre.
#[derive(Clone, Copy, Debug, Default)]
pub struct RhsStencil;

impl FieldStencil for RhsStencil {
    fn apply(&mut self, ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        let mesh = ctx.meshsize();
        let mut div = 0.0;
        for &d in ctx.params().dim.axes() {
            let dd = d.index();
            let h = mesh.spacing(d, cell.i, cell.j, cell.k);
            div += (flow.fgh[(cell, dd)] - flow.fgh[(cell.minus(d), dd)]) / h;
        }
        flow.rhs[cell] = div / ctx.dt();
    }
}
