//! Boundary stencils that pack and unpack ghost buffers.
//!
//! Both are driven by a `GhostLayerIterator`, which hands them the
//! boundary interior cell of every face in `k, j, i` order. The stencil
//! swaps in each layer of the face's [`FacePlan`] along the normal and
//! copies the planned components.

use eddy_core::Real;
use eddy_grid::{Cell, FlowField};
use eddy_stencil::{BoundaryStencil, Wall};

use crate::buffer::GhostBuffer;
use crate::geometry::FacePlan;
use crate::kind::HaloKind;

/// Plans indexed by `Face::index`; `None` for faces that are not exchanged.
pub type FacePlans = [Option<FacePlan>; 6];

fn load(kind: HaloKind, flow: &FlowField, cell: Cell, d: usize) -> Real {
    match kind {
        HaloKind::Pressure => flow.pressure[cell],
        HaloKind::Viscosity => flow.viscosity[cell],
        HaloKind::Velocity => flow.velocity[(cell, d)],
    }
}

fn store(kind: HaloKind, flow: &mut FlowField, cell: Cell, d: usize, value: Real) {
    match kind {
        HaloKind::Pressure => flow.pressure[cell] = value,
        HaloKind::Viscosity => flow.viscosity[cell] = value,
        HaloKind::Velocity => flow.velocity[(cell, d)] = value,
    }
}

// ── BufferFillStencil ──────────────────────────────────────────────

/// Packs the values next to each face into that face's send buffer.
#[derive(Debug)]
pub struct BufferFillStencil<'a> {
    kind: HaloKind,
    plans: &'a FacePlans,
    buffers: &'a mut [GhostBuffer; 6],
}

impl<'a> BufferFillStencil<'a> {
    /// Pack `kind` according to `plans` into `buffers`.
    pub fn new(kind: HaloKind, plans: &'a FacePlans, buffers: &'a mut [GhostBuffer; 6]) -> Self {
        Self {
            kind,
            plans,
            buffers,
        }
    }
}

impl BoundaryStencil for BufferFillStencil<'_> {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        let f = wall.face.index();
        let Some(plan) = &self.plans[f] else {
            return;
        };
        let axis = wall.axis();
        let buffer = &mut self.buffers[f];
        for copy in plan.layers() {
            let src = cell.with(axis, copy.layer);
            for d in copy.components.indices(plan.field_components()) {
                buffer.push(load(self.kind, flow, src, d));
            }
        }
    }
}

// ── BufferReadStencil ──────────────────────────────────────────────

/// Unpacks each face's receive buffer into its ghost cells.
#[derive(Debug)]
pub struct BufferReadStencil<'a> {
    kind: HaloKind,
    plans: &'a FacePlans,
    buffers: &'a mut [GhostBuffer; 6],
}

impl<'a> BufferReadStencil<'a> {
    /// Unpack `kind` according to `plans` from `buffers`.
    pub fn new(kind: HaloKind, plans: &'a FacePlans, buffers: &'a mut [GhostBuffer; 6]) -> Self {
        Self {
            kind,
            plans,
            buffers,
        }
    }
}

impl BoundaryStencil for BufferReadStencil<'_> {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        let f = wall.face.index();
        let Some(plan) = &self.plans[f] else {
            return;
        };
        let axis = wall.axis();
        let buffer = &mut self.buffers[f];
        for copy in plan.layers() {
            let dst = cell.with(axis, copy.layer);
            for d in copy.components.indices(plan.field_components()) {
                if let Some(value) = buffer.take() {
                    store(self.kind, flow, dst, d, value);
                }
            }
        }
    }
}
