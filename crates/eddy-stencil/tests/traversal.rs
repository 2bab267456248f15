//! Traversal properties over randomly sized subdomains.
//!
//! The interior sweep visits every interior cell exactly once, and the
//! face spans of two ranks sharing a face enumerate the same number of
//! tangential positions.

use eddy_core::{Dim, Face};
use eddy_grid::{Cell, Decomposition, FlowField, Subdomain, UniformMeshsize};
use eddy_stencil::{face_span, FieldIterator, FieldStencil, FlowParameters, StencilContext};
use proptest::prelude::*;

struct Counter {
    visits: Vec<Cell>,
}

impl FieldStencil for Counter {
    fn apply(&mut self, _ctx: &StencilContext<'_>, flow: &mut FlowField, cell: Cell) {
        *flow.pressure.get_mut(cell.i, cell.j, cell.k) += 1.0;
        self.visits.push(cell);
    }
}

fn span_len(span: &[std::ops::Range<usize>; 3]) -> usize {
    span.iter().map(|r| r.len()).product()
}

proptest! {
    #[test]
    fn interior_sweep_visits_each_cell_once(
        nx in 1usize..8,
        ny in 1usize..8,
        nz in 1usize..5,
        three_d in any::<bool>(),
    ) {
        let dim = if three_d { Dim::Three } else { Dim::Two };
        let sd = Subdomain::whole(dim, [nx, ny, nz]).unwrap();
        let mesh = UniformMeshsize::new(sd, sd.local_size(), [1.0; 3]);
        let params = FlowParameters {
            dim,
            reynolds: 10.0,
            gamma: 0.0,
            body_force: [0.0; 3],
        };
        let ctx = StencilContext::new(&params, &mesh, 1.0);
        let mut flow = FlowField::new(sd);
        let mut counter = Counter { visits: Vec::new() };
        FieldIterator::interior().iterate(&mut counter, &ctx, &mut flow);

        prop_assert_eq!(counter.visits.len(), sd.interior_cells());
        let total: f64 = flow.pressure.as_slice().iter().map(|&v| v as f64).sum();
        prop_assert_eq!(total as usize, sd.interior_cells());
        prop_assert!(flow.pressure.as_slice().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn neighbouring_face_spans_agree(
        nx in 2usize..12,
        ny in 2usize..12,
        nz in 2usize..6,
        px in 1usize..3,
        py in 1usize..3,
        pz in 1usize..3,
    ) {
        let d = Decomposition::new(Dim::Three, [nx, ny, nz], [px, py, pz]).unwrap();
        for r in 0..d.rank_count() {
            let rank = eddy_core::Rank(r);
            let sd = d.subdomain(rank).unwrap();
            let topo = d.topology(rank).unwrap();
            for &face in Dim::Three.faces() {
                if let Some(n) = topo.neighbour(face) {
                    let nsd = d.subdomain(n).unwrap();
                    let mine = face_span(&sd, face);
                    let theirs = face_span(&nsd, face.opposite());
                    prop_assert_eq!(span_len(&mine), span_len(&theirs));
                    prop_assert_eq!(mine[face.axis().index()].len(), 1);
                }
            }
        }
    }
}

#[test]
fn two_d_spans_stay_in_one_plane() {
    let sd = Subdomain::whole(Dim::Two, [5, 4, 1]).unwrap();
    for face in Dim::Two.faces() {
        assert_eq!(face_span(&sd, *face)[2], 0..1);
    }
    assert_eq!(span_len(&face_span(&sd, Face::Left)), 4);
    assert_eq!(span_len(&face_span(&sd, Face::Top)), 8);
}
