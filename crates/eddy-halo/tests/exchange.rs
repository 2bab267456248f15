//! End-to-end ghost exchange over an in-process cluster.
//!
//! Interiors are filled from a function of global coordinates, ghost cells
//! inside the global domain are poisoned, and after the exchange every
//! ghost a read plan covers must hold the function's value again.

use eddy_core::{Axis, CommError, Dim, Face, HaloError, Rank, Real};
use eddy_grid::{Cell, Decomposition, FlowField, ParallelTopology, Subdomain};
use eddy_halo::{
    Communicator, ExchangeMode, FacePlan, HaloKind, LocalComm, ParallelManager, SerialComm,
};
use eddy_stencil::face_span;
use eddy_test_utils::{fill_all, fill_velocity_all, global_coords, run_ranks, SENTINEL};

fn pressure_of(g: [isize; 3]) -> Real {
    (g[0] + 10 * g[1] + 100 * g[2]) as Real
}

fn velocity_of(g: [isize; 3], d: usize) -> Real {
    pressure_of(g) + 1000.0 * (d + 1) as Real
}

fn viscosity_of(g: [isize; 3]) -> Real {
    0.5 * pressure_of(g)
}

fn inside(global: [usize; 3], g: [isize; 3], dim: Dim) -> bool {
    dim.axes()
        .iter()
        .all(|a| (0..global[a.index()] as isize).contains(&g[a.index()]))
}

fn is_interior(sd: &Subdomain, c: Cell) -> bool {
    [Axis::X, Axis::Y, Axis::Z]
        .iter()
        .all(|&a| sd.interior(a).contains(&c.get(a)))
}

/// A rank's fields: every cell holds its function value except ghost cells
/// that another rank owns, which hold [`SENTINEL`].
fn rank_flow(d: &Decomposition, rank: Rank) -> (FlowField, ParallelTopology) {
    let sd = d.subdomain(rank).unwrap();
    let mut flow = FlowField::new(sd);
    fill_all(&mut flow.pressure, &sd, pressure_of);
    fill_all(&mut flow.viscosity, &sd, viscosity_of);
    fill_velocity_all(&mut flow.velocity, &sd, velocity_of);
    let shape = sd.shape();
    for k in 0..shape.nz() {
        for j in 0..shape.ny() {
            for i in 0..shape.nx() {
                let c = Cell::new(i, j, k);
                let g = global_coords(&sd, i, j, k);
                if inside(d.global_size(), g, d.dim()) && !is_interior(&sd, c) {
                    flow.pressure[c] = SENTINEL;
                    flow.viscosity[c] = SENTINEL;
                    for v in flow.velocity.cell_mut(i, j, k) {
                        *v = SENTINEL;
                    }
                }
            }
        }
    }
    (flow, d.topology(rank).unwrap())
}

/// Ghost cells and components the read plan of `face` fills, leaving out
/// cells a second exchange does not refresh: padded index 0 along a
/// tangential axis and the triple corners of a 3D block.
fn read_targets(sd: &Subdomain, kind: HaloKind, face: Face) -> Vec<(Cell, usize)> {
    let plan = FacePlan::read(kind, sd, face);
    let normal = face.axis();
    let mut out = Vec::new();
    for layer in plan.layers() {
        let mut span = face_span(sd, face);
        span[normal.index()] = layer.layer..layer.layer + 1;
        for k in span[2].clone() {
            for j in span[1].clone() {
                for i in span[0].clone() {
                    let c = Cell::new(i, j, k);
                    let tangential_edge = sd
                        .dim()
                        .axes()
                        .iter()
                        .any(|&a| a != normal && c.get(a) == 0);
                    let outside = sd
                        .dim()
                        .axes()
                        .iter()
                        .filter(|&&a| !sd.interior(a).contains(&c.get(a)))
                        .count();
                    if tangential_edge || outside >= 3 {
                        continue;
                    }
                    for d in layer.components.indices(plan.field_components()) {
                        out.push((c, d));
                    }
                }
            }
        }
    }
    out
}

fn expected(kind: HaloKind, g: [isize; 3], d: usize) -> Real {
    match kind {
        HaloKind::Pressure => pressure_of(g),
        HaloKind::Velocity => velocity_of(g, d),
        HaloKind::Viscosity => viscosity_of(g),
    }
}

fn actual(kind: HaloKind, flow: &FlowField, c: Cell, d: usize) -> Real {
    match kind {
        HaloKind::Pressure => flow.pressure[c],
        HaloKind::Velocity => flow.velocity[(c, d)],
        HaloKind::Viscosity => flow.viscosity[c],
    }
}

/// Exchange every kind twice on every rank and return the fields.
fn exchange_all(d: Decomposition, mode: ExchangeMode) -> Vec<FlowField> {
    run_ranks(d.rank_count(), |mut comm| {
        let (mut flow, topo) = rank_flow(&d, comm.rank());
        let mut m = ParallelManager::new(topo, &flow, mode);
        for kind in HaloKind::ALL {
            m.communicate(kind, &mut comm, &mut flow).unwrap();
            m.communicate(kind, &mut comm, &mut flow).unwrap();
        }
        flow
    })
}

fn assert_mirrored(d: &Decomposition, flows: &[FlowField]) {
    for (r, flow) in flows.iter().enumerate() {
        let sd = d.subdomain(Rank(r)).unwrap();
        let topo = d.topology(Rank(r)).unwrap();
        for &face in d.dim().faces() {
            if topo.neighbour(face).is_none() {
                continue;
            }
            for kind in HaloKind::ALL {
                for (c, comp) in read_targets(&sd, kind, face) {
                    let g = global_coords(&sd, c.i, c.j, c.k);
                    assert_eq!(
                        actual(kind, flow, c, comp),
                        expected(kind, g, comp),
                        "rank {r} {kind} {face} ghost {c:?} component {comp}"
                    );
                }
            }
        }
    }
}

// ── Two ranks along x ──────────────────────────────────────────────

#[test]
fn two_ranks_trade_boundary_columns() {
    let d = Decomposition::new(Dim::Two, [8, 8, 1], [2, 1, 1]).unwrap();
    let flows = run_ranks(2, |mut comm| {
        let (mut flow, topo) = rank_flow(&d, comm.rank());
        let mut m = ParallelManager::new(topo, &flow, ExchangeMode::default());
        assert_eq!(m.send_len(HaloKind::Pressure, m.exchanged_faces()[0]), 8);
        m.communicate_pressure(&mut comm, &mut flow).unwrap();
        m.communicate_velocity(&mut comm, &mut flow).unwrap();
        (flow, m.stats())
    });

    let (left, left_stats) = &flows[0];
    let (right, _) = &flows[1];
    for j in 2..10 {
        let gj = (j - 2) as Real;
        // Rank 0's high ghost column is global column 4.
        assert_eq!(left.pressure.get(6, j, 0), 4.0 + 10.0 * gj);
        // Rank 1's low ghost column is global column 3.
        assert_eq!(right.pressure.get(1, j, 0), 3.0 + 10.0 * gj);
        // The second low ghost layer carries u of global column 2 only.
        assert_eq!(right.velocity.get(0, j, 0, 0), 1002.0 + 10.0 * gj);
        assert_eq!(right.velocity.get(0, j, 0, 1), SENTINEL);
        assert_eq!(right.velocity.get(1, j, 0, 1), 2003.0 + 10.0 * gj);
    }
    // Pressure: 8 values. Velocity from a high face: 8 rows of both
    // components plus u one layer further in.
    assert_eq!(left_stats.messages, 2);
    assert_eq!(left_stats.values, 8 + 24);
}

#[test]
fn global_wall_ghosts_are_untouched() {
    let d = Decomposition::new(Dim::Two, [6, 4, 1], [2, 1, 1]).unwrap();
    let flows = exchange_all(d, ExchangeMode::default());
    for j in 0..7 {
        // Rank 0's left wall and rank 1's right wall keep their values.
        let sd0 = d.subdomain(Rank(0)).unwrap();
        assert_eq!(
            flows[0].pressure.get(1, j, 0),
            pressure_of(global_coords(&sd0, 1, j, 0))
        );
        let sd1 = d.subdomain(Rank(1)).unwrap();
        assert_eq!(
            flows[1].pressure.get(5, j, 0),
            pressure_of(global_coords(&sd1, 5, j, 0))
        );
    }
}

// ── Corners ────────────────────────────────────────────────────────

#[test]
fn corner_ghost_needs_two_exchanges() {
    let d = Decomposition::new(Dim::Two, [8, 8, 1], [2, 2, 1]).unwrap();
    let corners = run_ranks(4, |mut comm| {
        let (mut flow, topo) = rank_flow(&d, comm.rank());
        let mut m = ParallelManager::new(topo, &flow, ExchangeMode::default());
        m.communicate_pressure(&mut comm, &mut flow).unwrap();
        let once = flow.pressure.get(6, 6, 0);
        m.communicate_pressure(&mut comm, &mut flow).unwrap();
        (once, flow.pressure.get(6, 6, 0))
    });
    // Rank 0's high-high corner ghost is global cell (4, 4) on rank 3.
    assert_eq!(corners[0], (SENTINEL, 44.0));
}

#[test]
fn double_exchange_mirrors_every_ghost_2d() {
    let d = Decomposition::new(Dim::Two, [7, 6, 1], [2, 3, 1]).unwrap();
    let flows = exchange_all(d, ExchangeMode::default());
    assert_mirrored(&d, &flows);
}

#[test]
fn double_exchange_mirrors_every_ghost_3d() {
    let d = Decomposition::new(Dim::Three, [4, 5, 4], [2, 2, 2]).unwrap();
    let flows = exchange_all(d, ExchangeMode::default());
    assert_mirrored(&d, &flows);
}

#[test]
fn posted_mode_matches_paired_mode() {
    let d = Decomposition::new(Dim::Three, [6, 4, 4], [3, 1, 2]).unwrap();
    let paired = exchange_all(d, ExchangeMode::PairedSendRecv);
    let posted = exchange_all(d, ExchangeMode::Posted);
    assert_eq!(paired, posted);
    assert_mirrored(&d, &posted);
}

// ── Failures ───────────────────────────────────────────────────────

#[test]
fn vanished_neighbour_is_a_communication_failure() {
    let d = Decomposition::new(Dim::Two, [4, 4, 1], [2, 1, 1]).unwrap();
    let mut comms = LocalComm::cluster(2);
    drop(comms.pop());
    let mut comm = comms.remove(0);
    let (mut flow, topo) = rank_flow(&d, Rank(0));
    let mut m = ParallelManager::new(topo, &flow, ExchangeMode::default());
    match m.communicate_pressure(&mut comm, &mut flow) {
        Err(HaloError::CommunicationFailure(CommError::PeerDisconnected { peer: Rank(1) })) => {}
        other => panic!("expected CommunicationFailure, got {other:?}"),
    }
}

#[test]
fn mis_sized_message_is_a_configuration_inconsistency() {
    let d = Decomposition::new(Dim::Two, [4, 8, 1], [2, 1, 1]).unwrap();
    let mut comms = LocalComm::cluster(2);
    let mut peer = comms.pop().unwrap();
    let mut comm = comms.pop().unwrap();
    // The right neighbour believes in a shorter column.
    peer.send(Rank(0), HaloKind::Pressure.tag(Face::Left), &[0.0; 5])
        .unwrap();

    let (mut flow, topo) = rank_flow(&d, Rank(0));
    let mut m = ParallelManager::new(topo, &flow, ExchangeMode::default());
    match m.communicate_pressure(&mut comm, &mut flow) {
        Err(HaloError::ConfigurationInconsistency {
            kind: "pressure",
            face: Face::Right,
            expected: 8,
            actual: 5,
        }) => {}
        other => panic!("expected ConfigurationInconsistency, got {other:?}"),
    }
}

#[test]
fn single_rank_never_touches_the_communicator() {
    let d = Decomposition::serial(Dim::Three, [3, 3, 3]).unwrap();
    let (mut flow, topo) = rank_flow(&d, Rank(0));
    let before = flow.clone();
    let mut m = ParallelManager::new(topo, &flow, ExchangeMode::Posted);
    for kind in HaloKind::ALL {
        m.communicate(kind, &mut SerialComm, &mut flow).unwrap();
    }
    assert_eq!(flow, before);
}
