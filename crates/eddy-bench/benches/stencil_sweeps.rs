//! Criterion micro-benchmarks for the field iterator driving the
//! per-cell stencils of a timestep.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use eddy_core::Dim;
use eddy_grid::{FlowField, Subdomain, UniformMeshsize};
use eddy_stencil::{FieldIterator, FlowParameters, StencilContext};
use eddy_stencils::{FghStencil, MaxVelocityStencil, RhsStencil, VelocityStencil};
use eddy_test_utils::{fill_velocity_all, SeededField};

fn setup(dim: Dim, size: [usize; 3]) -> (FlowField, UniformMeshsize, FlowParameters) {
    let sd = Subdomain::whole(dim, size).unwrap();
    let mut flow = FlowField::new(sd);
    let seeded = SeededField::new(42, dim, size);
    fill_velocity_all(&mut flow.velocity, &sd, |g, d| seeded.component(g, d));
    let mesh = UniformMeshsize::new(sd, size, [1.0; 3]);
    let params = FlowParameters {
        dim,
        reynolds: 100.0,
        gamma: 0.5,
        body_force: [0.0; 3],
    };
    (flow, mesh, params)
}

fn bench_momentum_2d(c: &mut Criterion) {
    let (mut flow, mesh, params) = setup(Dim::Two, [128, 128, 1]);
    let ctx = StencilContext::new(&params, &mesh, 0.001);
    let sweep = FieldIterator::new(-1, 0);
    c.bench_function("fgh_128x128", |b| {
        b.iter(|| {
            sweep.iterate(&mut FghStencil, &ctx, &mut flow);
            black_box(&flow.fgh);
        });
    });
}

fn bench_momentum_3d(c: &mut Criterion) {
    let (mut flow, mesh, params) = setup(Dim::Three, [48, 48, 48]);
    let ctx = StencilContext::new(&params, &mesh, 0.001);
    let sweep = FieldIterator::new(-1, 0);
    c.bench_function("fgh_48x48x48", |b| {
        b.iter(|| {
            sweep.iterate(&mut FghStencil, &ctx, &mut flow);
            black_box(&flow.fgh);
        });
    });
}

fn bench_rhs_and_correction(c: &mut Criterion) {
    let (mut flow, mesh, params) = setup(Dim::Two, [128, 128, 1]);
    let ctx = StencilContext::new(&params, &mesh, 0.001);
    FieldIterator::new(-1, 0).iterate(&mut FghStencil, &ctx, &mut flow);
    c.bench_function("rhs_128x128", |b| {
        b.iter(|| {
            FieldIterator::interior().iterate(&mut RhsStencil, &ctx, &mut flow);
            black_box(&flow.rhs);
        });
    });
    c.bench_function("velocity_128x128", |b| {
        b.iter(|| {
            FieldIterator::interior().iterate(&mut VelocityStencil, &ctx, &mut flow);
            black_box(&flow.velocity);
        });
    });
}

fn bench_max_velocity(c: &mut Criterion) {
    let (mut flow, mesh, params) = setup(Dim::Two, [128, 128, 1]);
    let ctx = StencilContext::new(&params, &mesh, 0.001);
    let mut stencil = MaxVelocityStencil::new();
    c.bench_function("max_velocity_128x128", |b| {
        b.iter(|| {
            stencil.reset();
            FieldIterator::new(-1, 0).iterate(&mut stencil, &ctx, &mut flow);
            black_box(stencil.max_velocity());
        });
    });
}

criterion_group!(
    benches,
    bench_momentum_2d,
    bench_momentum_3d,
    bench_rhs_and_correction,
    bench_max_velocity
);
criterion_main!(benches);
