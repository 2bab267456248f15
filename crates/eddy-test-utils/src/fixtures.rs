//! Field fixtures defined over global coordinates.
//!
//! A value that depends only on the global cell index is the same on
//! every rank that stores the cell, as interior or as ghost. Tests fill
//! interiors from such a function, poison the ghosts with [`SENTINEL`],
//! exchange, and compare the ghosts against the function.

use eddy_core::{Axis, Dim, Real, GHOST_HIGH, GHOST_LOW};
use eddy_grid::{ScalarField, Subdomain, VectorField};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ghost poison: no fixture function ever produces it.
pub const SENTINEL: Real = -999.0;

/// Global cell index of padded local cell `(i, j, k)`.
pub fn global_coords(sd: &Subdomain, i: usize, j: usize, k: usize) -> [isize; 3] {
    [
        sd.global_index(Axis::X, i),
        sd.global_index(Axis::Y, j),
        sd.global_index(Axis::Z, k),
    ]
}

fn padded(sd: &Subdomain) -> [std::ops::Range<usize>; 3] {
    [
        0..sd.padded(Axis::X),
        0..sd.padded(Axis::Y),
        0..sd.padded(Axis::Z),
    ]
}

fn interior(sd: &Subdomain) -> [std::ops::Range<usize>; 3] {
    [
        sd.interior(Axis::X),
        sd.interior(Axis::Y),
        sd.interior(Axis::Z),
    ]
}

fn for_each(ranges: [std::ops::Range<usize>; 3], mut f: impl FnMut(usize, usize, usize)) {
    let [rx, ry, rz] = ranges;
    for k in rz {
        for j in ry.clone() {
            for i in rx.clone() {
                f(i, j, k);
            }
        }
    }
}

/// Set every interior cell of `field` to `f(global)`.
pub fn fill_interior(field: &mut ScalarField, sd: &Subdomain, f: impl Fn([isize; 3]) -> Real) {
    for_each(interior(sd), |i, j, k| {
        field.set(i, j, k, f(global_coords(sd, i, j, k)));
    });
}

/// Set every cell of `field`, ghosts included, to `f(global)`.
pub fn fill_all(field: &mut ScalarField, sd: &Subdomain, f: impl Fn([isize; 3]) -> Real) {
    for_each(padded(sd), |i, j, k| {
        field.set(i, j, k, f(global_coords(sd, i, j, k)));
    });
}

/// Set component `d` of every interior cell to `f(global, d)`.
pub fn fill_velocity_interior(
    field: &mut VectorField,
    sd: &Subdomain,
    f: impl Fn([isize; 3], usize) -> Real,
) {
    let components = field.components();
    for_each(interior(sd), |i, j, k| {
        let g = global_coords(sd, i, j, k);
        for d in 0..components {
            field.set(i, j, k, d, f(g, d));
        }
    });
}

/// Set component `d` of every cell, ghosts included, to `f(global, d)`.
pub fn fill_velocity_all(
    field: &mut VectorField,
    sd: &Subdomain,
    f: impl Fn([isize; 3], usize) -> Real,
) {
    let components = field.components();
    for_each(padded(sd), |i, j, k| {
        let g = global_coords(sd, i, j, k);
        for d in 0..components {
            field.set(i, j, k, d, f(g, d));
        }
    });
}

// ── SeededField ────────────────────────────────────────────────────

/// Random values over the padded global box, reproducible from a seed.
///
/// Covers global indices `[-GHOST_LOW, n + GHOST_HIGH)` on every active
/// axis, so any rank's ghost cells can be looked up.
#[derive(Clone, Debug)]
pub struct SeededField {
    extents: [usize; 3],
    values: Vec<Real>,
}

impl SeededField {
    /// Uniform values in `[-1, 1)` drawn from a ChaCha8 stream.
    pub fn new(seed: u64, dim: Dim, global_size: [usize; 3]) -> Self {
        let mut extents = [1; 3];
        for &axis in dim.axes() {
            let a = axis.index();
            extents[a] = global_size[a] + GHOST_LOW + GHOST_HIGH;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let values = (0..extents.iter().product::<usize>())
            .map(|_| rng.random_range(-1.0..1.0))
            .collect();
        Self { extents, values }
    }

    /// Value at global cell `g`.
    pub fn value(&self, g: [isize; 3]) -> Real {
        let mut idx = [0usize; 3];
        for a in 0..3 {
            idx[a] = if self.extents[a] == 1 {
                0
            } else {
                (g[a] + GHOST_LOW as isize) as usize
            };
        }
        let [nx, ny, _] = self.extents;
        self.values[idx[0] + nx * (idx[1] + ny * idx[2])]
    }

    /// A distinct value per component, for staggered fields.
    pub fn component(&self, g: [isize; 3], d: usize) -> Real {
        self.value(g) + 10.0 * d as Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = SeededField::new(7, Dim::Two, [4, 3, 1]);
        let b = SeededField::new(7, Dim::Two, [4, 3, 1]);
        let c = SeededField::new(8, Dim::Two, [4, 3, 1]);
        assert_eq!(a.value([-2, -2, 0]), b.value([-2, -2, 0]));
        assert_eq!(a.value([4, 3, 0]), b.value([4, 3, 0]));
        assert_ne!(a.value([1, 1, 0]), c.value([1, 1, 0]));
    }

    #[test]
    fn interior_fill_leaves_ghosts() {
        let sd = Subdomain::new(Dim::Two, [2, 2, 1], [2, 0, 0]).unwrap();
        let mut field = ScalarField::filled(sd.shape(), SENTINEL);
        fill_interior(&mut field, &sd, |g| (g[0] + 10 * g[1]) as Real);
        assert_eq!(field.get(2, 2, 0), 2.0);
        assert_eq!(field.get(3, 3, 0), 13.0);
        assert_eq!(field.get(1, 2, 0), SENTINEL);
        assert_eq!(field.get(4, 2, 0), SENTINEL);
    }
}
