//! Dense scalar and vector storage over the padded grid.
//!
//! All fields share the x-fastest layout of [`GridShape`]:
//! `index = i + nx * (j + ny * k)`. A row is the run of cells with fixed
//! `(j, k)`, contiguous in memory, which is what the bulk-copy accessors
//! ([`ScalarField::row`], [`VectorField::row`]) hand out.
//!
//! Indices must lie within the padded extents. Element access is checked
//! by the slice index; there is no separate validation layer on the hot
//! path.

use std::ops::{Index, IndexMut};

use eddy_core::{Axis, Real};

// ── Cell ───────────────────────────────────────────────────────────

/// Padded integer coordinates of one cell. In 2D `k` is always 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// x index.
    pub i: usize,
    /// y index.
    pub j: usize,
    /// z index.
    pub k: usize,
}

impl Cell {
    /// Construct from explicit coordinates.
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// Coordinate along `axis`.
    pub fn get(self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.i,
            Axis::Y => self.j,
            Axis::Z => self.k,
        }
    }

    /// The next cell along `axis`.
    pub fn plus(self, axis: Axis) -> Self {
        self.with(axis, self.get(axis) + 1)
    }

    /// The previous cell along `axis`. The coordinate must be positive.
    pub fn minus(self, axis: Axis) -> Self {
        self.with(axis, self.get(axis) - 1)
    }

    /// This cell with the coordinate along `axis` replaced.
    pub fn with(self, axis: Axis, value: usize) -> Self {
        let mut c = self;
        match axis {
            Axis::X => c.i = value,
            Axis::Y => c.j = value,
            Axis::Z => c.k = value,
        }
        c
    }
}

// ── GridShape ──────────────────────────────────────────────────────

/// Padded extents of a field: `nx * ny * nz` cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl GridShape {
    /// Create a shape from padded extents.
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Padded extent along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Padded extent along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Padded extent along z (1 in 2D).
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Padded extent along `axis`.
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.nx,
            Axis::Y => self.ny,
            Axis::Z => self.nz,
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Whether the shape has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny && k < self.nz);
        i + self.nx * (j + self.ny * k)
    }
}

// ── ScalarField ────────────────────────────────────────────────────

/// One value per cell over the padded grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    shape: GridShape,
    data: Vec<Real>,
}

impl ScalarField {
    /// A zero-filled field.
    pub fn new(shape: GridShape) -> Self {
        Self::filled(shape, 0.0)
    }

    /// A field with every cell set to `value`.
    pub fn filled(shape: GridShape, value: Real) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    /// The padded extents.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Padded extent along x.
    pub fn nx(&self) -> usize {
        self.shape.nx
    }

    /// Padded extent along y.
    pub fn ny(&self) -> usize {
        self.shape.ny
    }

    /// Padded extent along z.
    pub fn nz(&self) -> usize {
        self.shape.nz
    }

    /// Value at `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Real {
        self.data[self.shape.index(i, j, k)]
    }

    /// Mutable reference to the value at `(i, j, k)`.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut Real {
        let idx = self.shape.index(i, j, k);
        &mut self.data[idx]
    }

    /// Overwrite the value at `(i, j, k)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: Real) {
        *self.get_mut(i, j, k) = value;
    }

    /// Offset of the first cell of row `(j, k)` in [`as_slice`](Self::as_slice).
    pub fn row_offset(&self, j: usize, k: usize) -> usize {
        self.shape.index(0, j, k)
    }

    /// The contiguous row `(j, k)`.
    pub fn row(&self, j: usize, k: usize) -> &[Real] {
        let start = self.row_offset(j, k);
        &self.data[start..start + self.shape.nx]
    }

    /// The contiguous row `(j, k)`, mutably.
    pub fn row_mut(&mut self, j: usize, k: usize) -> &mut [Real] {
        let start = self.row_offset(j, k);
        let nx = self.shape.nx;
        &mut self.data[start..start + nx]
    }

    /// Raw storage in layout order.
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Raw storage in layout order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }
}

impl Index<Cell> for ScalarField {
    type Output = Real;

    fn index(&self, c: Cell) -> &Real {
        &self.data[self.shape.index(c.i, c.j, c.k)]
    }
}

impl IndexMut<Cell> for ScalarField {
    fn index_mut(&mut self, c: Cell) -> &mut Real {
        self.get_mut(c.i, c.j, c.k)
    }
}

// ── VectorField ────────────────────────────────────────────────────

/// One value per spatial axis per cell over the padded grid.
///
/// Components of one cell are adjacent in memory. On the staggered grid
/// component `d` of cell `(i, j, k)` lives on the cell's high face along
/// axis `d`.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorField {
    shape: GridShape,
    components: usize,
    data: Vec<Real>,
}

impl VectorField {
    /// A zero-filled field with `components` values per cell (2 or 3).
    pub fn new(shape: GridShape, components: usize) -> Self {
        Self {
            shape,
            components,
            data: vec![0.0; shape.len() * components],
        }
    }

    /// The padded extents.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Values per cell.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Padded extent along x.
    pub fn nx(&self) -> usize {
        self.shape.nx
    }

    /// Padded extent along y.
    pub fn ny(&self) -> usize {
        self.shape.ny
    }

    /// Padded extent along z.
    pub fn nz(&self) -> usize {
        self.shape.nz
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        self.shape.index(i, j, k) * self.components
    }

    /// Component `d` at `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, d: usize) -> Real {
        debug_assert!(d < self.components);
        self.data[self.offset(i, j, k) + d]
    }

    /// Mutable reference to component `d` at `(i, j, k)`.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize, d: usize) -> &mut Real {
        debug_assert!(d < self.components);
        let idx = self.offset(i, j, k) + d;
        &mut self.data[idx]
    }

    /// Overwrite component `d` at `(i, j, k)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, d: usize, value: Real) {
        *self.get_mut(i, j, k, d) = value;
    }

    /// All components of cell `(i, j, k)`.
    pub fn cell(&self, i: usize, j: usize, k: usize) -> &[Real] {
        let start = self.offset(i, j, k);
        &self.data[start..start + self.components]
    }

    /// All components of cell `(i, j, k)`, mutably.
    pub fn cell_mut(&mut self, i: usize, j: usize, k: usize) -> &mut [Real] {
        let start = self.offset(i, j, k);
        let n = self.components;
        &mut self.data[start..start + n]
    }

    /// Offset of the first value of row `(j, k)` in [`as_slice`](Self::as_slice).
    pub fn row_offset(&self, j: usize, k: usize) -> usize {
        self.offset(0, j, k)
    }

    /// The contiguous row `(j, k)`, `nx * components` values.
    pub fn row(&self, j: usize, k: usize) -> &[Real] {
        let start = self.row_offset(j, k);
        &self.data[start..start + self.shape.nx * self.components]
    }

    /// Raw storage in layout order.
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Raw storage in layout order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }
}

impl Index<(Cell, usize)> for VectorField {
    type Output = Real;

    fn index(&self, (c, d): (Cell, usize)) -> &Real {
        &self.data[self.offset(c.i, c.j, c.k) + d]
    }
}

impl IndexMut<(Cell, usize)> for VectorField {
    fn index_mut(&mut self, (c, d): (Cell, usize)) -> &mut Real {
        self.get_mut(c.i, c.j, c.k, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_fastest_layout() {
        let shape = GridShape::new(4, 3, 2);
        assert_eq!(shape.index(1, 0, 0), 1);
        assert_eq!(shape.index(0, 1, 0), 4);
        assert_eq!(shape.index(0, 0, 1), 12);
        assert_eq!(shape.len(), 24);
    }

    #[test]
    fn scalar_rows_are_contiguous() {
        let mut f = ScalarField::new(GridShape::new(5, 4, 1));
        for i in 0..5 {
            f.set(i, 2, 0, i as Real);
        }
        assert_eq!(f.row(2, 0), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(f.row_offset(2, 0), 10);
        f.row_mut(1, 0).fill(7.0);
        assert_eq!(f[Cell::new(3, 1, 0)], 7.0);
    }

    #[test]
    fn vector_components_are_adjacent() {
        let mut v = VectorField::new(GridShape::new(3, 3, 3), 3);
        v.set(1, 1, 1, 0, 1.0);
        v.set(1, 1, 1, 2, 3.0);
        assert_eq!(v.cell(1, 1, 1), &[1.0, 0.0, 3.0]);
        v[(Cell::new(2, 0, 0), 1)] = 5.0;
        assert_eq!(v.get(2, 0, 0, 1), 5.0);
        assert_eq!(v.row(0, 0).len(), 9);
    }

    #[test]
    fn cell_neighbours() {
        let c = Cell::new(2, 3, 0);
        assert_eq!(c.plus(Axis::X), Cell::new(3, 3, 0));
        assert_eq!(c.minus(Axis::Y), Cell::new(2, 2, 0));
        assert_eq!(c.with(Axis::Z, 4).get(Axis::Z), 4);
    }
}
