//! The pressure linear solver seam and a local SOR implementation.

use eddy_core::{Real, SolverError};
use eddy_grid::{Cell, FlowField, Meshsize, ParallelTopology};
use eddy_stencil::{BoundaryStencil, FieldIterator, GlobalBoundaryIterator, Wall};
use tracing::{trace, warn};

use crate::config::SolverConfig;

/// What a solver may consult besides the fields.
#[derive(Clone, Copy)]
pub struct SolveContext<'a> {
    /// Mesh spacing.
    pub meshsize: &'a dyn Meshsize,
    /// The rank's neighbourhood; faces without a neighbour are walls.
    pub topology: &'a ParallelTopology,
}

impl std::fmt::Debug for SolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveContext")
            .field("topology", self.topology)
            .finish()
    }
}

/// Outcome of one solve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveReport {
    /// Iterations performed.
    pub iterations: usize,
    /// Final residual.
    pub residual: Real,
}

/// Solves the pressure Poisson equation `lap(p) = rhs` in place.
///
/// [`reinit_matrix`](Self::reinit_matrix) is called once the flags are
/// final and before the first [`solve`](Self::solve).
pub trait PressureSolver {
    /// Rebuild whatever depends on the geometry of `flow`.
    fn reinit_matrix(&mut self, flow: &FlowField);

    /// Overwrite `flow.pressure` with the solution for `flow.rhs`.
    fn solve(
        &mut self,
        flow: &mut FlowField,
        ctx: &SolveContext<'_>,
    ) -> Result<SolveReport, SolverError>;
}

// ── SorSolver ──────────────────────────────────────────────────────

/// Copies the boundary interior pressure into the ghost cell across
/// each global wall: a zero normal gradient.
#[derive(Clone, Copy, Debug, Default)]
struct NeumannPressure;

impl BoundaryStencil for NeumannPressure {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        let axis = wall.axis();
        let ghost = if wall.face.is_low() {
            cell.minus(axis)
        } else {
            cell.plus(axis)
        };
        flow.pressure[ghost] = flow.pressure[cell];
    }
}

/// Successive over-relaxation on the rank's interior.
///
/// Neighbours across a global wall or inside an obstacle drop out of the
/// five- (seven-) point stencil, which imposes a zero normal gradient there.
/// Neighbours across an inter-rank face contribute their current ghost
/// value, so ranks are coupled block-Jacobi style through the exchanges
/// between steps. Stops when the RMS residual drops below the tolerance or
/// at the iteration cap.
#[derive(Clone, Debug)]
pub struct SorSolver {
    omega: Real,
    max_iterations: usize,
    tolerance: Real,
    cells: Option<Vec<Cell>>,
}

impl SorSolver {
    /// A solver with the configured relaxation and stopping rule.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            omega: config.omega,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            cells: None,
        }
    }

    /// Weighted neighbour sum and total weight at `c`.
    fn neighbours(flow: &FlowField, ctx: &SolveContext<'_>, c: Cell) -> (Real, Real) {
        let sd = flow.subdomain();
        let (mut sum, mut weight) = (0.0, 0.0);
        for &axis in sd.dim().axes() {
            let interior = sd.interior(axis);
            let h = ctx.meshsize.spacing(axis, c.i, c.j, c.k);
            let w = 1.0 / (h * h);
            for face in [axis.low_face(), axis.high_face()] {
                let n = if face.is_low() { c.minus(axis) } else { c.plus(axis) };
                let outside = !interior.contains(&n.get(axis));
                if outside && ctx.topology.is_global_boundary(face) {
                    continue;
                }
                if flow.flags.neighbour_is_obstacle(c.i, c.j, c.k, face) {
                    continue;
                }
                sum += w * flow.pressure[n];
                weight += w;
            }
        }
        (sum, weight)
    }

    fn sweep(&self, flow: &mut FlowField, ctx: &SolveContext<'_>, cells: &[Cell]) {
        for &c in cells {
            let (sum, weight) = Self::neighbours(flow, ctx, c);
            if weight == 0.0 {
                continue;
            }
            let gs = (sum - flow.rhs[c]) / weight;
            let p = &mut flow.pressure[c];
            *p = (1.0 - self.omega) * *p + self.omega * gs;
        }
    }

    fn residual(flow: &FlowField, ctx: &SolveContext<'_>, cells: &[Cell]) -> Real {
        if cells.is_empty() {
            return 0.0;
        }
        let total: Real = cells
            .iter()
            .map(|&c| {
                let (sum, weight) = Self::neighbours(flow, ctx, c);
                let r = sum - weight * flow.pressure[c] - flow.rhs[c];
                r * r
            })
            .sum();
        (total / cells.len() as Real).sqrt()
    }

    fn fluid_cells(flow: &FlowField) -> Vec<Cell> {
        let [rx, ry, rz] = FieldIterator::interior().ranges(flow.subdomain());
        let mut cells = Vec::new();
        for k in rz {
            for j in ry.clone() {
                for i in rx.clone() {
                    if flow.flags.is_fluid(i, j, k) {
                        cells.push(Cell::new(i, j, k));
                    }
                }
            }
        }
        cells
    }
}

impl PressureSolver for SorSolver {
    fn reinit_matrix(&mut self, flow: &FlowField) {
        let cells = Self::fluid_cells(flow);
        trace!(fluid_cells = cells.len(), "sor matrix reinitialised");
        self.cells = Some(cells);
    }

    fn solve(
        &mut self,
        flow: &mut FlowField,
        ctx: &SolveContext<'_>,
    ) -> Result<SolveReport, SolverError> {
        let Some(cells) = &self.cells else {
            return Err(SolverError::NotInitialized);
        };
        let mut report = SolveReport::default();
        while report.iterations < self.max_iterations {
            self.sweep(flow, ctx, cells);
            report.iterations += 1;
            report.residual = Self::residual(flow, ctx, cells);
            if !report.residual.is_finite() {
                return Err(SolverError::Diverged {
                    iterations: report.iterations,
                    residual: report.residual as f64,
                });
            }
            if report.residual < self.tolerance {
                break;
            }
        }
        if report.residual >= self.tolerance {
            warn!(
                iterations = report.iterations,
                residual = report.residual,
                "sor stopped at the iteration cap"
            );
        }
        let dim = flow.subdomain().dim();
        GlobalBoundaryIterator::new(dim, ctx.topology).iterate(&mut NeumannPressure, flow);
        Ok(report)
    }
}
