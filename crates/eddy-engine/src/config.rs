//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is assembled once by the caller and passed by
//! reference; nothing in it changes during a run. The adaptive timestep is
//! the only per-step mutable parameter and lives in
//! [`Timestep`](crate::Timestep) instead. [`validate()`](SimulationConfig::validate)
//! checks every structural invariant before a simulation is built.

use std::error::Error;
use std::fmt;

use eddy_core::{Axis, Dim, Face, Real};
use eddy_grid::{Decomposition, GridError};
use eddy_halo::ExchangeMode;
use eddy_stencil::FlowParameters;
use eddy_stencils::{BoundaryLayer, WallCondition};

// ── GeometryConfig ─────────────────────────────────────────────────

/// Global grid and physical extent.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryConfig {
    /// Spatial dimension, 2 or 3.
    pub dim: usize,
    /// Global cells per axis. The z entry is ignored in 2D.
    pub size: [usize; 3],
    /// Physical length per axis.
    pub lengths: [Real; 3],
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            size: [16, 16, 1],
            lengths: [1.0, 1.0, 1.0],
        }
    }
}

// ── TimestepConfig ─────────────────────────────────────────────────

/// Adaptive timestep parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TimestepConfig {
    /// Initial timestep, and the upper cap of every later one. Default: 1.0.
    pub dt: Real,
    /// Safety factor applied to the stable bound, in `(0, 1]`. Default: 0.5.
    pub tau: Real,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self { dt: 1.0, tau: 0.5 }
    }
}

/// Fluid properties.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowConfig {
    /// Reynolds number. Default: 100.
    pub reynolds: Real,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { reynolds: 100.0 }
    }
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Pressure solver and discretization parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// SOR relaxation factor, in `(0, 2)`. Default: 1.7.
    pub omega: Real,
    /// Iteration cap per solve. Default: 500.
    pub max_iterations: usize,
    /// Residual at which a solve stops. Default: 1e-6.
    pub tolerance: Real,
    /// Donor-cell blending of the convective terms, in `[0, 1]`. Default: 0.5.
    pub gamma: Real,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            omega: 1.7,
            max_iterations: 500,
            tolerance: 1e-6,
            gamma: 0.5,
        }
    }
}

/// Body forces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentConfig {
    /// Acceleration per axis.
    pub gravity: [Real; 3],
}

// ── SimulationSettings ─────────────────────────────────────────────

/// Initial and boundary condition family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scenario {
    /// Closed box driven by the wall velocities.
    #[default]
    Cavity,
    /// Inflow through the left wall, outflow through the right one,
    /// optionally over a backward-facing step.
    Channel,
    /// Analytic Taylor–Green vortex as the initial velocity.
    TaylorGreen,
}

/// Whether the turbulence closure runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationKind {
    /// Direct simulation, molecular viscosity only.
    #[default]
    Dns,
    /// Prandtl mixing-length eddy viscosity.
    Turbulence,
}

/// What to simulate and for how long.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSettings {
    /// Simulated time at which the run stops. Default: 1.0.
    pub final_time: Real,
    /// Initial and boundary conditions.
    pub scenario: Scenario,
    /// DNS or turbulent.
    pub kind: SimulationKind,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            final_time: 1.0,
            scenario: Scenario::Cavity,
            kind: SimulationKind::Dns,
        }
    }
}

// ── ParallelConfig ─────────────────────────────────────────────────

/// Process grid and exchange strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct ParallelConfig {
    /// Processes per axis. Default: one.
    pub processes: [usize; 3],
    /// How each halo exchange issues its transfers.
    pub mode: ExchangeMode,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            processes: [1, 1, 1],
            mode: ExchangeMode::default(),
        }
    }
}

/// Velocity prescribed at each wall of the global domain.
#[derive(Clone, Debug, PartialEq)]
pub struct WallConfig {
    /// Velocity vector per wall, indexed by `Face::index`. Default: a lid
    /// moving along x on top, every other wall at rest.
    pub velocities: [[Real; 3]; 6],
}

impl Default for WallConfig {
    fn default() -> Self {
        let mut velocities = [[0.0; 3]; 6];
        velocities[Face::Top.index()] = [1.0, 0.0, 0.0];
        Self { velocities }
    }
}

// ── BackwardFacingStep ─────────────────────────────────────────────

/// Obstacle in the lower-left corner of a channel, sized as fractions of
/// the domain. The step exists only when both ratios are positive.
#[derive(Clone, Debug, PartialEq)]
pub struct BackwardFacingStep {
    /// Step length over domain length along x. Default: -1 (disabled).
    pub x_ratio: Real,
    /// Step height over domain length along y. Default: -1 (disabled).
    pub y_ratio: Real,
}

impl Default for BackwardFacingStep {
    fn default() -> Self {
        Self {
            x_ratio: -1.0,
            y_ratio: -1.0,
        }
    }
}

impl BackwardFacingStep {
    /// Whether the step is present.
    pub fn enabled(&self) -> bool {
        self.x_ratio > 0.0 && self.y_ratio > 0.0
    }

    /// Physical step extent `(x, y)` for a domain of `lengths`.
    pub fn extent(&self, lengths: [Real; 3]) -> Option<(Real, Real)> {
        self.enabled()
            .then(|| (self.x_ratio * lengths[0], self.y_ratio * lengths[1]))
    }

    /// Step extent in whole global cells `(x, y)`.
    pub fn cells(&self, size: [usize; 3]) -> Option<(isize, isize)> {
        self.enabled().then(|| {
            (
                (self.x_ratio * size[0] as Real).round() as isize,
                (self.y_ratio * size[1] as Real).round() as isize,
            )
        })
    }

    /// Whether the global cell `g` lies inside the step. Ghost cells past
    /// the low domain edges count as inside when both coordinates are
    /// below the step extent.
    pub fn contains(&self, size: [usize; 3], g: [isize; 3]) -> bool {
        match self.cells(size) {
            Some((sx, sy)) => g[0] < sx && g[1] < sy,
            None => false,
        }
    }
}

/// Turbulence closure parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurbulenceConfig {
    /// Boundary-layer model that caps the mixing length.
    pub boundary_layer: BoundaryLayer,
}

/// Progress logging and snapshot cadence, in simulated time.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// Interval between progress lines on rank 0. Default: 0.1.
    pub stdout_interval: Real,
    /// Interval between snapshots. Default: 0.5.
    pub snapshot_interval: Real,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            stdout_interval: 0.1,
            snapshot_interval: 0.5,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`] or while
/// building a simulation from a configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Dimension other than 2 or 3.
    InvalidDimension {
        /// The configured dimension.
        dim: usize,
    },
    /// An active axis has fewer than two cells.
    TooFewCells {
        /// The axis.
        axis: Axis,
        /// Configured cells.
        cells: usize,
    },
    /// A physical length is not finite and positive.
    InvalidLength {
        /// The axis.
        axis: Axis,
        /// Configured length.
        value: Real,
    },
    /// The decomposition could not be built.
    Grid(GridError),
    /// Reynolds number is not finite and positive.
    InvalidReynolds {
        /// Configured value.
        value: Real,
    },
    /// Timestep parameters are out of range.
    InvalidTimestep {
        /// Description of the violated bound.
        reason: String,
    },
    /// Final time is not finite and positive.
    InvalidFinalTime {
        /// Configured value.
        value: Real,
    },
    /// Solver parameters are out of range.
    InvalidSolver {
        /// Description of the violated bound.
        reason: String,
    },
    /// A body force or wall velocity is not finite.
    NonFiniteForcing {
        /// Description of the offending entry.
        reason: String,
    },
    /// Backward-facing step ratios are out of range.
    InvalidStep {
        /// Description of the violated bound.
        reason: String,
    },
    /// An output interval is not finite and positive.
    InvalidOutput {
        /// Description of the violated bound.
        reason: String,
    },
    /// The communicator's size differs from the decomposition's rank count.
    RankCountMismatch {
        /// Ranks the decomposition needs.
        expected: usize,
        /// Ranks the communicator has.
        actual: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { dim } => write!(f, "dimension must be 2 or 3, got {dim}"),
            Self::TooFewCells { axis, cells } => {
                write!(f, "axis {axis:?} needs at least 2 cells, got {cells}")
            }
            Self::InvalidLength { axis, value } => {
                write!(f, "length along {axis:?} must be finite and positive, got {value}")
            }
            Self::Grid(e) => write!(f, "decomposition: {e}"),
            Self::InvalidReynolds { value } => {
                write!(f, "Reynolds number must be finite and positive, got {value}")
            }
            Self::InvalidTimestep { reason } => write!(f, "invalid timestep: {reason}"),
            Self::InvalidFinalTime { value } => {
                write!(f, "final time must be finite and positive, got {value}")
            }
            Self::InvalidSolver { reason } => write!(f, "invalid solver parameters: {reason}"),
            Self::NonFiniteForcing { reason } => write!(f, "non-finite forcing: {reason}"),
            Self::InvalidStep { reason } => write!(f, "invalid backward-facing step: {reason}"),
            Self::InvalidOutput { reason } => write!(f, "invalid output cadence: {reason}"),
            Self::RankCountMismatch { expected, actual } => write!(
                f,
                "decomposition needs {expected} ranks, communicator has {actual}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete description of one run. `Default` is a 16×16 lid-driven
/// cavity on a single rank.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationConfig {
    /// Grid and domain.
    pub geometry: GeometryConfig,
    /// Adaptive timestep.
    pub timestep: TimestepConfig,
    /// Fluid properties.
    pub flow: FlowConfig,
    /// Pressure solver and discretization.
    pub solver: SolverConfig,
    /// Body forces.
    pub environment: EnvironmentConfig,
    /// Scenario, kind and duration.
    pub simulation: SimulationSettings,
    /// Process grid and exchange mode.
    pub parallel: ParallelConfig,
    /// Wall velocities.
    pub walls: WallConfig,
    /// Backward-facing step obstacle.
    pub step: BackwardFacingStep,
    /// Turbulence closure.
    pub turbulence: TurbulenceConfig,
    /// Logging and snapshot cadence.
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// The configured dimension.
    pub fn dim(&self) -> Result<Dim, ConfigError> {
        Dim::from_count(self.geometry.dim).ok_or(ConfigError::InvalidDimension {
            dim: self.geometry.dim,
        })
    }

    /// The block decomposition of the global grid over the process grid.
    pub fn decomposition(&self) -> Result<Decomposition, ConfigError> {
        let dim = self.dim()?;
        Ok(Decomposition::new(
            dim,
            self.geometry.size,
            self.parallel.processes,
        )?)
    }

    /// Physical constants for the discretization stencils.
    pub fn flow_parameters(&self, dim: Dim) -> FlowParameters {
        FlowParameters {
            dim,
            reynolds: self.flow.reynolds,
            gamma: self.solver.gamma,
            body_force: self.environment.gravity,
        }
    }

    /// Boundary condition of every global wall for the configured
    /// scenario. A channel lets fluid leave through the right wall; every
    /// other wall imposes its configured velocity.
    pub fn wall_conditions(&self) -> [WallCondition; 6] {
        std::array::from_fn(|f| {
            if self.simulation.scenario == Scenario::Channel && f == Face::Right.index() {
                WallCondition::Outflow
            } else {
                WallCondition::Dirichlet(self.walls.velocities[f])
            }
        })
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Dimension is 2 or 3.
        let dim = self.dim()?;
        // 2. Every active axis has at least two cells and a usable length.
        for &axis in dim.axes() {
            let a = axis.index();
            if self.geometry.size[a] < 2 {
                return Err(ConfigError::TooFewCells {
                    axis,
                    cells: self.geometry.size[a],
                });
            }
            let length = self.geometry.lengths[a];
            if !length.is_finite() || length <= 0.0 {
                return Err(ConfigError::InvalidLength {
                    axis,
                    value: length,
                });
            }
        }
        // 3. The process grid splits the global grid; 2D has one process
        //    along z.
        self.decomposition()?;
        // 4. Reynolds number.
        let re = self.flow.reynolds;
        if !re.is_finite() || re <= 0.0 {
            return Err(ConfigError::InvalidReynolds { value: re });
        }
        // 5. Timestep cap and safety factor.
        let t = &self.timestep;
        if !t.dt.is_finite() || t.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep {
                reason: format!("dt must be finite and positive, got {}", t.dt),
            });
        }
        if !t.tau.is_finite() || t.tau <= 0.0 || t.tau > 1.0 {
            return Err(ConfigError::InvalidTimestep {
                reason: format!("tau must be in (0, 1], got {}", t.tau),
            });
        }
        // 6. Final time.
        let end = self.simulation.final_time;
        if !end.is_finite() || end <= 0.0 {
            return Err(ConfigError::InvalidFinalTime { value: end });
        }
        // 7. Solver parameters.
        let s = &self.solver;
        if !(s.omega > 0.0 && s.omega < 2.0) {
            return Err(ConfigError::InvalidSolver {
                reason: format!("omega must be in (0, 2), got {}", s.omega),
            });
        }
        if !(0.0..=1.0).contains(&s.gamma) {
            return Err(ConfigError::InvalidSolver {
                reason: format!("gamma must be in [0, 1], got {}", s.gamma),
            });
        }
        if s.max_iterations == 0 {
            return Err(ConfigError::InvalidSolver {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        if !s.tolerance.is_finite() || s.tolerance <= 0.0 {
            return Err(ConfigError::InvalidSolver {
                reason: format!("tolerance must be finite and positive, got {}", s.tolerance),
            });
        }
        // 8. Forcing and wall velocities are finite.
        if self.environment.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::NonFiniteForcing {
                reason: format!("gravity {:?}", self.environment.gravity),
            });
        }
        for face in Face::ALL {
            let w = self.walls.velocities[face.index()];
            if w.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteForcing {
                    reason: format!("{face} wall velocity {w:?}"),
                });
            }
        }
        // 9. A present step leaves part of the channel open.
        let step = &self.step;
        if step.x_ratio.is_nan() || step.y_ratio.is_nan() {
            return Err(ConfigError::InvalidStep {
                reason: "ratios must not be NaN".to_string(),
            });
        }
        if step.enabled() && (step.x_ratio >= 1.0 || step.y_ratio >= 1.0) {
            return Err(ConfigError::InvalidStep {
                reason: format!(
                    "ratios must be below 1, got ({}, {})",
                    step.x_ratio, step.y_ratio
                ),
            });
        }
        // 10. Output intervals.
        let o = &self.output;
        for (name, value) in [
            ("stdout_interval", o.stdout_interval),
            ("snapshot_interval", o.snapshot_interval),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidOutput {
                    reason: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        Ok(())
    }
}
