//! Timestep orchestration for the Eddy flow solver.
//!
//! A run is one [`Simulation`] per rank, built from a shared immutable
//! [`SimulationConfig`] and a [`Communicator`](eddy_halo::Communicator)
//! endpoint. Each call of [`Simulation::solve_timestep`] runs the fixed
//! phase sequence:
//!
//! 1. adaptive dt, agreed on by every rank through a global minimum
//! 2. intermediate momentum and its wall condition
//! 3. pressure right-hand side and the delegated [`PressureSolver`]
//! 4. pressure ghost exchange, twice
//! 5. velocity correction and obstacle fix-up
//! 6. velocity ghost exchange, twice, then the wall velocity condition
//!
//! Turbulent runs first update the eddy viscosity and exchange it.
//! [`Driver`] repeats steps until the final time and hands snapshots to a
//! [`SnapshotWriter`]. Every error is fatal: the first one ends the run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod metrics;
pub mod simulation;
pub mod solver;
pub mod timestep;

pub use config::{
    BackwardFacingStep, ConfigError, EnvironmentConfig, FlowConfig, GeometryConfig, OutputConfig,
    ParallelConfig, Scenario, SimulationConfig, SimulationKind, SimulationSettings,
    SolverConfig, TimestepConfig, TurbulenceConfig, WallConfig,
};
pub use driver::{Driver, RunError, RunSummary};
pub use metrics::StepMetrics;
pub use simulation::{Simulation, SnapshotWriter};
pub use solver::{PressureSolver, SolveContext, SolveReport, SorSolver};
pub use timestep::Timestep;
