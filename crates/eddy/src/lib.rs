//! Eddy: a parallel structured-grid incompressible flow solver core.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Eddy sub-crates. For most users, adding `eddy` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use eddy::prelude::*;
//!
//! let mut config = SimulationConfig::default();
//! config.geometry.size = [8, 8, 1];
//! config.timestep.dt = 0.0625;
//! config.timestep.tau = 1.0;
//! config.simulation.final_time = 0.125;
//!
//! let sim = Simulation::new(&config, SerialComm).unwrap();
//! let summary = Driver::new(sim).run().unwrap();
//! assert_eq!(summary.steps, StepId(2));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `eddy-core` | Axes, faces, ranks, phases, error types |
//! | [`grid`] | `eddy-grid` | Padded fields, flags, subdomains, decomposition |
//! | [`stencil`] | `eddy-stencil` | Stencil traits and the three iterators |
//! | [`stencils`] | `eddy-stencils` | Finite-difference kernels of a timestep |
//! | [`halo`] | `eddy-halo` | Ghost exchange and communicators |
//! | [`engine`] | `eddy-engine` | Configuration, the timestep loop, the driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and errors (`eddy-core`).
pub use eddy_core as types;

/// Field storage and domain decomposition (`eddy-grid`).
///
/// [`grid::FlowField`] bundles every field of a rank;
/// [`grid::Decomposition`] splits the global grid into subdomains.
pub use eddy_grid as grid;

/// Stencil traits and iterators (`eddy-stencil`).
pub use eddy_stencil as stencil;

/// Finite-difference kernels (`eddy-stencils`).
pub use eddy_stencils as stencils;

/// Ghost-layer exchange (`eddy-halo`).
///
/// [`halo::ParallelManager`] drives an exchange over any
/// [`halo::Communicator`]; [`halo::LocalComm`] runs ranks as threads.
pub use eddy_halo as halo;

/// Configuration and timestep orchestration (`eddy-engine`).
pub use eddy_engine as engine;

/// Common imports for typical Eddy usage.
///
/// ```rust
/// use eddy::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use eddy_core::{Axis, Dim, Face, Phase, Rank, Real, StepId};

    // Errors
    pub use eddy_core::{CommError, HaloError, SolverError, StepError};

    // Grid
    pub use eddy_grid::{Decomposition, FlowField, Subdomain};

    // Halo
    pub use eddy_halo::{Communicator, ExchangeMode, LocalComm, ParallelManager, SerialComm};

    // Engine
    pub use eddy_engine::{
        ConfigError, Driver, PressureSolver, RunError, RunSummary, Scenario, Simulation,
        SimulationConfig, SimulationKind, SnapshotWriter, StepMetrics,
    };
}
