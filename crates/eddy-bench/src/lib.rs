//! Benchmark profiles for the Eddy flow solver.
//!
//! - [`reference_profile`]: 128x128 lid-driven cavity on one rank
//! - [`split_profile`]: the same cavity split over a process grid
//! - [`stress_profile`]: 64x64x64 cavity in 3D

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use eddy_engine::{SimulationConfig, SolverConfig};

/// A 128x128 cavity at Re 100 with a short SOR iteration cap.
///
/// The solver cap keeps a step's cost dominated by the stencil sweeps and
/// exchanges rather than by convergence.
pub fn reference_profile() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.geometry.size = [128, 128, 1];
    cfg.timestep.dt = 0.005;
    cfg.timestep.tau = 0.5;
    cfg.solver = SolverConfig {
        max_iterations: 20,
        ..SolverConfig::default()
    };
    cfg
}

/// [`reference_profile`] split over `processes`.
pub fn split_profile(processes: [usize; 3]) -> SimulationConfig {
    let mut cfg = reference_profile();
    cfg.parallel.processes = processes;
    cfg
}

/// A 64^3 cavity in 3D.
pub fn stress_profile() -> SimulationConfig {
    let mut cfg = reference_profile();
    cfg.geometry.dim = 3;
    cfg.geometry.size = [64, 64, 64];
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_valid() {
        reference_profile().validate().unwrap();
        split_profile([2, 2, 1]).validate().unwrap();
        stress_profile().validate().unwrap();
    }
}
