//! The per-timestep phases of the pressure-velocity coupling loop.

use std::fmt;

/// One phase of `solve_timestep`.
///
/// Phases run strictly in [`Phase::SEQUENCE`] order, each after the
/// previous one has completed on every rank. [`Phase::EddyViscosity`]
/// precedes the sequence only for turbulent runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Eddy viscosity update and viscosity ghost exchange (turbulent runs).
    EddyViscosity,
    /// Max-velocity reduction and global minimum of the stable dt.
    AdaptiveDt,
    /// Intermediate momentum (F, G, H) on the interior.
    Momentum,
    /// Physical boundary condition on F, G, H at the global walls.
    MomentumBoundary,
    /// Right-hand side of the pressure Poisson equation.
    PressureRhs,
    /// Delegated linear solve for pressure.
    PressureSolve,
    /// Pressure ghost exchange, executed twice.
    PressureExchange,
    /// Velocity correction from the pressure gradient, then obstacle fix-up.
    VelocityCorrection,
    /// Velocity ghost exchange, executed twice.
    VelocityExchange,
    /// Physical velocity boundary condition at the global walls.
    VelocityBoundary,
}

impl Phase {
    /// The nine phases every timestep runs, in order.
    pub const SEQUENCE: [Phase; 9] = [
        Phase::AdaptiveDt,
        Phase::Momentum,
        Phase::MomentumBoundary,
        Phase::PressureRhs,
        Phase::PressureSolve,
        Phase::PressureExchange,
        Phase::VelocityCorrection,
        Phase::VelocityExchange,
        Phase::VelocityBoundary,
    ];

    /// Short snake-case name, used in logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Self::EddyViscosity => "eddy_viscosity",
            Self::AdaptiveDt => "adaptive_dt",
            Self::Momentum => "momentum",
            Self::MomentumBoundary => "momentum_boundary",
            Self::PressureRhs => "pressure_rhs",
            Self::PressureSolve => "pressure_solve",
            Self::PressureExchange => "pressure_exchange",
            Self::VelocityCorrection => "velocity_correction",
            Self::VelocityExchange => "velocity_exchange",
            Self::VelocityBoundary => "velocity_boundary",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_sorted_and_unique() {
        let mut sorted = Phase::SEQUENCE;
        sorted.sort();
        assert_eq!(sorted, Phase::SEQUENCE);
        assert!(!Phase::SEQUENCE.contains(&Phase::EddyViscosity));
    }

    #[test]
    fn exchange_follows_solve() {
        let pos = |p| Phase::SEQUENCE.iter().position(|&q| q == p).unwrap();
        assert!(pos(Phase::PressureSolve) < pos(Phase::PressureExchange));
        assert!(pos(Phase::PressureExchange) < pos(Phase::VelocityCorrection));
        assert_eq!(Phase::VelocityExchange.to_string(), "velocity_exchange");
    }
}
