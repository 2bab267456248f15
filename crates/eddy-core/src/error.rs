//! Error types for the Eddy solver core.
//!
//! Organized by subsystem: messaging ([`CommError`]), ghost exchange
//! ([`HaloError`]), pressure solve ([`SolverError`]) and the timestep
//! orchestrator ([`StepError`]). Every error is fatal at this layer; the
//! outer driver terminates the run on the first one.

use std::error::Error;
use std::fmt;

use crate::geometry::Face;
use crate::id::Rank;
use crate::phase::Phase;

// ── CommError ──────────────────────────────────────────────────────

/// Errors from the point-to-point messaging layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// The peer's endpoint has gone away (its process aborted or dropped
    /// its communicator).
    PeerDisconnected {
        /// The peer that could not be reached.
        peer: Rank,
    },
    /// A message arrived whose length differs from the receive buffer.
    UnexpectedLength {
        /// Sender of the message.
        peer: Rank,
        /// Tag of the message.
        tag: u32,
        /// Length of the receive buffer.
        expected: usize,
        /// Length of the delivered message.
        actual: usize,
    },
    /// A peer rank outside `0..size` was addressed.
    InvalidPeer {
        /// The addressed rank.
        peer: Rank,
        /// Number of ranks in the communicator.
        size: usize,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerDisconnected { peer } => write!(f, "{peer} disconnected"),
            Self::UnexpectedLength {
                peer,
                tag,
                expected,
                actual,
            } => write!(
                f,
                "message from {peer} with tag {tag} has {actual} values, expected {expected}"
            ),
            Self::InvalidPeer { peer, size } => {
                write!(f, "{peer} is outside a communicator of {size} ranks")
            }
        }
    }
}

impl Error for CommError {}

// ── HaloError ──────────────────────────────────────────────────────

/// Errors from a ghost-layer exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HaloError {
    /// A ghost buffer's length disagrees with the face geometry. This is
    /// a decomposition or configuration defect, never transient.
    ConfigurationInconsistency {
        /// Name of the exchanged quantity (`"pressure"`, `"velocity"`, ...).
        kind: &'static str,
        /// The face whose buffer is mis-sized.
        face: Face,
        /// Length derived from the face geometry.
        expected: usize,
        /// Length actually produced or received.
        actual: usize,
    },
    /// The messaging layer reported a failure.
    CommunicationFailure(CommError),
}

impl fmt::Display for HaloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationInconsistency {
                kind,
                face,
                expected,
                actual,
            } => write!(
                f,
                "{kind} ghost buffer on {face} face has {actual} values, geometry requires {expected}"
            ),
            Self::CommunicationFailure(e) => write!(f, "communication failure: {e}"),
        }
    }
}

impl Error for HaloError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CommunicationFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for HaloError {
    fn from(e: CommError) -> Self {
        Self::CommunicationFailure(e)
    }
}

// ── SolverError ────────────────────────────────────────────────────

/// Errors from the pressure linear solver.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The residual became non-finite.
    Diverged {
        /// Iterations performed before divergence was detected.
        iterations: usize,
        /// The offending residual.
        residual: f64,
    },
    /// `solve` was called before `reinit_matrix`.
    NotInitialized,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diverged {
                iterations,
                residual,
            } => write!(
                f,
                "pressure solve diverged after {iterations} iterations (residual {residual})"
            ),
            Self::NotInitialized => write!(f, "solve called before reinit_matrix"),
        }
    }
}

impl Error for SolverError {}

// ── StepError ──────────────────────────────────────────────────────

/// Errors from `solve_timestep`, tagged with the phase that failed.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A ghost exchange failed.
    Halo {
        /// Phase in which the exchange ran.
        phase: Phase,
        /// The underlying exchange error.
        source: HaloError,
    },
    /// A global reduction failed.
    Reduction {
        /// Phase in which the reduction ran.
        phase: Phase,
        /// The underlying messaging error.
        source: CommError,
    },
    /// The pressure solver failed.
    Solver {
        /// Phase in which the solver ran.
        phase: Phase,
        /// The underlying solver error.
        source: SolverError,
    },
}

impl StepError {
    /// The phase that failed.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Halo { phase, .. } | Self::Reduction { phase, .. } | Self::Solver { phase, .. } => {
                *phase
            }
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Halo { phase, source } => write!(f, "phase {phase}: {source}"),
            Self::Reduction { phase, source } => {
                write!(f, "phase {phase}: global reduction failed: {source}")
            }
            Self::Solver { phase, source } => write!(f, "phase {phase}: {source}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Halo { source, .. } => Some(source),
            Self::Reduction { source, .. } => Some(source),
            Self::Solver { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halo_error_chains_comm_error() {
        let err: HaloError = CommError::PeerDisconnected { peer: Rank(1) }.into();
        assert!(matches!(err, HaloError::CommunicationFailure(_)));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "communication failure: rank 1 disconnected");
    }

    #[test]
    fn step_error_reports_phase() {
        let err = StepError::Halo {
            phase: Phase::PressureExchange,
            source: HaloError::ConfigurationInconsistency {
                kind: "pressure",
                face: Face::Left,
                expected: 10,
                actual: 9,
            },
        };
        assert_eq!(err.phase(), Phase::PressureExchange);
        assert!(err.to_string().starts_with("phase pressure_exchange:"));
        assert!(err.to_string().contains("left face"));
        assert!(err.source().is_some());
    }

    #[test]
    fn solver_error_display() {
        let err = SolverError::Diverged {
            iterations: 3,
            residual: f64::NAN,
        };
        assert!(err.to_string().contains("3 iterations"));
        assert_eq!(
            SolverError::NotInitialized.to_string(),
            "solve called before reinit_matrix"
        );
    }
}
