//! Per-step performance metrics for the timestep loop.
//!
//! [`StepMetrics`] captures timing and traffic for a single call of
//! `solve_timestep`, for progress logging and profiling.

use eddy_core::{Phase, Real, StepId};
use indexmap::IndexMap;

/// Timing and traffic collected during a single timestep.
///
/// All durations are in microseconds. Phases appear in `phase_us` in the
/// order they ran; the two calls of an exchange phase are summed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// The step these metrics describe, counted from 1.
    pub step: StepId,
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Wall-clock time per phase, in execution order.
    pub phase_us: IndexMap<Phase, u64>,
    /// The timestep every rank agreed on.
    pub dt: Real,
    /// Halo messages this rank sent during the step.
    pub halo_messages: u64,
    /// Values carried by those messages.
    pub halo_values: u64,
    /// Pressure solver iterations.
    pub solver_iterations: usize,
    /// Final pressure solver residual.
    pub solver_residual: Real,
}

impl StepMetrics {
    /// Phases in the order they ran.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phase_us.keys().copied()
    }

    /// Add `us` to `phase`, appending it if it has not run yet.
    pub fn record(&mut self, phase: Phase, us: u64) {
        *self.phase_us.entry(phase).or_insert(0) += us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.step, StepId(0));
        assert_eq!(m.total_us, 0);
        assert!(m.phase_us.is_empty());
        assert_eq!(m.halo_messages, 0);
        assert_eq!(m.solver_iterations, 0);
    }

    #[test]
    fn record_keeps_first_seen_order() {
        let mut m = StepMetrics::default();
        m.record(Phase::PressureSolve, 5);
        m.record(Phase::AdaptiveDt, 1);
        m.record(Phase::PressureSolve, 2);
        let order: Vec<_> = m.phases().collect();
        assert_eq!(order, vec![Phase::PressureSolve, Phase::AdaptiveDt]);
        assert_eq!(m.phase_us[&Phase::PressureSolve], 7);
    }
}
