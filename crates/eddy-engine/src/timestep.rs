//! The adaptive timestep and its single writer.

use eddy_core::{CommError, Real, StepId};
use eddy_halo::Communicator;
use tracing::warn;

use crate::config::TimestepConfig;

/// Simulated time, step count and the current `dt` of a run.
///
/// `dt` changes only through [`update`](Self::update), which every rank
/// calls with its local stable bound at the start of a step. The global
/// minimum makes `dt` identical on every rank.
#[derive(Clone, Debug, PartialEq)]
pub struct Timestep {
    dt: Real,
    tau: Real,
    max_dt: Real,
    time: Real,
    step: StepId,
}

impl Timestep {
    /// Start at time zero with the configured `dt`.
    pub fn new(config: &TimestepConfig) -> Self {
        Self {
            dt: config.dt,
            tau: config.tau,
            max_dt: config.dt,
            time: 0.0,
            step: StepId::default(),
        }
    }

    /// Current timestep.
    pub fn dt(&self) -> Real {
        self.dt
    }

    /// Safety factor.
    pub fn tau(&self) -> Real {
        self.tau
    }

    /// Simulated time reached so far.
    pub fn time(&self) -> Real {
        self.time
    }

    /// Steps completed so far.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Agree on the next `dt`: `tau` times the global minimum of every
    /// rank's `min(local_bound, max_dt)`. Collective; every rank must call
    /// it once per step.
    pub fn update<C: Communicator + ?Sized>(
        &mut self,
        local_bound: Real,
        comm: &mut C,
    ) -> Result<Real, CommError> {
        let local = local_bound.min(self.max_dt);
        let global = comm.all_reduce_min(local)?;
        let dt = self.tau * global;
        if !dt.is_finite() || dt <= 0.0 {
            warn!(
                rank = comm.rank().index(),
                local, global, dt, "timestep reduction produced an unusable dt"
            );
        }
        self.dt = dt;
        Ok(dt)
    }

    /// Account for a completed step of the current `dt`.
    pub fn advance(&mut self) {
        self.time += self.dt;
        self.step = self.step.next();
    }
}
