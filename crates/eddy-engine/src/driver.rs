//! The outer run loop.

use std::error::Error;
use std::fmt;
use std::io;
use std::time::Instant;

use eddy_core::{Face, Real, StepError, StepId};
use eddy_halo::Communicator;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::simulation::Simulation;

// ── RunError ───────────────────────────────────────────────────────

/// Errors that end a run.
#[derive(Debug)]
pub enum RunError {
    /// The simulation could not be built.
    Config(ConfigError),
    /// A timestep failed.
    Step(StepError),
    /// The snapshot writer failed.
    Snapshot(io::Error),
    /// The agreed timestep cannot advance simulated time.
    StalledTime {
        /// The step that produced it.
        step: StepId,
        /// The offending timestep.
        dt: Real,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Step(e) => write!(f, "timestep failed: {e}"),
            Self::Snapshot(e) => write!(f, "snapshot failed: {e}"),
            Self::StalledTime { step, dt } => {
                write!(f, "step {step} produced dt {dt}, simulated time cannot advance")
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Step(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            Self::StalledTime { .. } => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StepError> for RunError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        Self::Snapshot(e)
    }
}

// ── Driver ─────────────────────────────────────────────────────────

/// What a completed run did.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken.
    pub steps: StepId,
    /// Simulated time reached.
    pub time: Real,
    /// Snapshots written, including the initial and final ones.
    pub snapshots: usize,
    /// Wall-clock duration, in microseconds.
    pub elapsed_us: u64,
}

/// Steps a [`Simulation`] until the configured final time.
///
/// Writes a snapshot before the first step, whenever simulated time
/// crosses a multiple of the snapshot interval, and once at the end. Rank
/// 0 logs progress at the stdout interval.
#[derive(Debug)]
pub struct Driver<C: Communicator> {
    simulation: Simulation<C>,
}

impl<C: Communicator> Driver<C> {
    /// Drive `simulation`.
    pub fn new(simulation: Simulation<C>) -> Self {
        Self { simulation }
    }

    /// The driven simulation.
    pub fn simulation(&self) -> &Simulation<C> {
        &self.simulation
    }

    /// Give the simulation back.
    pub fn into_simulation(self) -> Simulation<C> {
        self.simulation
    }

    /// Initialise the flow field and step until the final time.
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let sim = &mut self.simulation;
        let final_time = sim.config().simulation.final_time;
        let output = sim.config().output.clone();
        let rank = sim.topology().rank();
        let neighbours = Face::ALL
            .iter()
            .filter(|&&f| sim.topology().neighbour(f).is_some())
            .count();
        info!(
            rank = rank.index(),
            local_size = ?sim.flow().subdomain().local_size(),
            neighbours,
            final_time,
            "run started"
        );

        sim.initialize_flow_field();
        sim.plot_vtk(StepId(0), 0.0)?;
        let mut snapshots = 1;
        let mut next_stdout = output.stdout_interval;
        let mut next_snapshot = output.snapshot_interval;

        while sim.timestep().time() < final_time {
            let metrics = sim.solve_timestep()?;
            if !(metrics.dt.is_finite() && metrics.dt > 0.0) {
                return Err(RunError::StalledTime {
                    step: metrics.step,
                    dt: metrics.dt,
                });
            }
            let time = sim.timestep().time();
            debug!(
                rank = rank.index(),
                step = metrics.step.0,
                time,
                dt = metrics.dt,
                solver_iterations = metrics.solver_iterations,
                halo_values = metrics.halo_values,
                "step"
            );
            if rank.index() == 0 && next_stdout <= time {
                info!(time, dt = metrics.dt, step = metrics.step.0, "current time");
                next_stdout += output.stdout_interval;
            }
            if next_snapshot <= time {
                sim.plot_vtk(metrics.step, time)?;
                snapshots += 1;
                next_snapshot += output.snapshot_interval;
            }
        }

        let steps = sim.timestep().step();
        let time = sim.timestep().time();
        let elapsed_us = started.elapsed().as_micros() as u64;
        info!(
            rank = rank.index(),
            steps = steps.0,
            time,
            elapsed_us,
            "finished simulation"
        );
        sim.plot_vtk(steps, time)?;
        snapshots += 1;
        Ok(RunSummary {
            steps,
            time,
            snapshots,
            elapsed_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::simulation::SnapshotWriter;
    use eddy_grid::FlowField;
    use eddy_halo::SerialComm;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<(StepId, Real)>>>);

    impl SnapshotWriter for Log {
        fn write(&mut self, _flow: &FlowField, step: StepId, time: Real) -> io::Result<()> {
            self.0.lock().unwrap().push((step, time));
            Ok(())
        }
    }

    struct Broken;

    impl SnapshotWriter for Broken {
        fn write(&mut self, _flow: &FlowField, _step: StepId, _time: Real) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    fn config() -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.geometry.size = [6, 6, 1];
        cfg.timestep.dt = 0.0625;
        cfg.timestep.tau = 1.0;
        cfg.simulation.final_time = 0.5;
        cfg.output.snapshot_interval = 0.125;
        cfg
    }

    #[test]
    fn runs_to_final_time_with_snapshots() {
        let log = Log::default();
        let sim = Simulation::new(&config(), SerialComm)
            .unwrap()
            .with_writer(log.clone());
        let mut driver = Driver::new(sim);
        let summary = driver.run().unwrap();

        // The configured dt caps every step: slow cavity flow never
        // reaches the convective bound.
        assert_eq!(summary.time, 0.5);
        assert_eq!(summary.steps, StepId(8));
        assert_eq!(summary.steps, driver.simulation().timestep().step());

        let written = log.0.lock().unwrap().clone();
        assert_eq!(written.len(), summary.snapshots);
        assert_eq!(written[0], (StepId(0), 0.0));
        assert_eq!(written[1], (StepId(2), 0.125));
        assert_eq!(written.last(), Some(&(StepId(8), 0.5)));
        // Initial, four interval crossings, final.
        assert_eq!(written.len(), 6);
    }

    #[test]
    fn writer_failure_ends_the_run() {
        let sim = Simulation::new(&config(), SerialComm)
            .unwrap()
            .with_writer(Broken);
        let err = Driver::new(sim).run().unwrap_err();
        assert!(matches!(err, RunError::Snapshot(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
