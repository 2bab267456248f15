//! The per-rank timestep state machine.

use std::fmt;
use std::io;
use std::time::Instant;

use eddy_core::{Phase, Real, StepError, StepId};
use eddy_grid::{FlagField, FlowField, ParallelTopology, UniformMeshsize};
use eddy_halo::{Communicator, HaloKind, ParallelManager};
use eddy_stencil::{FieldIterator, FlowParameters, GlobalBoundaryIterator, StencilContext};
use eddy_stencils::{
    EddyViscosityStencil, FghBoundaryStencil, FghStencil, MaxVelocityStencil,
    MixingLengthStencil, ObstacleStencil, RhsStencil, TaylorGreenInit, TurbulentTimestepStencil,
    VelocityBoundaryStencil, VelocityStencil, WallDistanceStencil,
};
use tracing::{debug, trace};

use crate::config::{ConfigError, Scenario, SimulationConfig, SimulationKind};
use crate::metrics::StepMetrics;
use crate::solver::{PressureSolver, SolveContext, SorSolver};
use crate::timestep::Timestep;

/// Receives the flow field whenever the run asks for a snapshot.
pub trait SnapshotWriter {
    /// Persist `flow` as it stands after `step` at simulated `time`.
    fn write(&mut self, flow: &FlowField, step: StepId, time: Real) -> io::Result<()>;
}

fn finish(metrics: &mut StepMetrics, phase: Phase, started: Instant) {
    let us = started.elapsed().as_micros() as u64;
    metrics.record(phase, us);
    trace!(phase = phase.name(), us, "phase complete");
}

/// Run `kind`'s exchange twice so corner ghosts are current.
fn exchange_twice<C: Communicator + ?Sized>(
    manager: &mut ParallelManager,
    comm: &mut C,
    flow: &mut FlowField,
    kind: HaloKind,
    phase: Phase,
) -> Result<(), StepError> {
    for _ in 0..2 {
        manager
            .communicate(kind, comm, flow)
            .map_err(|source| StepError::Halo { phase, source })?;
    }
    Ok(())
}

/// One rank's share of a decomposed simulation.
///
/// Owns the rank's fields, its halo manager and every long-lived stencil.
/// [`solve_timestep`](Self::solve_timestep) runs the phases of
/// [`Phase::SEQUENCE`] strictly in order, preceded by
/// [`Phase::EddyViscosity`] in turbulent runs. Every rank of the
/// communicator must drive its own `Simulation` through the same calls:
/// the dt reduction and the exchanges are collective.
///
/// Any error leaves the fields partially updated. The run must stop.
pub struct Simulation<C: Communicator> {
    config: SimulationConfig,
    comm: C,
    flow: FlowField,
    mesh: UniformMeshsize,
    params: FlowParameters,
    topology: ParallelTopology,
    manager: ParallelManager,
    walls: GlobalBoundaryIterator,
    velocity_boundary: VelocityBoundaryStencil,
    max_velocity: MaxVelocityStencil,
    turbulent_dt: TurbulentTimestepStencil,
    solver: Box<dyn PressureSolver>,
    writer: Option<Box<dyn SnapshotWriter>>,
    timestep: Timestep,
    last_metrics: Option<StepMetrics>,
}

impl<C: Communicator> Simulation<C> {
    /// Validate `config` and build this rank's share of it.
    ///
    /// The communicator must have exactly as many ranks as the configured
    /// process grid. The pressure solver defaults to [`SorSolver`].
    pub fn new(config: &SimulationConfig, comm: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let dim = config.dim()?;
        let decomposition = config.decomposition()?;
        if comm.size() != decomposition.rank_count() {
            return Err(ConfigError::RankCountMismatch {
                expected: decomposition.rank_count(),
                actual: comm.size(),
            });
        }
        let rank = comm.rank();
        let subdomain = decomposition.subdomain(rank)?;
        let topology = decomposition.topology(rank)?;
        let global = decomposition.global_size();

        let flags = if config.simulation.scenario == Scenario::Channel && config.step.enabled() {
            FlagField::from_geometry(&subdomain, |g| config.step.contains(global, g))
        } else {
            FlagField::fluid(subdomain.shape())
        };
        let flow = FlowField::with_flags(subdomain, flags);
        let mesh = UniformMeshsize::new(subdomain, global, config.geometry.lengths);
        let manager = ParallelManager::new(topology, &flow, config.parallel.mode);
        debug!(
            rank = rank.index(),
            local_size = ?subdomain.local_size(),
            first_corner = ?subdomain.first_corner(),
            neighbours = manager.exchanged_faces().len(),
            "simulation built"
        );

        Ok(Self {
            params: config.flow_parameters(dim),
            velocity_boundary: VelocityBoundaryStencil::new(config.wall_conditions()),
            walls: GlobalBoundaryIterator::new(dim, &topology),
            solver: Box::new(SorSolver::new(&config.solver)),
            timestep: Timestep::new(&config.timestep),
            config: config.clone(),
            comm,
            flow,
            mesh,
            topology,
            manager,
            max_velocity: MaxVelocityStencil::new(),
            turbulent_dt: TurbulentTimestepStencil::new(),
            writer: None,
            last_metrics: None,
        })
    }

    /// Replace the pressure solver.
    pub fn with_solver(mut self, solver: impl PressureSolver + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Forward snapshots to `writer`.
    pub fn with_writer(mut self, writer: impl SnapshotWriter + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Apply the scenario's initial condition.
    ///
    /// Turbulent runs also compute the wall distance and mixing length.
    /// Ends by applying the velocity boundary condition and letting the
    /// pressure solver see the final geometry.
    pub fn initialize_flow_field(&mut self) {
        let lengths = self.config.geometry.lengths;
        let ctx = StencilContext::new(&self.params, &self.mesh, self.timestep.dt());
        match self.config.simulation.scenario {
            Scenario::TaylorGreen => {
                FieldIterator::new(-2, 1).iterate(&mut TaylorGreenInit, &ctx, &mut self.flow);
            }
            Scenario::Cavity | Scenario::Channel => {}
        }
        if self.config.simulation.kind == SimulationKind::Turbulence {
            let step = match self.config.simulation.scenario {
                Scenario::Channel => self.config.step.extent(lengths),
                _ => None,
            };
            let mut distance = WallDistanceStencil::new(lengths, step);
            FieldIterator::interior().iterate(&mut distance, &ctx, &mut self.flow);
            let mut mixing = MixingLengthStencil::new(self.config.turbulence.boundary_layer);
            FieldIterator::interior().iterate(&mut mixing, &ctx, &mut self.flow);
        }
        self.walls.iterate(&mut self.velocity_boundary, &mut self.flow);
        self.solver.reinit_matrix(&self.flow);
        debug!(
            rank = self.topology.rank().index(),
            scenario = ?self.config.simulation.scenario,
            "flow field initialised"
        );
    }

    /// Advance the flow by one adaptive timestep.
    pub fn solve_timestep(&mut self) -> Result<StepMetrics, StepError> {
        let started = Instant::now();
        let mut metrics = StepMetrics {
            step: self.timestep.step().next(),
            ..StepMetrics::default()
        };
        self.manager.take_stats();
        let turbulent = self.config.simulation.kind == SimulationKind::Turbulence;
        let dim = self.params.dim;

        if turbulent {
            let t = Instant::now();
            let ctx = StencilContext::new(&self.params, &self.mesh, self.timestep.dt());
            FieldIterator::interior().iterate(&mut EddyViscosityStencil, &ctx, &mut self.flow);
            exchange_twice(
                &mut self.manager,
                &mut self.comm,
                &mut self.flow,
                HaloKind::Viscosity,
                Phase::EddyViscosity,
            )?;
            finish(&mut metrics, Phase::EddyViscosity, t);
        }

        // 1. Adaptive dt.
        let t = Instant::now();
        let ctx = StencilContext::new(&self.params, &self.mesh, self.timestep.dt());
        let local = if turbulent {
            self.turbulent_dt.reset();
            FieldIterator::interior().iterate(&mut self.turbulent_dt, &ctx, &mut self.flow);
            self.turbulent_dt.local_dt()
        } else {
            self.max_velocity.reset();
            FieldIterator::new(-1, 0).iterate(&mut self.max_velocity, &ctx, &mut self.flow);
            self.max_velocity
                .local_dt(self.params.reynolds, &self.mesh, dim)
        };
        let dt = self
            .timestep
            .update(local, &mut self.comm)
            .map_err(|source| StepError::Reduction {
                phase: Phase::AdaptiveDt,
                source,
            })?;
        finish(&mut metrics, Phase::AdaptiveDt, t);
        let ctx = StencilContext::new(&self.params, &self.mesh, dt);

        // 2. Intermediate momentum.
        let t = Instant::now();
        FieldIterator::new(-1, 0).iterate(&mut FghStencil, &ctx, &mut self.flow);
        finish(&mut metrics, Phase::Momentum, t);

        // 3. Physical boundary on F, G, H.
        let t = Instant::now();
        self.walls.iterate(&mut FghBoundaryStencil, &mut self.flow);
        finish(&mut metrics, Phase::MomentumBoundary, t);

        // 4. Poisson right-hand side.
        let t = Instant::now();
        FieldIterator::interior().iterate(&mut RhsStencil, &ctx, &mut self.flow);
        finish(&mut metrics, Phase::PressureRhs, t);

        // 5. Pressure solve.
        let t = Instant::now();
        let solve_ctx = SolveContext {
            meshsize: &self.mesh,
            topology: &self.topology,
        };
        let report = self
            .solver
            .solve(&mut self.flow, &solve_ctx)
            .map_err(|source| StepError::Solver {
                phase: Phase::PressureSolve,
                source,
            })?;
        metrics.solver_iterations = report.iterations;
        metrics.solver_residual = report.residual;
        finish(&mut metrics, Phase::PressureSolve, t);

        // 6. Pressure ghosts.
        let t = Instant::now();
        exchange_twice(
            &mut self.manager,
            &mut self.comm,
            &mut self.flow,
            HaloKind::Pressure,
            Phase::PressureExchange,
        )?;
        finish(&mut metrics, Phase::PressureExchange, t);

        // 7. Velocity correction and obstacle fix-up.
        let t = Instant::now();
        FieldIterator::interior().iterate(&mut VelocityStencil, &ctx, &mut self.flow);
        FieldIterator::interior().iterate(&mut ObstacleStencil, &ctx, &mut self.flow);
        finish(&mut metrics, Phase::VelocityCorrection, t);

        // 8. Velocity ghosts.
        let t = Instant::now();
        exchange_twice(
            &mut self.manager,
            &mut self.comm,
            &mut self.flow,
            HaloKind::Velocity,
            Phase::VelocityExchange,
        )?;
        finish(&mut metrics, Phase::VelocityExchange, t);

        // 9. Physical velocity boundary.
        let t = Instant::now();
        self.walls.iterate(&mut self.velocity_boundary, &mut self.flow);
        finish(&mut metrics, Phase::VelocityBoundary, t);

        self.timestep.advance();
        let stats = self.manager.take_stats();
        metrics.dt = dt;
        metrics.halo_messages = stats.messages;
        metrics.halo_values = stats.values;
        metrics.total_us = started.elapsed().as_micros() as u64;
        trace!(
            rank = self.topology.rank().index(),
            step = metrics.step.0,
            dt,
            us = metrics.total_us,
            "timestep complete"
        );
        self.last_metrics = Some(metrics.clone());
        Ok(metrics)
    }

    /// Hand the current fields to the snapshot writer, if any.
    pub fn plot_vtk(&mut self, step: StepId, time: Real) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        trace!(rank = self.topology.rank().index(), step = step.0, time, "snapshot");
        writer.write(&self.flow, step, time)
    }

    /// The rank's fields.
    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    /// The rank's fields, mutably.
    pub fn flow_mut(&mut self) -> &mut FlowField {
        &mut self.flow
    }

    /// Simulated time, step count and current dt.
    pub fn timestep(&self) -> &Timestep {
        &self.timestep
    }

    /// The rank's neighbourhood.
    pub fn topology(&self) -> &ParallelTopology {
        &self.topology
    }

    /// The configuration the simulation was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The rank's mesh.
    pub fn mesh(&self) -> &UniformMeshsize {
        &self.mesh
    }

    /// Metrics of the most recent step.
    pub fn last_metrics(&self) -> Option<&StepMetrics> {
        self.last_metrics.as_ref()
    }
}

impl<C: Communicator> fmt::Debug for Simulation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("rank", &self.topology.rank())
            .field("local_size", &self.flow.subdomain().local_size())
            .field("timestep", &self.timestep)
            .field("mode", &self.manager.mode())
            .field("has_writer", &self.writer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Face;
    use eddy_halo::SerialComm;

    fn small() -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.geometry.size = [6, 6, 1];
        cfg.simulation.final_time = 0.1;
        cfg
    }

    #[test]
    fn rank_count_must_match() {
        let mut cfg = small();
        cfg.parallel.processes = [2, 1, 1];
        match Simulation::new(&cfg, SerialComm) {
            Err(ConfigError::RankCountMismatch {
                expected: 2,
                actual: 1,
            }) => {}
            other => panic!("expected RankCountMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = small();
        cfg.flow.reynolds = 0.0;
        assert!(matches!(
            Simulation::new(&cfg, SerialComm),
            Err(ConfigError::InvalidReynolds { .. })
        ));
    }

    #[test]
    fn initialisation_applies_the_lid() {
        let mut sim = Simulation::new(&small(), SerialComm).unwrap();
        sim.initialize_flow_field();
        // Top ghost row mirrors the lid: 2 * 1 - 0.
        let flow = sim.flow();
        assert_eq!(flow.velocity.get(4, 8, 0, 0), 2.0);
        assert_eq!(flow.velocity.get(4, 7, 0, 1), 0.0);
    }

    #[test]
    fn dns_step_runs_every_phase_in_order() {
        let mut sim = Simulation::new(&small(), SerialComm).unwrap();
        sim.initialize_flow_field();
        let m = sim.solve_timestep().unwrap();
        assert_eq!(m.phases().collect::<Vec<_>>(), Phase::SEQUENCE.to_vec());
        assert_eq!(m.step, StepId(1));
        assert_eq!(m.halo_messages, 0);
        assert!(m.dt > 0.0 && m.dt.is_finite());
        assert_eq!(sim.timestep().time(), m.dt);
        assert_eq!(sim.last_metrics(), Some(&m));
    }

    #[test]
    fn turbulent_step_starts_with_eddy_viscosity() {
        let mut cfg = small();
        cfg.simulation.kind = SimulationKind::Turbulence;
        let mut sim = Simulation::new(&cfg, SerialComm).unwrap();
        sim.initialize_flow_field();
        assert!(sim.flow().mixing_length.get(4, 4, 0) > 0.0);
        let m = sim.solve_timestep().unwrap();
        let phases: Vec<_> = m.phases().collect();
        assert_eq!(phases[0], Phase::EddyViscosity);
        assert_eq!(&phases[1..], &Phase::SEQUENCE[..]);
    }

    #[test]
    fn channel_step_marks_obstacles() {
        let mut cfg = small();
        cfg.simulation.scenario = Scenario::Channel;
        cfg.walls.velocities = [[0.0; 3]; 6];
        cfg.walls.velocities[Face::Left.index()] = [1.0, 0.0, 0.0];
        cfg.step.x_ratio = 0.5;
        cfg.step.y_ratio = 0.5;
        let mut sim = Simulation::new(&cfg, SerialComm).unwrap();
        sim.initialize_flow_field();
        let flags = &sim.flow().flags;
        assert!(!flags.is_fluid(2, 2, 0));
        assert!(!flags.is_fluid(4, 4, 0));
        assert!(flags.is_fluid(5, 2, 0));
        assert!(flags.is_fluid(2, 5, 0));
        sim.solve_timestep().unwrap();
        // No flow through the step's faces.
        assert_eq!(sim.flow().velocity.get(4, 3, 0, 0), 0.0);
        assert_eq!(sim.flow().velocity.get(3, 4, 0, 1), 0.0);
    }
}
