//! Test utilities and fixtures for Eddy development.
//!
//! - [`run_ranks`] runs one closure per rank of an in-process cluster.
//! - [`fixtures`] builds fields whose values are functions of global
//!   coordinates, so results are comparable across decompositions.
//! - [`FrozenPressureSolver`] and [`RecordingWriter`] stand in for the
//!   solver and snapshot seams of the engine.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::io;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use eddy_core::{Real, SolverError, StepId};
use eddy_engine::{PressureSolver, SnapshotWriter, SolveContext, SolveReport};
use eddy_grid::FlowField;
use eddy_halo::LocalComm;

pub use fixtures::{
    fill_all, fill_interior, fill_velocity_all, fill_velocity_interior, global_coords,
    SeededField, SENTINEL,
};

/// Run `f` once per rank of a `size`-rank [`LocalComm`] cluster, each on
/// its own thread, and return the results in rank order.
///
/// A panic on any rank is re-raised on the caller.
pub fn run_ranks<T, F>(size: usize, f: F) -> Vec<T>
where
    F: Fn(LocalComm) -> T + Sync,
    T: Send,
{
    let comms = LocalComm::cluster(size);
    thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(v) => v,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    })
}

// ── FrozenPressureSolver ───────────────────────────────────────────

/// A pressure solver that leaves pressure untouched.
///
/// With pressure frozen the step reduces to explicit momentum plus the
/// exchanges, which makes results independent of how the grid is split.
/// Calls are counted through shared handles, readable after the solver
/// has been moved into a simulation.
#[derive(Clone, Debug, Default)]
pub struct FrozenPressureSolver {
    reinits: Arc<AtomicUsize>,
    solves: Arc<AtomicUsize>,
}

impl FrozenPressureSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reinits(&self) -> usize {
        self.reinits.load(Ordering::SeqCst)
    }

    pub fn solves(&self) -> usize {
        self.solves.load(Ordering::SeqCst)
    }
}

impl PressureSolver for FrozenPressureSolver {
    fn reinit_matrix(&mut self, _flow: &FlowField) {
        self.reinits.fetch_add(1, Ordering::SeqCst);
    }

    fn solve(
        &mut self,
        _flow: &mut FlowField,
        _ctx: &SolveContext<'_>,
    ) -> Result<SolveReport, SolverError> {
        self.solves.fetch_add(1, Ordering::SeqCst);
        Ok(SolveReport::default())
    }
}

/// A solver that fails every solve.
#[derive(Clone, Copy, Debug)]
pub struct FailingPressureSolver;

impl PressureSolver for FailingPressureSolver {
    fn reinit_matrix(&mut self, _flow: &FlowField) {}

    fn solve(
        &mut self,
        _flow: &mut FlowField,
        _ctx: &SolveContext<'_>,
    ) -> Result<SolveReport, SolverError> {
        Err(SolverError::Diverged {
            iterations: 1,
            residual: f64::INFINITY,
        })
    }
}

// ── RecordingWriter ────────────────────────────────────────────────

/// A snapshot writer that remembers when it was called.
#[derive(Clone, Debug, Default)]
pub struct RecordingWriter {
    written: Arc<Mutex<Vec<(StepId, Real)>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(step, time)` written so far.
    pub fn snapshots(&self) -> Vec<(StepId, Real)> {
        match self.written.lock() {
            Ok(w) => w.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SnapshotWriter for RecordingWriter {
    fn write(&mut self, _flow: &FlowField, step: StepId, time: Real) -> io::Result<()> {
        self.written
            .lock()
            .map_err(|_| io::Error::other("recording writer poisoned"))?
            .push((step, time));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Rank;
    use eddy_halo::Communicator;

    #[test]
    fn run_ranks_returns_in_rank_order() {
        let ranks = run_ranks(3, |comm| comm.rank());
        assert_eq!(ranks, vec![Rank(0), Rank(1), Rank(2)]);
    }

    #[test]
    fn run_ranks_lets_ranks_talk() {
        let mins = run_ranks(3, |mut comm| {
            let local = 1.0 + comm.rank().index() as Real;
            comm.all_reduce_min(local).unwrap()
        });
        assert_eq!(mins, vec![1.0; 3]);
    }

    #[test]
    fn recording_writer_shares_its_log() {
        let w = RecordingWriter::new();
        let mut handle = w.clone();
        let sd = eddy_grid::Subdomain::whole(eddy_core::Dim::Two, [2, 2, 1]).unwrap();
        handle.write(&FlowField::new(sd), StepId(3), 0.5).unwrap();
        assert_eq!(w.snapshots(), vec![(StepId(3), 0.5)]);
    }
}
