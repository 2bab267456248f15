//! The per-rank exchange driver.

use eddy_core::{Axis, CommError, Dim, Face, HaloError, Rank};
use eddy_grid::{FlowField, ParallelTopology};
use eddy_stencil::GhostLayerIterator;
use tracing::{debug, trace};

use crate::buffer::GhostBuffer;
use crate::comm::Communicator;
use crate::geometry::FacePlan;
use crate::kind::HaloKind;
use crate::stencils::{BufferFillStencil, BufferReadStencil, FacePlans};

/// How the two transfers of an axis pair are issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExchangeMode {
    /// One paired send-receive per direction: first everything shifts
    /// towards the low neighbour, then towards the high neighbour.
    #[default]
    PairedSendRecv,
    /// Both sends of the pair are posted first, then both receives are
    /// completed.
    Posted,
}

/// Running totals of exchange traffic from one rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExchangeStats {
    /// Messages sent.
    pub messages: u64,
    /// Values sent.
    pub values: u64,
}

// ── Channel ────────────────────────────────────────────────────────

/// Plans and buffers of one kind, sized once.
#[derive(Debug)]
struct Channel {
    kind: HaloKind,
    fill: FacePlans,
    read: FacePlans,
    send: [GhostBuffer; 6],
    recv: [GhostBuffer; 6],
}

impl Channel {
    fn new(kind: HaloKind, flow: &FlowField, ghosts: &GhostLayerIterator) -> Self {
        let sd = flow.subdomain();
        let mut fill: FacePlans = Default::default();
        let mut read: FacePlans = Default::default();
        let mut send: [GhostBuffer; 6] = Default::default();
        let mut recv: [GhostBuffer; 6] = Default::default();
        for &face in ghosts.faces() {
            let f = face.index();
            let out = FacePlan::fill(kind, sd, face);
            let back = FacePlan::read(kind, sd, face);
            send[f] = GhostBuffer::new(out.buffer_len());
            recv[f] = GhostBuffer::new(back.buffer_len());
            fill[f] = Some(out);
            read[f] = Some(back);
        }
        Self {
            kind,
            fill,
            read,
            send,
            recv,
        }
    }

    fn inconsistent(&self, face: Face, expected: usize, actual: usize) -> HaloError {
        HaloError::ConfigurationInconsistency {
            kind: self.kind.name(),
            face,
            expected,
            actual,
        }
    }

    fn comm_error(&self, face: Face, err: CommError) -> HaloError {
        match err {
            CommError::UnexpectedLength {
                expected, actual, ..
            } => self.inconsistent(face, expected, actual),
            other => HaloError::CommunicationFailure(other),
        }
    }

    fn pack(
        &mut self,
        ghosts: &GhostLayerIterator,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        for b in &mut self.send {
            b.rewind();
        }
        ghosts.iterate(
            &mut BufferFillStencil::new(self.kind, &self.fill, &mut self.send),
            flow,
        );
        for &face in ghosts.faces() {
            let b = &self.send[face.index()];
            if b.cursor() != b.len() {
                return Err(self.inconsistent(face, b.len(), b.cursor()));
            }
        }
        Ok(())
    }

    fn unpack(
        &mut self,
        ghosts: &GhostLayerIterator,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        for b in &mut self.recv {
            b.rewind();
        }
        ghosts.iterate(
            &mut BufferReadStencil::new(self.kind, &self.read, &mut self.recv),
            flow,
        );
        for &face in ghosts.faces() {
            let b = &self.recv[face.index()];
            if b.cursor() != b.len() {
                return Err(self.inconsistent(face, b.len(), b.cursor()));
            }
        }
        Ok(())
    }

    fn post_send<C: Communicator + ?Sized>(
        &self,
        comm: &mut C,
        peer: Rank,
        face: Face,
        stats: &mut ExchangeStats,
    ) -> Result<(), HaloError> {
        let data = self.send[face.index()].as_slice();
        comm.send(peer, self.kind.tag(face), data)
            .map_err(|e| self.comm_error(face, e))?;
        stats.messages += 1;
        stats.values += data.len() as u64;
        Ok(())
    }

    /// The neighbour across `face` sent from its opposite face.
    fn complete_recv<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        peer: Rank,
        face: Face,
    ) -> Result<(), HaloError> {
        let tag = self.kind.tag(face.opposite());
        let result = comm.recv(peer, tag, self.recv[face.index()].as_mut_slice());
        result.map_err(|e| self.comm_error(face, e))
    }

    /// Send the buffer of `out` and receive into the buffer of `into`,
    /// skipping whichever side has no neighbour.
    fn shift<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        topology: &ParallelTopology,
        out: Face,
        into: Face,
        stats: &mut ExchangeStats,
    ) -> Result<(), HaloError> {
        match (topology.neighbour(out), topology.neighbour(into)) {
            (Some(dest), Some(src)) => {
                let len = self.send[out.index()].len() as u64;
                let send_tag = self.kind.tag(out);
                let recv_tag = self.kind.tag(into.opposite());
                comm.sendrecv(
                    dest,
                    send_tag,
                    self.send[out.index()].as_slice(),
                    src,
                    recv_tag,
                    self.recv[into.index()].as_mut_slice(),
                )
                .map_err(|e| self.comm_error(into, e))?;
                stats.messages += 1;
                stats.values += len;
                Ok(())
            }
            (Some(dest), None) => self.post_send(comm, dest, out, stats),
            (None, Some(src)) => self.complete_recv(comm, src, into),
            (None, None) => Ok(()),
        }
    }

    fn transfer_axis<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        topology: &ParallelTopology,
        mode: ExchangeMode,
        axis: Axis,
        stats: &mut ExchangeStats,
    ) -> Result<(), HaloError> {
        let (low, high) = (axis.low_face(), axis.high_face());
        match mode {
            ExchangeMode::PairedSendRecv => {
                self.shift(comm, topology, low, high, stats)?;
                self.shift(comm, topology, high, low, stats)
            }
            ExchangeMode::Posted => {
                for face in [low, high] {
                    if let Some(dest) = topology.neighbour(face) {
                        self.post_send(comm, dest, face, stats)?;
                    }
                }
                for face in [high, low] {
                    if let Some(src) = topology.neighbour(face) {
                        self.complete_recv(comm, src, face)?;
                    }
                }
                Ok(())
            }
        }
    }
}

// ── ParallelManager ────────────────────────────────────────────────

/// Keeps the ghost layers of one rank's fields in sync with its
/// neighbours.
///
/// Built once from the rank's topology and fields; every buffer is sized
/// in the constructor. Each `communicate_*` call runs one fill, transfer
/// and read cycle. Corner ghost cells are current only after two
/// consecutive calls. On a rank without neighbours every call is a no-op.
///
/// Any error is fatal: buffers may be half exchanged and the fields must
/// not be used further.
#[derive(Debug)]
pub struct ParallelManager {
    dim: Dim,
    topology: ParallelTopology,
    mode: ExchangeMode,
    ghosts: GhostLayerIterator,
    channels: [Channel; 3],
    stats: ExchangeStats,
}

impl ParallelManager {
    /// A manager for `flow` on the rank described by `topology`.
    pub fn new(topology: ParallelTopology, flow: &FlowField, mode: ExchangeMode) -> Self {
        let dim = flow.subdomain().dim();
        let ghosts = GhostLayerIterator::new(dim, &topology);
        let channels = HaloKind::ALL.map(|kind| Channel::new(kind, flow, &ghosts));
        Self {
            dim,
            topology,
            mode,
            ghosts,
            channels,
            stats: ExchangeStats::default(),
        }
    }

    /// The rank's topology.
    pub fn topology(&self) -> &ParallelTopology {
        &self.topology
    }

    /// The configured exchange mode.
    pub fn mode(&self) -> ExchangeMode {
        self.mode
    }

    /// Faces that have a neighbour, in exchange order.
    pub fn exchanged_faces(&self) -> &[Face] {
        self.ghosts.faces()
    }

    /// Length of the buffer sent from `face` for `kind`, or 0 when the face
    /// has no neighbour.
    pub fn send_len(&self, kind: HaloKind, face: Face) -> usize {
        self.channels[kind.index()].send[face.index()].len()
    }

    /// Length of the buffer received on `face` for `kind`, or 0 when the
    /// face has no neighbour.
    pub fn recv_len(&self, kind: HaloKind, face: Face) -> usize {
        self.channels[kind.index()].recv[face.index()].len()
    }

    /// Traffic sent since construction or the last [`take_stats`](Self::take_stats).
    pub fn stats(&self) -> ExchangeStats {
        self.stats
    }

    /// Return the traffic counters and reset them.
    pub fn take_stats(&mut self) -> ExchangeStats {
        std::mem::take(&mut self.stats)
    }

    /// Exchange pressure ghost layers.
    pub fn communicate_pressure<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        self.communicate(HaloKind::Pressure, comm, flow)
    }

    /// Exchange velocity ghost layers.
    pub fn communicate_velocity<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        self.communicate(HaloKind::Velocity, comm, flow)
    }

    /// Exchange eddy-viscosity ghost layers.
    pub fn communicate_viscosity<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        self.communicate(HaloKind::Viscosity, comm, flow)
    }

    /// One fill, transfer and read cycle for `kind`.
    pub fn communicate<C: Communicator + ?Sized>(
        &mut self,
        kind: HaloKind,
        comm: &mut C,
        flow: &mut FlowField,
    ) -> Result<(), HaloError> {
        if self.ghosts.faces().is_empty() {
            trace!(kind = kind.name(), "no neighbours, exchange skipped");
            return Ok(());
        }
        let before = self.stats;
        let channel = &mut self.channels[kind.index()];
        channel.pack(&self.ghosts, flow)?;
        for &axis in self.dim.axes() {
            channel.transfer_axis(comm, &self.topology, self.mode, axis, &mut self.stats)?;
        }
        channel.unpack(&self.ghosts, flow)?;
        debug!(
            rank = self.topology.rank().index(),
            kind = kind.name(),
            faces = self.ghosts.faces().len(),
            messages = self.stats.messages - before.messages,
            values = self.stats.values - before.values,
            "halo exchanged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialComm;
    use eddy_grid::Subdomain;

    #[test]
    fn serial_exchange_is_a_no_op() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let mut flow = FlowField::new(sd);
        flow.pressure.fill(3.0);
        let before = flow.clone();
        let mut m = ParallelManager::new(ParallelTopology::serial(), &flow, ExchangeMode::default());
        assert!(m.exchanged_faces().is_empty());
        m.communicate_pressure(&mut SerialComm, &mut flow).unwrap();
        m.communicate_velocity(&mut SerialComm, &mut flow).unwrap();
        assert_eq!(flow, before);
        assert_eq!(m.stats(), ExchangeStats::default());
        assert_eq!(m.send_len(HaloKind::Pressure, Face::Left), 0);
    }

    #[test]
    fn buffers_sized_from_face_plans() {
        let sd = Subdomain::new(Dim::Two, [4, 8, 1], [4, 0, 0]).unwrap();
        let flow = FlowField::new(sd);
        let mut n = [None; 6];
        n[Face::Left.index()] = Some(Rank(0));
        let topo = ParallelTopology::new(Rank(1), 2, n);
        let m = ParallelManager::new(topo, &flow, ExchangeMode::Posted);
        assert_eq!(m.exchanged_faces(), &[Face::Left]);
        assert_eq!(m.send_len(HaloKind::Pressure, Face::Left), 8);
        assert_eq!(m.send_len(HaloKind::Velocity, Face::Left), 16);
        assert_eq!(m.recv_len(HaloKind::Velocity, Face::Left), 24);
        assert_eq!(m.send_len(HaloKind::Velocity, Face::Right), 0);
        assert_eq!(m.mode(), ExchangeMode::Posted);
    }
}
