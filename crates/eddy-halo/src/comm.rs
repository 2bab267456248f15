//! Point-to-point messaging between ranks.

use eddy_core::{CommError, Rank, Real};

/// Tagged point-to-point transfer of flat `Real` arrays plus the one
/// collective the timestep loop needs.
///
/// Every call blocks until it completes. Message lengths are never sent on
/// the wire: the receiver passes a buffer of the length it expects, and a
/// message of any other length is an error. Messages between one pair of
/// ranks are matched by tag, so transfers issued in a different order
/// than they are received do not get confused.
pub trait Communicator {
    /// This rank.
    fn rank(&self) -> Rank;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Send `data` to `dest` under `tag`.
    fn send(&mut self, dest: Rank, tag: u32, data: &[Real]) -> Result<(), CommError>;

    /// Receive the next message from `src` carrying `tag` into `buf`.
    fn recv(&mut self, src: Rank, tag: u32, buf: &mut [Real]) -> Result<(), CommError>;

    /// Send to one peer while receiving from another, without deadlock
    /// when every rank calls it at once.
    fn sendrecv(
        &mut self,
        dest: Rank,
        send_tag: u32,
        data: &[Real],
        src: Rank,
        recv_tag: u32,
        buf: &mut [Real],
    ) -> Result<(), CommError> {
        self.send(dest, send_tag, data)?;
        self.recv(src, recv_tag, buf)
    }

    /// Minimum of `value` over all ranks. Every rank must call it.
    fn all_reduce_min(&mut self, value: Real) -> Result<Real, CommError>;
}

impl<C: Communicator + ?Sized> Communicator for &mut C {
    fn rank(&self) -> Rank {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn send(&mut self, dest: Rank, tag: u32, data: &[Real]) -> Result<(), CommError> {
        (**self).send(dest, tag, data)
    }

    fn recv(&mut self, src: Rank, tag: u32, buf: &mut [Real]) -> Result<(), CommError> {
        (**self).recv(src, tag, buf)
    }

    fn sendrecv(
        &mut self,
        dest: Rank,
        send_tag: u32,
        data: &[Real],
        src: Rank,
        recv_tag: u32,
        buf: &mut [Real],
    ) -> Result<(), CommError> {
        (**self).sendrecv(dest, send_tag, data, src, recv_tag, buf)
    }

    fn all_reduce_min(&mut self, value: Real) -> Result<Real, CommError> {
        (**self).all_reduce_min(value)
    }
}

// ── SerialComm ─────────────────────────────────────────────────────

/// The communicator of a single-rank run.
///
/// There are no peers: a single-rank topology has no neighbours, so no
/// exchange ever addresses one, and the reductions are the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl SerialComm {
    fn no_peer(peer: Rank) -> CommError {
        CommError::InvalidPeer { peer, size: 1 }
    }
}

impl Communicator for SerialComm {
    fn rank(&self) -> Rank {
        Rank(0)
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&mut self, dest: Rank, _tag: u32, _data: &[Real]) -> Result<(), CommError> {
        Err(Self::no_peer(dest))
    }

    fn recv(&mut self, src: Rank, _tag: u32, _buf: &mut [Real]) -> Result<(), CommError> {
        Err(Self::no_peer(src))
    }

    fn all_reduce_min(&mut self, value: Real) -> Result<Real, CommError> {
        Ok(value)
    }
}
