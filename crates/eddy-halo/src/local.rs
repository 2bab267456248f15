//! In-process transport: one thread per rank, one channel per ordered
//! pair of ranks.

use std::collections::VecDeque;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eddy_core::{CommError, Rank, Real};
use indexmap::IndexMap;

use crate::comm::Communicator;

const REDUCE_GATHER_TAG: u32 = u32::MAX - 1;
const REDUCE_BCAST_TAG: u32 = u32::MAX;

#[derive(Debug)]
struct Message {
    tag: u32,
    data: Vec<Real>,
}

/// One rank's endpoint of an in-process cluster.
///
/// Channels are unbounded, so a send never blocks and the paired
/// send-receive of every rank completes regardless of call order. A
/// message whose tag the caller is not waiting for yet is stashed per
/// `(source, tag)` until it is asked for. Dropping an endpoint
/// disconnects it: peers blocked on it, or sending to it, get
/// [`CommError::PeerDisconnected`].
#[derive(Debug)]
pub struct LocalComm {
    rank: Rank,
    size: usize,
    outgoing: Vec<Option<Sender<Message>>>,
    incoming: Vec<Option<Receiver<Message>>>,
    stash: IndexMap<(usize, u32), VecDeque<Vec<Real>>>,
}

impl LocalComm {
    /// Endpoints for `size` ranks, index `r` belonging to rank `r`.
    pub fn cluster(size: usize) -> Vec<LocalComm> {
        let mut outgoing: Vec<Vec<Option<Sender<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut incoming: Vec<Vec<Option<Receiver<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        for src in 0..size {
            for dst in 0..size {
                if src != dst {
                    let (tx, rx) = unbounded();
                    outgoing[src][dst] = Some(tx);
                    incoming[dst][src] = Some(rx);
                }
            }
        }
        outgoing
            .into_iter()
            .zip(incoming)
            .enumerate()
            .map(|(rank, (outgoing, incoming))| LocalComm {
                rank: Rank(rank),
                size,
                outgoing,
                incoming,
                stash: IndexMap::new(),
            })
            .collect()
    }

    fn invalid(&self, peer: Rank) -> CommError {
        CommError::InvalidPeer {
            peer,
            size: self.size,
        }
    }

    /// Next message from `src` with `tag`, from the stash or the channel.
    fn next_message(&mut self, src: Rank, tag: u32) -> Result<Vec<Real>, CommError> {
        let s = src.index();
        if let Some(data) = self.stash.get_mut(&(s, tag)).and_then(VecDeque::pop_front) {
            return Ok(data);
        }
        let Some(rx) = self.incoming.get(s).and_then(Option::as_ref) else {
            return Err(self.invalid(src));
        };
        loop {
            let msg = rx
                .recv()
                .map_err(|_| CommError::PeerDisconnected { peer: src })?;
            if msg.tag == tag {
                return Ok(msg.data);
            }
            self.stash.entry((s, msg.tag)).or_default().push_back(msg.data);
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, dest: Rank, tag: u32, data: &[Real]) -> Result<(), CommError> {
        let Some(tx) = self.outgoing.get(dest.index()).and_then(Option::as_ref) else {
            return Err(self.invalid(dest));
        };
        tx.send(Message {
            tag,
            data: data.to_vec(),
        })
        .map_err(|_| CommError::PeerDisconnected { peer: dest })
    }

    fn recv(&mut self, src: Rank, tag: u32, buf: &mut [Real]) -> Result<(), CommError> {
        let data = self.next_message(src, tag)?;
        if data.len() != buf.len() {
            return Err(CommError::UnexpectedLength {
                peer: src,
                tag,
                expected: buf.len(),
                actual: data.len(),
            });
        }
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn all_reduce_min(&mut self, value: Real) -> Result<Real, CommError> {
        let root = Rank(0);
        let mut slot = [value];
        if self.rank != root {
            self.send(root, REDUCE_GATHER_TAG, &slot)?;
            self.recv(root, REDUCE_BCAST_TAG, &mut slot)?;
            return Ok(slot[0]);
        }
        let mut min = value;
        for r in 1..self.size {
            self.recv(Rank(r), REDUCE_GATHER_TAG, &mut slot)?;
            min = min.min(slot[0]);
        }
        for r in 1..self.size {
            self.send(Rank(r), REDUCE_BCAST_TAG, &[min])?;
        }
        Ok(min)
    }
}
