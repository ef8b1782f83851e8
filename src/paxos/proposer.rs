use std::collections::HashSet;

use super::*;
use super::message::{Commit, Message};

/// Transient state of a node while it drives a proposal round
pub struct Proposer<V> {
    peer_id: NodeId,
    proposal_id: SequenceNumber,
    value: V,
    highest_accepted: SequenceNumber,
    promises_received: HashSet<NodeId>
}

impl<V: Clone> Proposer<V> {
    pub fn new(peer_id: NodeId, proposal_id: SequenceNumber, value: V) -> Proposer<V> {
        Proposer {
            peer_id,
            proposal_id,
            value,
            highest_accepted: SequenceNumber::zero(peer_id),
            promises_received: HashSet::new()
        }
    }

    pub fn prepare_quorum_reached(&self, quorum_size: usize) -> bool {
        self.promises_received.len() >= quorum_size
    }

    pub fn num_promises(&self) -> usize { self.promises_received.len() }

    pub fn current_proposal_id(&self) -> SequenceNumber {
        self.proposal_id
    }

    /// The value this round will commit. Starts as the local proposal and is replaced by any
    /// value a promising acceptor reports having already committed
    pub fn proposal_value(&self) -> &V {
        &self.value
    }

    /// Ballot of the newest already-committed value reported by an acceptor this round
    pub fn highest_accepted(&self) -> SequenceNumber {
        self.highest_accepted
    }

    pub fn current_prepare_message(&self) -> Message<V> {
        Message::prepare(self.proposal_id, self.peer_id)
    }

    pub fn current_commit(&self) -> Commit<V> {
        Commit::new(self.proposal_id, self.value.clone(), self.peer_id)
    }

    /// Counts the promise and applies the value-adoption rule: if the acceptor has already
    /// committed a value under a ballot newer than any reported so far this round, that value
    /// replaces ours. Returns true when the proposal value changed.
    pub fn receive_promise(
        &mut self,
        from_peer: NodeId,
        last_committed: Option<&Commit<V>>) -> bool {

        self.promises_received.insert(from_peer);

        match last_committed {
            Some(c) if c.sequence_number > self.highest_accepted => {
                self.highest_accepted = c.sequence_number;
                self.value = c.value.clone();
                true
            },
            _ => false
        }
    }
}
