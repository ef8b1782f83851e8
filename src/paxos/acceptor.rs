use super::*;
use super::message::{Commit, Prepare};

/// Acceptor half of a node: the promise it has made and the log of decided values. This state
/// survives role changes. It lives in memory only; there is no crash recovery.
pub struct Acceptor<V> {
    peer_id: NodeId,
    highest_seen: SequenceNumber,
    log: Vec<Commit<V>>
}

impl<V> Acceptor<V> {
    pub fn new(peer_id: NodeId) -> Acceptor<V> {
        Acceptor {
            peer_id,
            highest_seen: SequenceNumber::zero(peer_id),
            log: Vec::new()
        }
    }

    pub fn highest_seen(&self) -> SequenceNumber {
        self.highest_seen
    }

    pub fn log(&self) -> &[Commit<V>] {
        &self.log
    }

    pub fn last_committed(&self) -> Option<&Commit<V>> {
        self.log.last()
    }

    /// Only ballots strictly higher than every one seen so far may be prepared
    fn is_stale_prepare(&self, prepare: &Prepare) -> bool {
        prepare.sequence_number <= self.highest_seen
    }

    /// Promises to ignore anything older than the prepared ballot. Returns false and leaves the
    /// state untouched for stale prepares.
    pub fn receive_prepare(&mut self, prepare: &Prepare) -> bool {
        if self.is_stale_prepare(prepare) {
            return false;
        }
        self.highest_seen = prepare.sequence_number;
        true
    }

    /// Appends the commit unless it is older than the current promise
    pub fn receive_commit(&mut self, commit: Commit<V>) -> bool {
        if commit.sequence_number < self.highest_seen {
            return false;
        }
        self.highest_seen = commit.sequence_number;
        self.log.push(commit);
        true
    }

    /// Records a value this node decided as proposer. The promise moves to the ballot of the
    /// newest log entry.
    pub fn record_decision(&mut self, commit: Commit<V>) {
        self.log.push(commit);
        self.highest_seen = match self.log.last() {
            Some(c) => c.sequence_number,
            None => SequenceNumber::zero(self.peer_id)
        };
    }

    /// Mints a ballot for a new round owned by this node: one round past anything seen so far
    pub fn next_ballot(&mut self) -> SequenceNumber {
        self.highest_seen = self.highest_seen.successor().stamped(self.peer_id);
        self.highest_seen
    }
}
