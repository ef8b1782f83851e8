//! Implementation of the Paxos algorithm (single synod version)
//!
//! A node acts as an acceptor for other nodes' proposals and, while it is driving a write, as
//! a proposer. There are no Nacks: stale messages are silently dropped and a proposer that
//! learns of a higher ballot escalates past it rather than giving up.

use std::fmt;

use rand::Rng;

pub mod acceptor;
pub mod message;
pub mod node;
pub mod proposer;

/// Identifies a node within the cluster.
///
/// Node identities are only ever compared. They break ties between ballots that share a
/// round number so they must be unique and stable for the lifetime of the node.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct NodeId(pub uuid::Uuid);

impl NodeId {
    /// Draws a new identity from the supplied random source. Seeded sources produce the same
    /// identities, and therefore the same tie-break order, on every run
    pub fn random<R: Rng>(rng: &mut R) -> NodeId {
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes);
        NodeId(uuid::Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.to_string();
        write!(f, "Node({})", &s[..8])
    }
}

/// Ballot identifier
///
/// Ordered by round number first and by the identity of the node that generated the ballot
/// second. Field order matters: the derived `Ord` is lexicographic over the fields.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct SequenceNumber {
    /// Round number
    pub round: u64,

    /// Node that generated the ballot. Used for tie-breaking and preventing collisions
    /// which could break the algorithm
    pub proposer: NodeId
}

impl SequenceNumber {
    pub fn new(round: u64, proposer: NodeId) -> SequenceNumber {
        SequenceNumber { round, proposer }
    }

    /// The lowest possible ballot for the given node
    pub fn zero(proposer: NodeId) -> SequenceNumber {
        SequenceNumber { round: 0, proposer }
    }

    /// Next round, same proposer
    pub fn successor(&self) -> SequenceNumber {
        SequenceNumber {
            round: self.round + 1,
            proposer: self.proposer
        }
    }

    /// Same round, attributed to `proposer`
    pub fn stamped(&self, proposer: NodeId) -> SequenceNumber {
        SequenceNumber {
            round: self.round,
            proposer
        }
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq({}, {})", self.round, self.proposer)
    }
}

/// Anything that names a round: either a bare round number or an existing ballot whose round
/// is carried over.
pub trait Round {
    fn round(&self) -> u64;
}

impl Round for u64 {
    fn round(&self) -> u64 {
        *self
    }
}

impl Round for SequenceNumber {
    fn round(&self) -> u64 {
        self.round
    }
}

/// Minimum number of responses that guarantees overlap between any two majorities
pub fn quorum_size(num_nodes: usize) -> usize {
    num_nodes / 2 + 1
}
