//! A Paxos node. A node is either an acceptor or a proposer, never both at once. It becomes a
//! proposer when asked to write a value and goes back to being an acceptor once a quorum of
//! acceptors has promised to respect its ballot and the value has been committed.

use std::fmt;

use log::{debug, info, trace};

use crate::network::Messenger;
use super::*;
use super::acceptor::Acceptor;
use super::message::{Commit, Message, Prepare, Promise};
use super::proposer::Proposer;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Role {
    Acceptor,
    Proposer
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Acceptor => write!(f, "acceptor"),
            Role::Proposer => write!(f, "proposer")
        }
    }
}

pub struct PaxosNode<V> {
    id: NodeId,
    acceptor: Acceptor<V>,
    proposer: Option<Proposer<V>>
}

impl<V: Clone + fmt::Debug> PaxosNode<V> {
    pub fn new(id: NodeId) -> PaxosNode<V> {
        PaxosNode {
            id,
            acceptor: Acceptor::new(id),
            proposer: None
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn role(&self) -> Role {
        match self.proposer {
            Some(_) => Role::Proposer,
            None => Role::Acceptor
        }
    }

    pub fn highest_seen(&self) -> SequenceNumber {
        self.acceptor.highest_seen()
    }

    /// Promises collected for the round in progress, if any
    pub fn promises_received(&self) -> usize {
        self.proposer.as_ref().map(|p| p.num_promises()).unwrap_or(0)
    }

    /// The value this node is currently trying to get decided, if it is proposing
    pub fn proposed_value(&self) -> Option<&V> {
        self.proposer.as_ref().map(|p| p.proposal_value())
    }

    /// The values this node has seen decided, oldest first. Not guaranteed to be complete
    /// while commits are still in flight
    pub fn read(&self) -> &[Commit<V>] {
        self.acceptor.log()
    }

    /// Starts a new proposal round for `value` and sends a prepare to every other member.
    /// May be called again while already proposing; the previous round is abandoned.
    pub fn write(&mut self, value: V, members: &[NodeId], net: &mut dyn Messenger<V>) {
        let ballot = self.acceptor.next_ballot();
        let proposer = Proposer::new(self.id, ballot, value);

        debug!("{} proposing {:?} at {}", self.id, proposer.proposal_value(), ballot);

        for peer in self.other_nodes(members) {
            self.send(peer, proposer.current_prepare_message(), net);
        }

        self.proposer = Some(proposer);
    }

    /// Handles one message delivered by the network.
    ///
    /// Stale messages are not errors and are dropped silently. A message that claims to come
    /// from this node or from a node outside `members` breaks the protocol and is rejected.
    pub fn receive(
        &mut self,
        message: Message<V>,
        members: &[NodeId],
        net: &mut dyn Messenger<V>) -> crate::Result<()> {

        debug!("{} ({}) received {}", self.id, self.role(), message);

        let sender = message.sender();
        if sender == self.id {
            return Err(crate::Error::InvalidMessage(
                format!("{} received its own {}", self.id, message.message_type())));
        }
        if !members.contains(&sender) {
            return Err(crate::Error::InvalidMessage(
                format!("{} received {} from non-member {}", self.id, message.message_type(), sender)));
        }

        match message {
            Message::Prepare(m) => self.receive_prepare(m, members, net),
            Message::Promise(m) => self.receive_promise(m, members, net),
            Message::Commit(m) => self.receive_commit(m)
        }

        Ok(())
    }

    fn receive_prepare(&mut self, m: Prepare, members: &[NodeId], net: &mut dyn Messenger<V>) {
        let promised = self.acceptor.highest_seen();
        if !self.acceptor.receive_prepare(&m) {
            trace!("{} ignoring stale prepare {} (promised {})", self.id, m.sequence_number, promised);
            return;
        }

        // Someone is proposing above our own round: give it up and come back higher
        if let Some(proposer) = self.proposer.take() {
            info!("{} got proposal {} above its own {}, escalating", self.id, m.sequence_number,
                proposer.current_proposal_id());
            let value = proposer.proposal_value().clone();
            self.write(value, members, net);
            return;
        }

        let promise = Message::promise(
            m.sequence_number,
            self.acceptor.last_committed().cloned(),
            self.id);
        self.send(m.sender, promise, net);
    }

    fn receive_promise(&mut self, m: Promise<V>, members: &[NodeId], net: &mut dyn Messenger<V>) {
        let highest_seen = self.acceptor.highest_seen();

        let proposer = match self.proposer.as_mut() {
            Some(p) => p,
            None => {
                trace!("{} not proposing, ignoring {}", self.id, m.sequence_number);
                return;
            }
        };

        if m.sequence_number < highest_seen {
            trace!("{} ignoring old promise {} (at {})", self.id, m.sequence_number, highest_seen);
            return;
        }

        if proposer.receive_promise(m.sender, m.last_committed.as_ref()) {
            info!("{} adopting already committed value {:?}", self.id, proposer.proposal_value());
        }

        let quorum = quorum_size(members.len());
        debug!("{} has {} promises, quorum is {}", self.id, proposer.num_promises(), quorum);

        if proposer.prepare_quorum_reached(quorum) {
            let commit = proposer.current_commit();

            for peer in self.other_nodes(members) {
                self.send(peer, Message::Commit(commit.clone()), net);
            }

            info!("{} committed {:?} at {}", self.id, commit.value, commit.sequence_number);
            self.acceptor.record_decision(commit);
            self.proposer = None;
        }
    }

    fn receive_commit(&mut self, m: Commit<V>) {
        if self.proposer.is_some() {
            trace!("{} busy proposing, ignoring {}", self.id, m);
            return;
        }

        let seq = m.sequence_number;
        let promised = self.acceptor.highest_seen();
        if !self.acceptor.receive_commit(m) {
            trace!("{} ignoring stale commit {} (promised {})", self.id, seq, promised);
            return;
        }

        if let Some(c) = self.acceptor.last_committed() {
            info!("{} committed {:?} at {}", self.id, c.value, c.sequence_number);
        }
    }

    fn send(&self, to: NodeId, message: Message<V>, net: &mut dyn Messenger<V>) {
        debug!("{} ({}) sent {} to {}", self.id, self.role(), message, to);
        net.send_message(to, message);
    }

    fn other_nodes<'a>(&self, members: &'a [NodeId]) -> impl Iterator<Item=NodeId> + 'a {
        let me = self.id;
        members.iter().cloned().filter(move |n| *n != me)
    }
}
