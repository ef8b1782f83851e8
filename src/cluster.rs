//! A group of Paxos nodes sharing one network.
//!
//! Clients read from and write to the cluster, not to individual nodes. Each request goes to a
//! node picked at random, so reads carry no freshness guarantee. The cluster also owns the
//! dispatcher loop: it hands queued envelopes from the network to their target nodes one at a
//! time, so node handlers never run inside one another.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::config::SimulationConfig;
use crate::network::Envelope;
use crate::network::unreliable::Network;
use crate::paxos::{quorum_size, NodeId};
use crate::paxos::message::Commit;
use crate::paxos::node::PaxosNode;
use crate::{Error, Result};

pub const DEFAULT_MAX_DELIVERIES: usize = 100_000;

pub struct Cluster<V> {
    nodes: Vec<PaxosNode<V>>,
    network: Network<V>,
    rng: StdRng,
    max_deliveries: usize
}

impl<V: Clone + fmt::Debug> Cluster<V> {
    pub fn new(network: Network<V>, rng: StdRng) -> Cluster<V> {
        Cluster {
            nodes: Vec::new(),
            network,
            rng,
            max_deliveries: DEFAULT_MAX_DELIVERIES
        }
    }

    /// Builds the network and `config.nodes` members. Both random sources derive from the
    /// configured seed, or from a fresh random seed if none is configured
    pub fn from_config(config: &SimulationConfig) -> Result<Cluster<V>> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut seeds = StdRng::seed_from_u64(seed);
        let network = Network::new(config.drop_chance, config.reorder_chance,
            StdRng::seed_from_u64(seeds.random()));

        let mut cluster = Cluster::new(network, StdRng::seed_from_u64(seeds.random()));
        cluster.set_max_deliveries(config.max_deliveries);

        for _ in 0..config.nodes {
            cluster.add_node();
        }

        debug!("Built cluster of {} nodes from seed {}", config.nodes, seed);

        Ok(cluster)
    }

    pub fn set_max_deliveries(&mut self, max_deliveries: usize) {
        self.max_deliveries = max_deliveries;
    }

    /// Adds a node to the membership. Registering the same node twice is not detected
    pub fn register(&mut self, node: PaxosNode<V>) {
        debug!("Registered {}", node.id());
        self.nodes.push(node);
    }

    /// Creates a node with a fresh identity, registers it and returns its id
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId::random(&mut self.rng);
        self.register(PaxosNode::new(id));
        id
    }

    pub fn members(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id()).collect()
    }

    pub fn nodes(&self) -> &[PaxosNode<V>] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&PaxosNode<V>> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn quorum_size(&self) -> usize {
        quorum_size(self.nodes.len())
    }

    pub fn network(&self) -> &Network<V> {
        &self.network
    }

    /// Asks a randomly chosen node to get `value` decided
    pub fn write(&mut self, value: V) -> Result<()> {
        let id = self.random_member()?;
        self.write_to(id, value)
    }

    /// Asks a specific node to get `value` decided. Running out of delivery budget while
    /// draining is not an error here; the remaining messages stay queued.
    pub fn write_to(&mut self, id: NodeId, value: V) -> Result<()> {
        let members = self.members();
        let node = self.nodes.iter_mut().find(|n| n.id() == id).ok_or(Error::UnknownNode(id))?;

        node.write(value, &members, &mut self.network);

        if self.network.take_drain_request() {
            match self.process_queue() {
                Ok(_) => (),
                Err(Error::DeliveryLimit { delivered, pending }) => {
                    // The write itself went through. Whatever is left waits for the next flush
                    warn!("Write to {} stopped draining after {} deliveries, {} left queued",
                        id, delivered, pending);
                },
                Err(e) => return Err(e)
            }
        }
        Ok(())
    }

    /// Log of a randomly chosen node. May be stale or incomplete
    pub fn read(&mut self) -> Result<&[Commit<V>]> {
        let id = self.random_member()?;
        self.read_from(id)
    }

    pub fn read_from(&self, id: NodeId) -> Result<&[Commit<V>]> {
        self.node(id).map(|n| n.read()).ok_or(Error::UnknownNode(id))
    }

    /// Delivers everything queued, including whatever those deliveries send in turn, until the
    /// network is empty. Returns the number of messages delivered.
    pub fn process_queue(&mut self) -> Result<usize> {
        let mut delivered = 0;

        while !self.network.is_empty() {
            if delivered >= self.max_deliveries {
                warn!("Giving up after {} deliveries with {} messages still queued",
                    delivered, self.network.len());
                return Err(Error::DeliveryLimit {
                    delivered,
                    pending: self.network.len()
                });
            }
            if self.deliver_next()? {
                delivered += 1;
            }
        }

        // Anything requested while draining has been served by this loop
        self.network.take_drain_request();

        Ok(delivered)
    }

    /// Delivers the single next queued message. Returns false if nothing was queued
    pub fn deliver_next(&mut self) -> Result<bool> {
        match self.network.next_delivery() {
            Some(envelope) => {
                self.deliver(envelope)?;
                Ok(true)
            },
            None => Ok(false)
        }
    }

    /// Maps each value found at the end of a node's log to the number of nodes reporting it.
    /// Nodes with empty logs are counted under `None`.
    pub fn get_consensus(&self) -> HashMap<Option<V>, usize>
        where V: Eq + Hash
    {
        let mut res = HashMap::new();
        for n in &self.nodes {
            let value = n.read().last().map(|c| c.value.clone());
            *res.entry(value).or_insert(0) += 1;
        }
        res
    }

    fn deliver(&mut self, envelope: Envelope<V>) -> Result<()> {
        let members = self.members();
        let to = envelope.to;
        let node = self.nodes.iter_mut().find(|n| n.id() == to).ok_or(Error::UnknownNode(to))?;

        node.receive(envelope.message, &members, &mut self.network)
    }

    fn random_member(&mut self) -> Result<NodeId> {
        if self.nodes.is_empty() {
            return Err(Error::EmptyCluster);
        }
        let idx = self.rng.random_range(0..self.nodes.len());
        Ok(self.nodes[idx].id())
    }
}
