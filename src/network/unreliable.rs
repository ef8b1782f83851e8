//! Simulated unreliable network
//!
//! Basically a message queue where messages sometimes get dropped or sent out of order. Both
//! probabilities are expressed out of 10. Every send independently rolls to drop the message
//! and then rolls to shuffle the whole queue and request a drain. Drains are only requested
//! occasionally so that there is usually something queued to shuffle.
//!
//! The network never calls into nodes. A requested drain is carried out by the cluster's
//! dispatcher once control has returned to it, which keeps delivery out of node handlers.

use std::collections::VecDeque;

use log::trace;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::network::*;

/// Running totals of what the network did with the traffic it was given
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct NetworkStats {
    pub sent: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub shuffles: u64
}

pub struct Network<V> {
    queue: VecDeque<Envelope<V>>,
    drop_chance: u8,
    reorder_chance: u8,
    rng: StdRng,
    drain_requested: bool,
    stats: NetworkStats
}

impl<V> Network<V> {
    /// Chances are out of 10 and are clamped to that range
    pub fn new(drop_chance: u8, reorder_chance: u8, rng: StdRng) -> Network<V> {
        Network {
            queue: VecDeque::new(),
            drop_chance: drop_chance.min(10),
            reorder_chance: reorder_chance.min(10),
            rng,
            drain_requested: false,
            stats: NetworkStats::default()
        }
    }

    pub fn with_seed(drop_chance: u8, reorder_chance: u8, seed: u64) -> Network<V> {
        Network::new(drop_chance, reorder_chance, StdRng::seed_from_u64(seed))
    }

    /// A network that never drops. Every send shuffles the queue and requests a drain
    pub fn reliable(seed: u64) -> Network<V> {
        Network::with_seed(0, 0, seed)
    }

    pub fn drop_chance(&self) -> u8 { self.drop_chance }
    pub fn reorder_chance(&self) -> u8 { self.reorder_chance }
    pub fn stats(&self) -> NetworkStats { self.stats }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes the next message due for delivery
    pub fn next_delivery(&mut self) -> Option<Envelope<V>> {
        let e = self.queue.pop_front();
        if e.is_some() {
            self.stats.delivered += 1;
        }
        e
    }

    /// Returns true if a send since the last call asked for the queue to be drained
    pub fn take_drain_request(&mut self) -> bool {
        std::mem::replace(&mut self.drain_requested, false)
    }

    fn roll(&mut self) -> u8 {
        self.rng.random_range(0..10)
    }
}

impl<V> Messenger<V> for Network<V> {
    fn send_message(&mut self, to: NodeId, message: Message<V>) {
        self.stats.sent += 1;

        if self.roll() < self.drop_chance {
            self.stats.dropped += 1;
            trace!("Network dropped {} for {} from {}", message.message_type(), to, message.sender());
        } else {
            self.queue.push_back(Envelope { to, message });
        }

        if self.roll() >= self.reorder_chance {
            self.queue.make_contiguous().shuffle(&mut self.rng);
            self.stats.shuffles += 1;
            self.drain_requested = true;
            trace!("Network shuffled {} queued messages", self.queue.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> NodeId {
        NodeId(uuid::Uuid::from_bytes([b; 16]))
    }

    fn prepare(round: u64) -> Message<u32> {
        Message::prepare(round, id(0))
    }

    #[test]
    fn never_drops_with_zero_chance() {
        let mut n = Network::with_seed(0, 10, 7);
        for r in 0..100 {
            n.send_message(id(1), prepare(r));
        }
        assert_eq!(n.len(), 100);
        assert_eq!(n.stats().dropped, 0);
        assert_eq!(n.stats().sent, 100);
    }

    #[test]
    fn always_drops_with_full_chance() {
        let mut n = Network::with_seed(10, 10, 7);
        for r in 0..50 {
            n.send_message(id(1), prepare(r));
        }
        assert!(n.is_empty());
        assert_eq!(n.stats().dropped, 50);
    }

    #[test]
    fn full_reorder_chance_keeps_fifo_and_never_drains() {
        let mut n = Network::with_seed(0, 10, 3);
        for r in 0..20 {
            n.send_message(id(1), prepare(r));
        }
        assert!(!n.take_drain_request());
        assert_eq!(n.stats().shuffles, 0);
        for r in 0..20 {
            assert_eq!(n.next_delivery().unwrap().message.sequence_number().round, r);
        }
        assert!(n.next_delivery().is_none());
        assert_eq!(n.stats().delivered, 20);
    }

    #[test]
    fn zero_reorder_chance_drains_every_send() {
        let mut n = Network::with_seed(0, 0, 3);
        n.send_message(id(1), prepare(1));
        assert!(n.take_drain_request());
        assert!(!n.take_drain_request());
        n.send_message(id(2), prepare(2));
        assert!(n.take_drain_request());
        assert_eq!(n.stats().shuffles, 2);
    }

    #[test]
    fn shuffle_never_loses_or_duplicates() {
        let mut n = Network::with_seed(0, 5, 11);
        for r in 0..200 {
            n.send_message(id(1), prepare(r));
        }
        let mut rounds: Vec<u64> = Vec::new();
        while let Some(e) = n.next_delivery() {
            rounds.push(e.message.sequence_number().round);
        }
        rounds.sort();
        assert_eq!(rounds, (0..200).collect::<Vec<u64>>());
    }

    #[test]
    fn drop_rate_tracks_chance() {
        let mut n = Network::with_seed(3, 10, 99);
        for r in 0..10_000 {
            n.send_message(id(1), prepare(r));
        }
        let dropped = n.stats().dropped;
        assert!(dropped > 2_500 && dropped < 3_500, "dropped {}", dropped);
        assert_eq!(n.len() as u64 + dropped, 10_000);
    }

    #[test]
    fn chances_are_clamped() {
        let n: Network<u32> = Network::with_seed(42, 11, 0);
        assert_eq!(n.drop_chance(), 10);
        assert_eq!(n.reorder_chance(), 10);
    }
}
