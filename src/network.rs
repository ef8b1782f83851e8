use crate::paxos::NodeId;
use crate::paxos::message::Message;

pub mod null;
pub mod unreliable;

/// A message in flight and the node it is addressed to
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Envelope<V> {
    pub to: NodeId,
    pub message: Message<V>
}

/// Outbound interface nodes send through
///
/// Sending never fails from the sender's point of view. Implementations are free to lose or
/// reorder messages; the protocol must tolerate both.
pub trait Messenger<V> {
    fn send_message(&mut self, to: NodeId, message: Message<V>);
}
