//! Protocol messages
//!
//! Each variant carries only the fields relevant to it. Prepare and Commit ballots are always
//! attributed to the node transmitting them; a Promise echoes the ballot it promises so the
//! proposer can match it against its current round.

use std::fmt;

use super::{NodeId, Round, SequenceNumber};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MessageType {
    Prepare,
    Promise,
    Commit
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Prepare => "prepare",
            MessageType::Promise => "promise",
            MessageType::Commit => "commit"
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Prepare {
    pub sequence_number: SequenceNumber,
    pub sender: NodeId
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Promise<V> {
    pub sequence_number: SequenceNumber,

    /// The acceptor's most recently committed log entry, if it has one
    pub last_committed: Option<Commit<V>>,

    pub sender: NodeId
}

/// A decided value. Commits double as log entries
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit<V> {
    pub sequence_number: SequenceNumber,
    pub value: V,
    pub sender: NodeId
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Message<V> {
    Prepare(Prepare),
    Promise(Promise<V>),
    Commit(Commit<V>)
}

impl<V> Message<V> {
    /// Prepare for the given round, attributed to `sender`
    pub fn prepare<R: Round>(round: R, sender: NodeId) -> Message<V> {
        Message::Prepare(Prepare {
            sequence_number: SequenceNumber::new(round.round(), sender),
            sender
        })
    }

    /// Promise for exactly `sequence_number`. The ballot is not re-stamped with `sender`, since
    /// proposers discard promises below their own ballot and a re-stamped one could sort lower
    pub fn promise(
        sequence_number: SequenceNumber,
        last_committed: Option<Commit<V>>,
        sender: NodeId) -> Message<V> {

        Message::Promise(Promise {
            sequence_number,
            last_committed,
            sender
        })
    }

    /// Commit of `value` for the given round, attributed to `sender`
    pub fn commit<R: Round>(round: R, value: V, sender: NodeId) -> Message<V> {
        Message::Commit(Commit::new(round, value, sender))
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Prepare(_) => MessageType::Prepare,
            Message::Promise(_) => MessageType::Promise,
            Message::Commit(_) => MessageType::Commit
        }
    }

    pub fn sequence_number(&self) -> SequenceNumber {
        match self {
            Message::Prepare(m) => m.sequence_number,
            Message::Promise(m) => m.sequence_number,
            Message::Commit(m) => m.sequence_number
        }
    }

    pub fn sender(&self) -> NodeId {
        match self {
            Message::Prepare(m) => m.sender,
            Message::Promise(m) => m.sender,
            Message::Commit(m) => m.sender
        }
    }
}

impl<V> Commit<V> {
    pub fn new<R: Round>(round: R, value: V, sender: NodeId) -> Commit<V> {
        Commit {
            sequence_number: SequenceNumber::new(round.round(), sender),
            value,
            sender
        }
    }
}

impl<V: fmt::Debug> fmt::Display for Commit<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit ({}) value {:?}", self.sequence_number, self.value)
    }
}

impl<V: fmt::Debug> fmt::Display for Message<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Prepare(m) => write!(f, "prepare ({})", m.sequence_number),
            Message::Promise(m) => match &m.last_committed {
                Some(c) => write!(f, "promise ({}) carrying {:?} from ({})",
                    m.sequence_number, c.value, c.sequence_number),
                None => write!(f, "promise ({})", m.sequence_number)
            },
            Message::Commit(m) => write!(f, "{}", m)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> NodeId {
        NodeId(uuid::Uuid::from_bytes([b; 16]))
    }

    #[test]
    fn bare_round_is_stamped_with_sender() {
        let m: Message<&str> = Message::prepare(3u64, id(1));
        assert_eq!(m.sequence_number(), SequenceNumber::new(3, id(1)));
        assert_eq!(m.sender(), id(1));
        assert_eq!(m.message_type(), MessageType::Prepare);
    }

    #[test]
    fn existing_ballot_is_restamped_with_sender() {
        let carried = SequenceNumber::new(5, id(9));
        let m = Message::commit(carried, "foo", id(2));
        assert_eq!(m.sequence_number(), SequenceNumber::new(5, id(2)));
        assert_eq!(m, Message::Commit(Commit {
            sequence_number: SequenceNumber::new(5, id(2)),
            value: "foo",
            sender: id(2)
        }));
    }

    #[test]
    fn promise_echoes_ballot_and_keeps_carried_provenance() {
        let promised = SequenceNumber::new(4, id(3));
        let entry = Commit::new(2u64, "bar", id(7));
        let m = Message::promise(promised, Some(entry.clone()), id(1));
        assert_eq!(m.sequence_number(), promised);
        assert_eq!(m.sender(), id(1));
        match m {
            Message::Promise(p) => {
                let c = p.last_committed.unwrap();
                assert_eq!(c.sequence_number, SequenceNumber::new(2, id(7)));
                assert_eq!(c, entry);
            },
            _ => panic!("expected promise")
        }
    }

    #[test]
    fn message_type_names() {
        let m: Message<u8> = Message::prepare(1u64, id(1));
        assert_eq!(m.message_type(), MessageType::Prepare);
        assert_eq!(m.message_type().to_string(), "prepare");
        assert_eq!(MessageType::Promise.as_str(), "promise");
        assert_eq!(MessageType::Commit.to_string(), "commit");
    }
}
