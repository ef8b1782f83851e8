use rand::SeedableRng;
use rand::rngs::StdRng;

use paxos_sim::network::null::NullMessenger;
use paxos_sim::{Commit, Envelope, Error, Message, NodeId, PaxosNode, Role, SequenceNumber};

struct TS {
    ids: Vec<NodeId>,
    net: NullMessenger<String>
}

impl TS {
    fn new(n: usize) -> TS {
        let mut rng = StdRng::seed_from_u64(12);
        let mut ids: Vec<NodeId> = (0..n).map(|_| NodeId::random(&mut rng)).collect();
        ids.sort();
        TS {
            ids,
            net: NullMessenger::new()
        }
    }

    fn node(&self, idx: usize) -> PaxosNode<String> {
        PaxosNode::new(self.ids[idx])
    }

    fn deliver(&mut self, node: &mut PaxosNode<String>, message: Message<String>) {
        node.receive(message, &self.ids, &mut self.net).unwrap();
    }
}

#[test]
fn escalation_outbids_the_triggering_ballot() {
    let mut ts = TS::new(3);
    let mut lowest = ts.node(0);

    lowest.write("foo".to_string(), &ts.ids, &mut ts.net);
    ts.net.take();

    // Same round but a higher identity still outranks the local ballot
    let trigger = SequenceNumber::new(1, ts.ids[2]);
    assert!(trigger > lowest.highest_seen());
    ts.deliver(&mut lowest, Message::prepare(trigger, ts.ids[2]));

    assert_eq!(lowest.role(), Role::Proposer);
    assert!(lowest.highest_seen().round > trigger.round);
    assert_eq!(lowest.highest_seen().proposer, ts.ids[0]);

    let sent = ts.net.take();
    assert_eq!(sent.len(), 2);
    for e in sent {
        assert_eq!(e.message.sequence_number(), lowest.highest_seen());
        assert!(e.message.sequence_number() > trigger);
    }
}

#[test]
fn escalation_from_far_ahead() {
    let mut ts = TS::new(5);
    let mut n = ts.node(1);

    n.write("foo".to_string(), &ts.ids, &mut ts.net);
    ts.net.take();

    let trigger = SequenceNumber::new(41, ts.ids[4]);
    ts.deliver(&mut n, Message::prepare(trigger, ts.ids[4]));

    assert_eq!(n.highest_seen(), SequenceNumber::new(42, ts.ids[1]));
    assert_eq!(ts.net.take().len(), 4);
}

#[test]
fn full_round_by_hand() {
    let mut ts = TS::new(3);
    let mut proposer = ts.node(0);
    let mut a = ts.node(1);
    let mut b = ts.node(2);

    proposer.write("bar".to_string(), &ts.ids, &mut ts.net);

    let prepares = ts.net.take();
    assert_eq!(prepares.len(), 2);
    ts.deliver(&mut a, prepares[0].message.clone());
    ts.deliver(&mut b, prepares[1].message.clone());

    let promises = ts.net.take();
    assert!(promises.iter().all(|e| e.to == ts.ids[0]));
    for e in promises {
        ts.deliver(&mut proposer, e.message);
    }
    assert_eq!(proposer.role(), Role::Acceptor);

    let commits = ts.net.take();
    assert_eq!(commits.len(), 2);
    ts.deliver(&mut a, commits[0].message.clone());
    ts.deliver(&mut b, commits[1].message.clone());

    let decided = Commit::new(1u64, "bar".to_string(), ts.ids[0]);
    for n in [&proposer, &a, &b].iter() {
        assert_eq!(n.read(), &[decided.clone()][..]);
        assert_eq!(n.highest_seen(), decided.sequence_number);
    }
}

#[test]
fn stale_commit_does_not_touch_the_log() {
    let mut ts = TS::new(3);
    let mut n = ts.node(1);

    ts.deliver(&mut n, Message::prepare(4u64, ts.ids[2]));
    ts.net.take();

    ts.deliver(&mut n, Message::commit(3u64, "late".to_string(), ts.ids[0]));
    assert!(n.read().is_empty());
    assert_eq!(n.highest_seen(), SequenceNumber::new(4, ts.ids[2]));

    ts.deliver(&mut n, Message::commit(4u64, "current".to_string(), ts.ids[2]));
    assert_eq!(n.read().len(), 1);
    assert_eq!(n.read()[0].value, "current");
    assert!(ts.net.sent.is_empty());
}

#[test]
fn promise_reply_names_the_prepared_ballot() {
    let mut ts = TS::new(3);
    let mut n = ts.node(2);

    let ballot = SequenceNumber::new(3, ts.ids[0]);
    ts.deliver(&mut n, Message::prepare(ballot, ts.ids[0]));

    assert_eq!(ts.net.take(), vec![Envelope {
        to: ts.ids[0],
        message: Message::promise(ballot, None, ts.ids[2])
    }]);
}

#[test]
fn messages_from_outside_the_cluster_are_fatal() {
    let mut ts = TS::new(3);
    let mut n = ts.node(0);
    let outsider = NodeId::random(&mut StdRng::seed_from_u64(999));

    let r = n.receive(Message::commit(1u64, "x".to_string(), outsider), &ts.ids, &mut ts.net);
    match r {
        Err(Error::InvalidMessage(_)) => (),
        other => panic!("unexpected {:?}", other)
    }
    assert!(n.read().is_empty());
}
