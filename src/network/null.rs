use crate::network::*;

/// Records every message sent through it and delivers nothing. Used to drive nodes by hand
pub struct NullMessenger<V> {
    pub sent: Vec<Envelope<V>>
}

impl<V> NullMessenger<V> {
    pub fn new() -> NullMessenger<V> {
        NullMessenger {
            sent: Vec::new()
        }
    }

    /// Removes and returns everything sent so far
    pub fn take(&mut self) -> Vec<Envelope<V>> {
        std::mem::replace(&mut self.sent, Vec::new())
    }
}

impl<V> Default for NullMessenger<V> {
    fn default() -> NullMessenger<V> {
        NullMessenger::new()
    }
}

impl<V> Messenger<V> for NullMessenger<V> {
    fn send_message(&mut self, to: NodeId, message: Message<V>) {
        self.sent.push(Envelope { to, message });
    }
}
