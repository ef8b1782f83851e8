extern crate uuid;

use std::error;
use std::fmt;
use std::io;

pub mod cluster;
pub mod config;
pub mod network;
pub mod paxos;

pub use cluster::Cluster;
pub use config::SimulationConfig;
pub use network::{Envelope, Messenger};
pub use network::unreliable::{Network, NetworkStats};
pub use paxos::{quorum_size, NodeId, Round, SequenceNumber};
pub use paxos::message::{Commit, Message, MessageType, Prepare, Promise};
pub use paxos::node::{PaxosNode, Role};

#[derive(Debug)]
pub enum Error {
    /// A message that breaks the protocol's framing rules. Always fatal
    InvalidMessage(String),

    /// A message was addressed to a node that is not registered with the cluster
    UnknownNode(NodeId),

    /// Reads and writes need at least one registered node
    EmptyCluster,

    /// The dispatcher delivered its full budget and messages are still queued
    DeliveryLimit {
        delivered: usize,
        pending: usize
    },

    Config(String),
    Io(io::Error),
    Toml(toml::de::Error)
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMessage(reason) => write!(f, "Invalid message: {}", reason),
            Error::UnknownNode(id) => write!(f, "No registered node {}", id),
            Error::EmptyCluster => write!(f, "Cluster has no registered nodes"),
            Error::DeliveryLimit{delivered, pending} => write!(f,
                "Delivery limit reached after {} messages with {} still queued", delivered, pending),
            Error::Config(reason) => write!(f, "Invalid configuration: {}", reason),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Toml(e) => write!(f, "TOML error: {}", e)
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Toml(e) => Some(e),
            _ => None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Error {
        Error::Toml(e)
    }
}
