//! Simulation configuration
//!
//! Read from a TOML file of the form
//!
//! ```toml
//! nodes = 5
//! drop_chance = 2      # out of 10
//! reorder_chance = 7   # out of 10
//! seed = 1234          # optional
//! max_deliveries = 100000
//! ```
//!
//! Every key is optional and falls back to the default.

use std::fs;
use std::path::Path;

use crate::cluster::DEFAULT_MAX_DELIVERIES;
use crate::{Error, Result};

/// Largest cluster a configuration may ask for
pub const MAX_NODES: usize = 1024;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimulationConfig {
    /// Number of nodes in the cluster
    pub nodes: usize,

    /// Chance out of 10 that any given message is lost
    pub drop_chance: u8,

    /// Chance out of 10 that a send does NOT shuffle and drain the queue
    pub reorder_chance: u8,

    /// Seed for every random decision in the run. Random when absent
    pub seed: Option<u64>,

    /// Upper bound on deliveries per drain of the network
    pub max_deliveries: usize
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            nodes: 3,
            drop_chance: 0,
            reorder_chance: 0,
            seed: None,
            max_deliveries: DEFAULT_MAX_DELIVERIES
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
        let content = fs::read_to_string(path)?;
        SimulationConfig::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<SimulationConfig> {
        let value: toml::Value = s.parse()?;
        let table = match value.as_table() {
            Some(t) => t,
            None => return Err(Error::Config("top level must be a table".to_string()))
        };

        let mut config = SimulationConfig::default();

        for (key, v) in table {
            match key.as_str() {
                "nodes" => config.nodes = integer(key, v)? as usize,
                "drop_chance" => config.drop_chance = chance(key, v)?,
                "reorder_chance" => config.reorder_chance = chance(key, v)?,
                "seed" => config.seed = Some(integer(key, v)?),
                "max_deliveries" => config.max_deliveries = integer(key, v)? as usize,
                _ => return Err(Error::Config(format!("unknown key '{}'", key)))
            }
        }

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nodes == 0 {
            return Err(Error::Config("a cluster needs at least one node".to_string()));
        }
        if self.nodes > MAX_NODES {
            return Err(Error::Config(format!("{} nodes is more than the limit of {}", self.nodes, MAX_NODES)));
        }
        if self.drop_chance > 10 {
            return Err(Error::Config(format!("drop_chance {} is not out of 10", self.drop_chance)));
        }
        if self.reorder_chance > 10 {
            return Err(Error::Config(format!("reorder_chance {} is not out of 10", self.reorder_chance)));
        }
        if self.max_deliveries == 0 {
            return Err(Error::Config("max_deliveries must be positive".to_string()));
        }
        Ok(())
    }
}

fn integer(key: &str, v: &toml::Value) -> Result<u64> {
    match v.as_integer() {
        Some(i) if i >= 0 => Ok(i as u64),
        _ => Err(Error::Config(format!("'{}' must be a non-negative integer", key)))
    }
}

fn chance(key: &str, v: &toml::Value) -> Result<u8> {
    let i = integer(key, v)?;
    if i > 10 {
        return Err(Error::Config(format!("'{}' is out of 10, got {}", key, i)));
    }
    Ok(i as u8)
}
