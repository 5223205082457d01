use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use crate::network::{Graph, build_topology, builder::validate_drop_fraction};
use crate::protocol::{Protocol, SimulationOutcome, simulate};
use crate::types::{Coordinate, validate_nodes};
use crate::{RouterId, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fraction of the complete graph's links removed at random, in `[0, 1)`.
    pub drop_fraction: f64,
    /// Seed for link sampling. Without one, every run samples a fresh topology.
    pub seed: Option<u64>,
    pub protocol: Protocol,
    /// Extra router appended after all others, with the next free id.
    pub local_router: Option<Coordinate>,
    pub nodes: BTreeMap<RouterId, Coordinate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            drop_fraction: 0.3,
            seed: None,
            protocol: Protocol::Both,
            local_router: None,
            nodes: BTreeMap::new(),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("malformed config {path}"))
    }

    /// Writes the configuration as pretty JSON, e.g. to pin the seed and overrides of a run.
    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("cannot write config {path}"))
    }

    pub fn validate(&self) -> crate::Result<()> {
        validate_drop_fraction(self.drop_fraction)?;
        validate_nodes(&self.nodes)?;
        if let Some(local) = self.local_router {
            if !local.is_valid() {
                return Err(SimError::Config(format!(
                    "local router has an invalid coordinate {local}"
                )));
            }
            if self.nodes.keys().next_back() == Some(&RouterId::MAX) {
                return Err(SimError::Config(
                    "no router id left for the local router".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Id the local router receives, if one is configured.
    pub fn local_router_id(&self) -> Option<RouterId> {
        self.local_router?;
        Some(self.nodes.keys().next_back().map_or(1, |last| last + 1))
    }

    /// All routers of the run, including the local one.
    pub fn node_set(&self) -> BTreeMap<RouterId, Coordinate> {
        let mut nodes = self.nodes.clone();
        if let (Some(id), Some(local)) = (self.local_router_id(), self.local_router) {
            nodes.insert(id, local);
        }
        nodes
    }

    pub fn build_graph(&self) -> crate::Result<Graph> {
        self.validate()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        build_topology(&self.node_set(), self.drop_fraction, &mut rng)
    }

    pub fn run(&self) -> crate::Result<SimulationOutcome> {
        let graph = self.build_graph()?;
        Ok(simulate(graph, self.protocol))
    }
}
