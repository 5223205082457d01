use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{RouterId, SimError};

/// Geographic position of a router, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Checks that every coordinate handed to the simulator is well-formed.
pub fn validate_nodes(nodes: &BTreeMap<RouterId, Coordinate>) -> crate::Result<()> {
    for (&router, coord) in nodes {
        if !coord.is_valid() {
            return Err(SimError::InvalidCoordinate {
                router,
                lat: coord.lat,
                lon: coord.lon,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergenceState {
    /// No further exchange changes any table.
    Converged,
    /// Flooding ran out of new advertisements before every router learned the full topology.
    Stalled,
}

/// Summary of one engine run, in a shape suitable for printing or JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub protocol: String,
    pub routers: usize,
    pub links: usize,
    pub messages: u64,
    pub rounds: u32,
    pub state: ConvergenceState,
    /// Number of non-self routing entries held by each router after the run.
    pub routes_per_router: BTreeMap<RouterId, usize>,
}

impl SimulationReport {
    pub fn reachable_pairs(&self) -> usize {
        self.routes_per_router.values().sum()
    }
}
