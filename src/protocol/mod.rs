pub mod distance_vector;
pub mod link_state;
pub mod routing_table;

pub use distance_vector::{DistanceVectorEngine, DistanceVectorResult, simulate_distance_vector};
pub use link_state::{
    FloodingResult, LinkStateDb, LinkStateEngine, LinkStateResult, build_forwarding_tables,
    run_link_state, simulate_link_state,
};
pub use routing_table::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::network::Graph;
use crate::types::SimulationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    DistanceVector,
    LinkState,
    #[default]
    Both,
}

impl Protocol {
    pub fn runs_distance_vector(self) -> bool {
        matches!(self, Protocol::DistanceVector | Protocol::Both)
    }

    pub fn runs_link_state(self) -> bool {
        matches!(self, Protocol::LinkState | Protocol::Both)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::DistanceVector => write!(f, "distance-vector"),
            Protocol::LinkState => write!(f, "link-state"),
            Protocol::Both => write!(f, "both"),
        }
    }
}

/// Everything one simulation run produced. The two engines never interact; each one that was
/// selected ran independently over the same graph.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub graph: Graph,
    pub distance_vector: Option<DistanceVectorResult>,
    pub link_state: Option<LinkStateResult>,
}

impl SimulationOutcome {
    pub fn reports(&self) -> Vec<SimulationReport> {
        let mut reports = Vec::new();
        if let Some(dv) = &self.distance_vector {
            reports.push(dv.report(&self.graph));
        }
        if let Some(ls) = &self.link_state {
            reports.push(ls.report(&self.graph));
        }
        reports
    }
}

pub fn simulate(graph: Graph, protocol: Protocol) -> SimulationOutcome {
    let distance_vector = protocol
        .runs_distance_vector()
        .then(|| simulate_distance_vector(&graph));
    let link_state = protocol.runs_link_state().then(|| run_link_state(&graph));

    SimulationOutcome {
        graph,
        distance_vector,
        link_state,
    }
}
