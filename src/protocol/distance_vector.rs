//! Synchronous Distance-Vector (Bellman-Ford) simulation.
//!
//! In every round each router sends its whole distance vector to each neighbour. Vectors are
//! taken from the state at the start of the round, so the order in which routers are visited
//! only decides equal-cost ties (the first offer wins). The run ends with the first round in
//! which no table changes.

use log::{debug, info};
use std::collections::BTreeMap;

use super::routing_table::{DistanceTable, NextHopTable};
use crate::network::Graph;
use crate::types::{ConvergenceState, SimulationReport};
use crate::{Cost, RouterId, UNREACHABLE};

#[derive(Debug, Clone)]
pub struct DistanceVectorResult {
    /// Distance vectors sent, one per (router, neighbour) per round.
    pub messages: u64,
    pub rounds: u32,
    pub distances: DistanceTable,
    pub next_hops: NextHopTable,
}

pub struct DistanceVectorEngine<'a> {
    graph: &'a Graph,
    dist: BTreeMap<RouterId, BTreeMap<RouterId, Cost>>,
    next_hop: BTreeMap<RouterId, BTreeMap<RouterId, Option<RouterId>>>,
    messages: u64,
    rounds: u32,
}

impl<'a> DistanceVectorEngine<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let mut dist = BTreeMap::new();
        let mut next_hop = BTreeMap::new();

        for router in graph.routers() {
            let mut costs: BTreeMap<RouterId, Cost> =
                graph.routers().map(|d| (d, UNREACHABLE)).collect();
            let mut hops: BTreeMap<RouterId, Option<RouterId>> =
                graph.routers().map(|d| (d, None)).collect();

            costs.insert(router, 0.0);
            for (neighbor, cost) in graph.neighbors(router) {
                costs.insert(neighbor, cost);
                hops.insert(neighbor, Some(neighbor));
            }

            dist.insert(router, costs);
            next_hop.insert(router, hops);
        }

        Self {
            graph,
            dist,
            next_hop,
            messages: 0,
            rounds: 0,
        }
    }

    pub fn messages(&self) -> u64 {
        self.messages
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Runs one synchronous round and returns the number of table entries that changed.
    pub fn step(&mut self) -> usize {
        let graph = self.graph;
        let snapshot = self.dist.clone();
        let mut updates = 0;
        self.rounds += 1;

        for (&sender, vector) in &snapshot {
            for (receiver, link_cost) in graph.neighbors(sender) {
                self.messages += 1;

                // Chain through the receiver's established route towards the sender, if it has one
                let via = match self.next_hop[&receiver].get(&sender).copied().flatten() {
                    Some(hop) => hop,
                    None => sender,
                };

                let Some(receiver_costs) = self.dist.get_mut(&receiver) else {
                    continue;
                };
                let Some(receiver_hops) = self.next_hop.get_mut(&receiver) else {
                    continue;
                };

                for (&dest, &sender_cost) in vector {
                    let new_cost = link_cost + sender_cost;
                    let current = receiver_costs.get(&dest).copied().unwrap_or(UNREACHABLE);
                    if new_cost < current {
                        receiver_costs.insert(dest, new_cost);
                        receiver_hops.insert(dest, Some(via));
                        updates += 1;
                    }
                }
            }
        }

        updates
    }

    pub fn run(mut self) -> DistanceVectorResult {
        loop {
            let updates = self.step();
            debug!(
                "DV round {}: {} updates, {} messages so far",
                self.rounds, updates, self.messages
            );
            if updates == 0 {
                break;
            }
        }

        info!(
            "Distance-Vector converged after {} rounds with {} messages",
            self.rounds, self.messages
        );

        DistanceVectorResult {
            messages: self.messages,
            rounds: self.rounds,
            distances: DistanceTable { costs: self.dist },
            next_hops: NextHopTable { hops: self.next_hop },
        }
    }
}

pub fn simulate_distance_vector(graph: &Graph) -> DistanceVectorResult {
    DistanceVectorEngine::new(graph).run()
}

impl DistanceVectorResult {
    pub fn report(&self, graph: &Graph) -> SimulationReport {
        SimulationReport {
            protocol: "distance-vector".to_string(),
            routers: graph.router_count(),
            links: graph.link_count(),
            messages: self.messages,
            rounds: self.rounds,
            state: ConvergenceState::Converged,
            routes_per_router: graph
                .routers()
                .map(|r| (r, self.next_hops.routes(r)))
                .collect(),
        }
    }
}
