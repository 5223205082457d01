//! Link-State simulation: synchronous flooding of router advertisements, followed by per-router
//! Dijkstra to derive forwarding tables.

use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

use super::routing_table::ForwardingTable;
use crate::RouterId;
use crate::algorithms::shortest_paths;
use crate::network::Graph;
use crate::types::{ConvergenceState, SimulationReport};

/// Router identities known at each router.
pub type LinkStateDb = BTreeMap<RouterId, BTreeSet<RouterId>>;

#[derive(Debug, Clone)]
pub struct FloodingResult {
    /// Advertisements sent, one per identity per neighbour.
    pub messages: u64,
    pub rounds: u32,
    pub state: ConvergenceState,
    pub lsdb: LinkStateDb,
}

impl FloodingResult {
    pub fn is_stalled(&self) -> bool {
        self.state == ConvergenceState::Stalled
    }
}

pub struct LinkStateEngine<'a> {
    graph: &'a Graph,
    lsdb: LinkStateDb,
    inbox: BTreeMap<RouterId, BTreeSet<RouterId>>,
    messages: u64,
    rounds: u32,
}

impl<'a> LinkStateEngine<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let lsdb: LinkStateDb = graph
            .routers()
            .map(|r| (r, BTreeSet::from([r])))
            .collect();
        let inbox = lsdb.clone();
        Self {
            graph,
            lsdb,
            inbox,
            messages: 0,
            rounds: 0,
        }
    }

    fn is_complete(&self) -> bool {
        let total = self.graph.router_count();
        self.lsdb.values().all(|known| known.len() == total)
    }

    /// Floods every router's inbox to its neighbours once. Returns the identities each router
    /// learned during the round, which form its inbox for the next one.
    fn flood_round(&mut self) -> BTreeMap<RouterId, BTreeSet<RouterId>> {
        let graph = self.graph;
        let mut next_inbox: BTreeMap<RouterId, BTreeSet<RouterId>> =
            graph.routers().map(|r| (r, BTreeSet::new())).collect();
        self.rounds += 1;

        for (&router, advertisements) in &self.inbox {
            self.messages += (advertisements.len() * graph.degree(router)) as u64;
            for &lsa in advertisements {
                for (neighbor, _) in graph.neighbors(router) {
                    let Some(known) = self.lsdb.get_mut(&neighbor) else {
                        continue;
                    };
                    if known.insert(lsa) {
                        next_inbox.entry(neighbor).or_default().insert(lsa);
                    }
                }
            }
        }

        next_inbox
    }

    pub fn run(mut self) -> FloodingResult {
        let state = loop {
            let next_inbox = self.flood_round();
            let learned: usize = next_inbox.values().map(BTreeSet::len).sum();
            debug!(
                "LS round {}: {} new advertisements, {} messages so far",
                self.rounds, learned, self.messages
            );

            if self.is_complete() {
                break ConvergenceState::Converged;
            }
            if learned == 0 {
                warn!(
                    "Network is disconnected; flooding stalled after {} rounds",
                    self.rounds
                );
                break ConvergenceState::Stalled;
            }
            self.inbox = next_inbox;
        };

        info!(
            "Link-State flooding finished after {} rounds with {} messages ({:?})",
            self.rounds, self.messages, state
        );

        FloodingResult {
            messages: self.messages,
            rounds: self.rounds,
            state,
            lsdb: self.lsdb,
        }
    }
}

pub fn simulate_link_state(graph: &Graph) -> FloodingResult {
    LinkStateEngine::new(graph).run()
}

/// Runs Dijkstra from every router and keeps the first hop towards each reachable destination.
/// Unreachable destinations get no entry; this is also how a stalled flooding shows up here.
pub fn build_forwarding_tables(graph: &Graph) -> ForwardingTable {
    let tables = graph
        .routers()
        .map(|source| {
            let paths = shortest_paths(graph, source);
            let table = graph
                .routers()
                .filter(|&dest| dest != source)
                .filter_map(|dest| paths.first_hop(dest).map(|hop| (dest, hop)))
                .collect();
            (source, table)
        })
        .collect();
    ForwardingTable { tables }
}

#[derive(Debug, Clone)]
pub struct LinkStateResult {
    pub flooding: FloodingResult,
    pub forwarding: ForwardingTable,
}

impl LinkStateResult {
    pub fn report(&self, graph: &Graph) -> SimulationReport {
        SimulationReport {
            protocol: "link-state".to_string(),
            routers: graph.router_count(),
            links: graph.link_count(),
            messages: self.flooding.messages,
            rounds: self.flooding.rounds,
            state: self.flooding.state,
            routes_per_router: graph
                .routers()
                .map(|r| (r, self.forwarding.routes(r)))
                .collect(),
        }
    }
}

/// Flooding followed by forwarding-table construction. Tables are built even if flooding stalled.
pub fn run_link_state(graph: &Graph) -> LinkStateResult {
    let flooding = simulate_link_state(graph);
    let forwarding = build_forwarding_tables(graph);
    LinkStateResult {
        flooding,
        forwarding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Link;
    use crate::protocol::routing_table::{NextHopLookup, resolve_path};

    fn link(a: RouterId, b: RouterId) -> Link {
        Link { a, b, cost: 1.0 }
    }

    #[test]
    fn line_floods_in_diameter_rounds() {
        let g = Graph::from_links(0..4, [link(0, 1), link(1, 2), link(2, 3)]).unwrap();
        let res = simulate_link_state(&g);
        assert_eq!(res.state, ConvergenceState::Converged);
        assert_eq!(res.rounds, 3);
        // every router advertises its own id, then the inner routers forward two ids each
        assert_eq!(res.messages, 6 + 10 + 6);
        assert!(res.lsdb.values().all(|known| known.len() == 4));
    }

    #[test]
    fn two_clusters_stall() {
        let g = Graph::from_links(0..4, [link(0, 1), link(2, 3)]).unwrap();
        let res = simulate_link_state(&g);
        assert!(res.is_stalled());
        assert_eq!(res.rounds, 2);
        assert_eq!(res.lsdb[&0], BTreeSet::from([0, 1]));
        assert_eq!(res.lsdb[&3], BTreeSet::from([2, 3]));
    }

    #[test]
    fn single_router_converges_immediately() {
        let mut g = Graph::new();
        g.add_router(5).unwrap();
        let res = simulate_link_state(&g);
        assert_eq!(res.state, ConvergenceState::Converged);
        assert_eq!(res.rounds, 1);
        assert_eq!(res.messages, 0);
    }

    #[test]
    fn forwarding_tables_skip_unreachable_destinations() {
        let g = Graph::from_links(0..4, [link(0, 1), link(1, 2)]).unwrap();
        let res = run_link_state(&g);
        assert!(res.flooding.is_stalled());
        let fwd = &res.forwarding;
        assert_eq!(fwd.next_hop(0, 2), Some(1));
        assert_eq!(fwd.next_hop(0, 3), None);
        assert_eq!(fwd.table(0).map(|t| t.len()), Some(2));
        assert_eq!(fwd.routes(3), 0);
        assert_eq!(resolve_path(fwd, 0, 2), Some(vec![0, 1, 2]));
        assert_eq!(resolve_path(fwd, 0, 3), None);
        assert_eq!(res.report(&g).state, ConvergenceState::Stalled);
    }
}
