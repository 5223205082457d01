use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Cost, RouterId, SimError};

/// Undirected weighted topology. Every link is stored in both directions with the same cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: BTreeMap<RouterId, BTreeMap<RouterId, Cost>>,
}

/// A single undirected link, as enumerated by [`Graph::links`] with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub a: RouterId,
    pub b: RouterId,
    pub cost: Cost,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
        }
    }

    /// Builds a graph from a router set and a list of links.
    pub fn from_links(
        routers: impl IntoIterator<Item = RouterId>,
        links: impl IntoIterator<Item = Link>,
    ) -> crate::Result<Self> {
        let mut graph = Self::new();
        for router in routers {
            graph.add_router(router)?;
        }
        for link in links {
            graph.add_link(link.a, link.b, link.cost)?;
        }
        Ok(graph)
    }

    pub fn add_router(&mut self, router: RouterId) -> crate::Result<()> {
        if self.adjacency.contains_key(&router) {
            return Err(SimError::DuplicateRouter(router));
        }
        self.adjacency.insert(router, BTreeMap::new());
        Ok(())
    }

    /// Inserts (or replaces) the link `a <-> b`. Both endpoints must already exist.
    pub fn add_link(&mut self, a: RouterId, b: RouterId, cost: Cost) -> crate::Result<()> {
        if a == b {
            return Err(SimError::SelfLoop(a));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(SimError::InvalidCost { a, b, cost });
        }
        for r in [a, b] {
            if !self.adjacency.contains_key(&r) {
                return Err(SimError::UnknownRouter(r));
            }
        }

        self.adjacency.entry(a).or_default().insert(b, cost);
        self.adjacency.entry(b).or_default().insert(a, cost);
        Ok(())
    }

    pub fn contains(&self, router: RouterId) -> bool {
        self.adjacency.contains_key(&router)
    }

    /// All routers in ascending order.
    pub fn routers(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn router_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Neighbours of `router` and the cost of the link towards each, in ascending order.
    /// Unknown routers have no neighbours.
    pub fn neighbors(&self, router: RouterId) -> impl Iterator<Item = (RouterId, Cost)> + '_ {
        self.adjacency
            .get(&router)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&id, &cost)| (id, cost)))
    }

    pub fn degree(&self, router: RouterId) -> usize {
        self.adjacency.get(&router).map_or(0, BTreeMap::len)
    }

    pub fn cost(&self, a: RouterId, b: RouterId) -> Option<Cost> {
        self.adjacency.get(&a).and_then(|n| n.get(&b)).copied()
    }

    pub fn is_adjacent(&self, a: RouterId, b: RouterId) -> bool {
        self.cost(a, b).is_some()
    }

    pub fn links(&self) -> Vec<Link> {
        self.adjacency
            .iter()
            .flat_map(|(&a, n)| {
                n.iter()
                    .filter(move |(b, _)| a < **b)
                    .map(move |(&b, &cost)| Link { a, b, cost })
            })
            .collect()
    }

    /// Routers reachable from `source`, including itself.
    pub fn component_of(&self, source: RouterId) -> BTreeSet<RouterId> {
        let mut seen = BTreeSet::new();
        if !self.contains(source) {
            return seen;
        }
        let mut queue = VecDeque::from([source]);
        seen.insert(source);
        while let Some(current) = queue.pop_front() {
            for (neighbor, _) in self.neighbors(current) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }

    pub fn is_connected(&self) -> bool {
        match self.routers().next() {
            Some(first) => self.component_of(first).len() == self.router_count(),
            None => true,
        }
    }

    /// Largest hop count of any shortest (unweighted) path between two connected routers.
    pub fn hop_diameter(&self) -> usize {
        let mut diameter = 0;
        for source in self.routers() {
            let mut depth = BTreeMap::from([(source, 0usize)]);
            let mut queue = VecDeque::from([source]);
            while let Some(current) = queue.pop_front() {
                let d = depth[&current];
                diameter = diameter.max(d);
                for (neighbor, _) in self.neighbors(current) {
                    if !depth.contains_key(&neighbor) {
                        depth.insert(neighbor, d + 1);
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        diameter
    }

    /// Total cost of walking `path` hop by hop, or `None` if two consecutive routers are not linked.
    pub fn path_cost(&self, path: &[RouterId]) -> Option<Cost> {
        path.windows(2)
            .map(|hop| self.cost(hop[0], hop[1]))
            .sum()
    }
}
