use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::network::Graph;
use crate::{Cost, RouterId, UNREACHABLE};

/// Single-source shortest paths: tentative costs and predecessors for every router of the graph.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    pub source: RouterId,
    pub dist: BTreeMap<RouterId, Cost>,
    pub previous: BTreeMap<RouterId, Option<RouterId>>,
}

#[derive(Debug, PartialEq, Eq)]
struct State {
    cost: OrderedFloat<Cost>,
    router: RouterId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal costs pop the lower router id first
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.router.cmp(&self.router))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn shortest_paths(graph: &Graph, source: RouterId) -> ShortestPaths {
    let mut dist: BTreeMap<RouterId, Cost> = graph.routers().map(|r| (r, UNREACHABLE)).collect();
    let mut previous: BTreeMap<RouterId, Option<RouterId>> =
        graph.routers().map(|r| (r, None)).collect();
    let mut heap = BinaryHeap::new();

    if graph.contains(source) {
        dist.insert(source, 0.0);
        heap.push(State {
            cost: OrderedFloat(0.0),
            router: source,
        });
    }

    while let Some(State { cost, router }) = heap.pop() {
        let cost = cost.into_inner();
        // Skip if we've already found a better path
        if cost > dist[&router] {
            continue;
        }

        for (neighbor, link_cost) in graph.neighbors(router) {
            let alt = cost + link_cost;
            if alt < dist[&neighbor] {
                dist.insert(neighbor, alt);
                previous.insert(neighbor, Some(router));
                heap.push(State {
                    cost: OrderedFloat(alt),
                    router: neighbor,
                });
            }
        }
    }

    ShortestPaths {
        source,
        dist,
        previous,
    }
}

impl ShortestPaths {
    pub fn cost_to(&self, dest: RouterId) -> Cost {
        self.dist.get(&dest).copied().unwrap_or(UNREACHABLE)
    }

    /// Neighbour of the source on the shortest path towards `dest`, found by walking predecessors
    /// back from `dest`. `None` for the source itself and for unreachable destinations.
    pub fn first_hop(&self, dest: RouterId) -> Option<RouterId> {
        if dest == self.source {
            return None;
        }

        let mut current = dest;
        loop {
            match self.previous.get(&current).copied().flatten() {
                Some(prev) if prev == self.source => return Some(current),
                Some(prev) => current = prev,
                None => return None,
            }
        }
    }

    /// Full path from the source to `dest`, or `None` if `dest` is unreachable.
    pub fn path_to(&self, dest: RouterId) -> Option<Vec<RouterId>> {
        if self.cost_to(dest) == UNREACHABLE {
            return None;
        }

        let mut path = vec![dest];
        let mut current = dest;
        while let Some(Some(prev)) = self.previous.get(&current) {
            path.push(*prev);
            current = *prev;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Link;

    fn diamond() -> Graph {
        // 0 - 1 - 3 and 0 - 2 - 3 at equal cost, plus an expensive direct link
        Graph::from_links(
            0..4,
            [
                Link { a: 0, b: 1, cost: 1.0 },
                Link { a: 0, b: 2, cost: 1.0 },
                Link { a: 1, b: 3, cost: 1.0 },
                Link { a: 2, b: 3, cost: 1.0 },
                Link { a: 0, b: 3, cost: 5.0 },
            ],
        )
        .unwrap()
    }

    #[test]
    fn computes_costs_and_first_hops() {
        let sp = shortest_paths(&diamond(), 0);
        assert_eq!(sp.cost_to(0), 0.0);
        assert_eq!(sp.cost_to(3), 2.0);
        assert_eq!(sp.first_hop(0), None);
        assert_eq!(sp.first_hop(1), Some(1));
        // equal-cost tie goes through the lower router id
        assert_eq!(sp.first_hop(3), Some(1));
        assert_eq!(sp.path_to(3), Some(vec![0, 1, 3]));
    }

    #[test]
    fn unreachable_destinations() {
        let mut g = diamond();
        g.add_router(9).unwrap();
        let sp = shortest_paths(&g, 0);
        assert_eq!(sp.cost_to(9), UNREACHABLE);
        assert_eq!(sp.first_hop(9), None);
        assert_eq!(sp.path_to(9), None);

        let isolated = shortest_paths(&g, 9);
        assert_eq!(isolated.cost_to(9), 0.0);
        assert_eq!(isolated.path_to(9), Some(vec![9]));
        assert_eq!(isolated.first_hop(0), None);
    }
}
