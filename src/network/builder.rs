//! Builds a sparsified geographic topology from a set of router coordinates.

use log::debug;
use rand::Rng;
use std::collections::BTreeMap;

use super::geo::haversine;
use super::topology::{Graph, Link};
use crate::types::{Coordinate, validate_nodes};
use crate::{RouterId, SimError};

pub fn validate_drop_fraction(drop_fraction: f64) -> crate::Result<()> {
    if drop_fraction.is_finite() && (0.0..1.0).contains(&drop_fraction) {
        Ok(())
    } else {
        Err(SimError::InvalidDropFraction(drop_fraction))
    }
}

/// Every unordered pair of distinct routers, weighted by great-circle distance.
pub fn complete_links(nodes: &BTreeMap<RouterId, Coordinate>) -> Vec<Link> {
    let mut links = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
    for (i, (&a, &pos_a)) in nodes.iter().enumerate() {
        for (&b, &pos_b) in nodes.iter().skip(i + 1) {
            links.push(Link {
                a,
                b,
                cost: haversine(pos_a, pos_b),
            });
        }
    }
    links
}

/// Number of links kept out of `total` when dropping `drop_fraction` of them.
pub fn links_to_keep(total: usize, drop_fraction: f64) -> usize {
    (total as f64 * (1.0 - drop_fraction)).floor() as usize
}

/// Builds the complete graph over `nodes` and keeps a uniform random sample of
/// `floor(total * (1 - drop_fraction))` links. The result may be disconnected.
pub fn build_topology<R: Rng + ?Sized>(
    nodes: &BTreeMap<RouterId, Coordinate>,
    drop_fraction: f64,
    rng: &mut R,
) -> crate::Result<Graph> {
    validate_drop_fraction(drop_fraction)?;
    validate_nodes(nodes)?;

    let all_links = complete_links(nodes);
    let keep = links_to_keep(all_links.len(), drop_fraction);

    let mut kept: Vec<Link> = rand::seq::index::sample(rng, all_links.len(), keep)
        .into_iter()
        .map(|i| all_links[i])
        .collect();
    kept.sort_by_key(|l| (l.a, l.b));

    debug!(
        "Topology: {} routers, keeping {} of {} links (drop fraction {})",
        nodes.len(),
        keep,
        all_links.len(),
        drop_fraction
    );

    Graph::from_links(nodes.keys().copied(), kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid(n: u32) -> BTreeMap<RouterId, Coordinate> {
        (0..n)
            .map(|i| (i, Coordinate::new((i / 4) as f64, (i % 4) as f64)))
            .collect()
    }

    #[test]
    fn zero_drop_keeps_complete_graph() {
        let nodes = grid(9);
        let mut rng = StdRng::seed_from_u64(1);
        let g = build_topology(&nodes, 0.0, &mut rng).unwrap();
        assert_eq!(g.router_count(), 9);
        assert_eq!(g.link_count(), 9 * 8 / 2);
        for link in g.links() {
            assert_eq!(link.cost, haversine(nodes[&link.a], nodes[&link.b]));
        }
    }

    #[test]
    fn drop_fraction_controls_link_count() {
        let nodes = grid(10);
        let total = 45;
        for f in [0.1, 0.3, 0.5, 0.9, 0.99] {
            let mut rng = StdRng::seed_from_u64(7);
            let g = build_topology(&nodes, f, &mut rng).unwrap();
            assert_eq!(g.link_count(), (total as f64 * (1.0 - f)).floor() as usize);
            assert_eq!(g.router_count(), 10);
        }
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let nodes = grid(12);
        let a = build_topology(&nodes, 0.4, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = build_topology(&nodes, 0.4, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_drop_fraction() {
        let nodes = grid(3);
        let mut rng = StdRng::seed_from_u64(0);
        for f in [-0.1, 1.0, 1.5, f64::NAN] {
            assert!(matches!(
                build_topology(&nodes, f, &mut rng),
                Err(SimError::InvalidDropFraction(_))
            ));
        }
    }

    #[test]
    fn rejects_invalid_coordinates() {
        let mut nodes = grid(3);
        nodes.insert(5, Coordinate::new(91.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            build_topology(&nodes, 0.0, &mut rng),
            Err(SimError::InvalidCoordinate {
                router: 5,
                lat: 91.0,
                lon: 0.0
            })
        );
    }

    #[test]
    fn empty_and_single_router() {
        let mut rng = StdRng::seed_from_u64(0);
        let g = build_topology(&BTreeMap::new(), 0.2, &mut rng).unwrap();
        assert_eq!(g.router_count(), 0);
        let g = build_topology(&grid(1), 0.0, &mut rng).unwrap();
        assert_eq!(g.router_count(), 1);
        assert_eq!(g.link_count(), 0);
    }
}
