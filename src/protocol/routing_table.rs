use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Cost, RouterId, SimError, UNREACHABLE};

/// Read access to next-hop state, shared by the Distance-Vector next-hop table and the
/// Link-State forwarding table.
pub trait NextHopLookup {
    fn has_router(&self, router: RouterId) -> bool;

    /// Next hop used by `router` towards `dest`, if any.
    fn next_hop(&self, router: RouterId, dest: RouterId) -> Option<RouterId>;

    /// Forwarding entries of `router`, excluding itself, in ascending destination order.
    fn entries(&self, router: RouterId) -> Vec<(RouterId, Option<RouterId>)>;
}

/// Per-router minimal known costs, as computed by Distance-Vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    #[serde(with = "unreachable_as_null")]
    pub(crate) costs: BTreeMap<RouterId, BTreeMap<RouterId, Cost>>,
}

impl DistanceTable {
    /// Cost known at `router` for `dest`. Absent entries are unreachable.
    pub fn get(&self, router: RouterId, dest: RouterId) -> Cost {
        self.costs
            .get(&router)
            .and_then(|row| row.get(&dest))
            .copied()
            .unwrap_or(UNREACHABLE)
    }

    pub fn row(&self, router: RouterId) -> Option<&BTreeMap<RouterId, Cost>> {
        self.costs.get(&router)
    }
}

/// JSON has no infinity, so unreachable costs are written as `null` and read back as
/// [`UNREACHABLE`].
mod unreachable_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::{Cost, RouterId, UNREACHABLE};

    type Costs = BTreeMap<RouterId, BTreeMap<RouterId, Cost>>;
    type EncodedCosts = BTreeMap<RouterId, BTreeMap<RouterId, Option<Cost>>>;

    pub fn serialize<S: Serializer>(costs: &Costs, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: EncodedCosts = costs
            .iter()
            .map(|(&router, row)| {
                let row = row
                    .iter()
                    .map(|(&dest, &cost)| (dest, cost.is_finite().then_some(cost)))
                    .collect();
                (router, row)
            })
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Costs, D::Error> {
        let encoded = EncodedCosts::deserialize(deserializer)?;
        Ok(encoded
            .into_iter()
            .map(|(router, row)| {
                let row = row
                    .into_iter()
                    .map(|(dest, cost)| (dest, cost.unwrap_or(UNREACHABLE)))
                    .collect();
                (router, row)
            })
            .collect())
    }
}

/// Distance-Vector next hops. Every destination has an entry; `None` means no route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextHopTable {
    pub(crate) hops: BTreeMap<RouterId, BTreeMap<RouterId, Option<RouterId>>>,
}

impl NextHopTable {
    pub fn routes(&self, router: RouterId) -> usize {
        self.hops
            .get(&router)
            .map_or(0, |row| row.values().filter(|h| h.is_some()).count())
    }
}

impl NextHopLookup for NextHopTable {
    fn has_router(&self, router: RouterId) -> bool {
        self.hops.contains_key(&router)
    }

    fn next_hop(&self, router: RouterId, dest: RouterId) -> Option<RouterId> {
        self.hops.get(&router).and_then(|row| row.get(&dest)).copied().flatten()
    }

    fn entries(&self, router: RouterId) -> Vec<(RouterId, Option<RouterId>)> {
        self.hops
            .get(&router)
            .map(|row| {
                row.iter()
                    .filter(|(dest, _)| **dest != router)
                    .map(|(&dest, &hop)| (dest, hop))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Link-State forwarding table: destination to first hop, only for reachable destinations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardingTable {
    pub(crate) tables: BTreeMap<RouterId, BTreeMap<RouterId, RouterId>>,
}

impl ForwardingTable {
    pub fn routes(&self, router: RouterId) -> usize {
        self.tables.get(&router).map_or(0, BTreeMap::len)
    }

    pub fn table(&self, router: RouterId) -> Option<&BTreeMap<RouterId, RouterId>> {
        self.tables.get(&router)
    }
}

impl NextHopLookup for ForwardingTable {
    fn has_router(&self, router: RouterId) -> bool {
        self.tables.contains_key(&router)
    }

    fn next_hop(&self, router: RouterId, dest: RouterId) -> Option<RouterId> {
        self.tables.get(&router).and_then(|t| t.get(&dest)).copied()
    }

    fn entries(&self, router: RouterId) -> Vec<(RouterId, Option<RouterId>)> {
        self.tables
            .get(&router)
            .map(|t| t.iter().map(|(&dest, &hop)| (dest, Some(hop))).collect())
            .unwrap_or_default()
    }
}

/// Forwarding table of a single router, skipping its own entry.
pub fn get_forwarding_table<T: NextHopLookup>(
    table: &T,
    router: RouterId,
) -> crate::Result<Vec<(RouterId, Option<RouterId>)>> {
    if !table.has_router(router) {
        return Err(SimError::UnknownRouter(router));
    }
    Ok(table.entries(router))
}

/// Follows next hops from `src` until `dst` is reached. Returns `None` as soon as a router has no
/// next hop towards `dst`. The table must be loop-free, which holds once its engine converged.
pub fn resolve_path<T: NextHopLookup>(table: &T, src: RouterId, dst: RouterId) -> Option<Vec<RouterId>> {
    let mut path = vec![src];
    let mut current = src;
    while current != dst {
        current = table.next_hop(current, dst)?;
        path.push(current);
    }
    Some(path)
}

/// Like [`resolve_path`], but rejects routers the table does not know about.
pub fn get_route<T: NextHopLookup>(
    table: &T,
    src: RouterId,
    dst: RouterId,
) -> crate::Result<Option<Vec<RouterId>>> {
    for router in [src, dst] {
        if !table.has_router(router) {
            return Err(SimError::UnknownRouter(router));
        }
    }
    Ok(resolve_path(table, src, dst))
}
