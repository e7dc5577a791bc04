use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::network::Cidr;

/// Per-router table: subnet → router hops reaching that subnet's router.
///
/// Every stored path starts with the owning router. The home subnet maps to
/// `[owner]`; a learned entry reads `[owner, neighbor, .., subnet router]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    owner: Ipv4Addr,
    home: Cidr,
    entries: BTreeMap<Cidr, Vec<Ipv4Addr>>,
}

impl RoutingTable {
    pub fn new(owner: Ipv4Addr, home: Cidr) -> Self {
        let mut table = Self {
            owner,
            home,
            entries: BTreeMap::new(),
        };
        table.reset();
        table
    }

    /// Drops every learned route, keeping only the home subnet.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.insert(self.home, vec![self.owner]);
    }

    pub fn owner(&self) -> Ipv4Addr {
        self.owner
    }

    pub fn home(&self) -> Cidr {
        self.home
    }

    pub fn get_route(&self, destination: &Cidr) -> Option<&[Ipv4Addr]> {
        self.entries.get(destination).map(Vec::as_slice)
    }

    /// First router after the owner on the way to `destination`.
    pub fn next_hop(&self, destination: &Cidr) -> Option<Ipv4Addr> {
        self.entries.get(destination).and_then(|path| path.get(1)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cidr, &[Ipv4Addr])> {
        self.entries.iter().map(|(cidr, path)| (cidr, path.as_slice()))
    }

    /// Longest-prefix match of `target` against the known subnets.
    pub fn route_for(&self, target: Ipv4Addr) -> Option<(&Cidr, &[Ipv4Addr])> {
        self.entries
            .iter()
            .filter(|(cidr, _)| cidr.contains(target))
            .max_by_key(|(cidr, _)| cidr.prefix_len())
            .map(|(cidr, path)| (cidr, path.as_slice()))
    }

    /// Offers every route of `neighbor` to this table and returns whether
    /// any entry changed.
    ///
    /// A candidate `[owner] + neighbor path` replaces the current entry when
    /// there is none, when it has fewer hops, or when it has as many hops and
    /// the neighbor's address is lower than the current first hop. The home
    /// subnet is never learned through a neighbor.
    pub fn merge_from(&mut self, neighbor: &RoutingTable) -> bool {
        let mut changed = false;

        for (destination, advertised) in &neighbor.entries {
            if *destination == self.home {
                continue;
            }

            let candidate_len = advertised.len() + 1;
            let accept = match self.entries.get(destination) {
                None => true,
                Some(current) => {
                    candidate_len < current.len()
                        || (candidate_len == current.len()
                            && current.get(1).is_some_and(|first_hop| neighbor.owner < *first_hop))
                }
            };

            if accept {
                let mut route = Vec::with_capacity(candidate_len);
                route.push(self.owner);
                route.extend_from_slice(advertised);
                debug!(
                    "Router {} accepts route to {} via {} ({} hops)",
                    self.owner,
                    destination,
                    neighbor.owner,
                    route.len()
                );
                self.entries.insert(*destination, route);
                changed = true;
            }
        }

        changed
    }
}
