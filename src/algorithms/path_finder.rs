use log::{debug, warn};
use std::net::Ipv4Addr;

use super::dijkstra::{ShortestPath, shortest_path_in_subnet};
use crate::network::{System, Topology};
use crate::protocol::RoutePropagator;

/// End-to-end path computation over a topology and its converged routing
/// tables.
///
/// Inside a subnet the weighted shortest path is used directly. Across
/// subnets the path is stitched from three pieces: source to its subnet's
/// router, the router hops stored in that router's table, and the
/// destination subnet's router to the destination.
pub struct PathFinder<'a> {
    topology: &'a Topology,
    routes: &'a RoutePropagator,
}

impl<'a> PathFinder<'a> {
    pub fn new(topology: &'a Topology, routes: &'a RoutePropagator) -> Self {
        Self { topology, routes }
    }

    /// Full hop sequence from `source` to `destination`, both included.
    /// Empty when either address is unknown or no path exists.
    pub fn find_shortest_path(&self, source: Ipv4Addr, destination: Ipv4Addr) -> Vec<Ipv4Addr> {
        let (Some(from), Some(to)) = (
            self.topology.system_by_address(source),
            self.topology.system_by_address(destination),
        ) else {
            debug!("Path query {} -> {} names an unknown system", source, destination);
            return Vec::new();
        };

        let path = if from.subnet == to.subnet {
            self.path_in_subnet(from, to.address).map(|found| found.path)
        } else {
            self.path_across_subnets(from, to)
        };

        path.unwrap_or_default()
    }

    fn path_in_subnet(&self, from: &System, to: Ipv4Addr) -> Option<ShortestPath> {
        let subnet = self.topology.subnet_by_cidr(&from.subnet)?;
        shortest_path_in_subnet(self.topology, subnet, from.address, to)
    }

    fn path_across_subnets(&self, from: &System, to: &System) -> Option<Vec<Ipv4Addr>> {
        if !self.routes.is_converged() {
            warn!("Routing tables are stale, refusing inter-subnet path {} -> {}", from, to);
            return None;
        }

        let Some(source_router) = self.topology.subnet_by_cidr(&from.subnet)?.router() else {
            debug!("Subnet {} has no router", from.subnet);
            return None;
        };
        let destination_subnet = self.topology.subnet_by_cidr(&to.subnet)?;
        let Some(destination_router) = destination_subnet.router() else {
            debug!("Subnet {} has no router", to.subnet);
            return None;
        };

        let mut path = self.path_in_subnet(from, source_router)?.path;

        let Some(hops) = self
            .routes
            .table(source_router)
            .and_then(|table| table.get_route(&to.subnet))
        else {
            debug!("Router {} has no route to {}", source_router, to.subnet);
            return None;
        };
        if hops.last() != Some(&destination_router) {
            warn!(
                "Route from {} to {} does not end at its router {}",
                source_router, to.subnet, destination_router
            );
            return None;
        }
        path.extend(hops.iter().skip(1).copied());

        let router = self.topology.system_by_address(destination_router)?;
        let tail = self.path_in_subnet(router, to.address)?;
        // the router is already the last hop of `path`
        path.extend(tail.path.into_iter().skip(1));

        Some(path)
    }
}
