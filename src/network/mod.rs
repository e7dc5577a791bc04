pub mod address;
pub mod connection;
pub mod system;
pub mod topology;

pub use address::Cidr;
pub use connection::{Connection, ConnectionKey, INTER_SUBNET_COST};
pub use system::{System, SystemKind};
pub use topology::{Subnet, Topology};

use log::{debug, info};
use std::net::Ipv4Addr;

use crate::algorithms::PathFinder;
use crate::error::{PathError, TopologyError};
use crate::protocol::{ConvergenceReport, RoutePropagator, RoutingTable};

/// A topology together with the routing tables derived from it.
///
/// Every mutation that can change reachability is followed by a full
/// reconvergence before it returns, so callers never observe tables that
/// lag behind the topology.
#[derive(Debug, Clone, Default)]
pub struct Network {
    topology: Topology,
    routes: RoutePropagator,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_topology(topology: Topology) -> Self {
        let mut network = Self {
            topology,
            routes: RoutePropagator::new(),
        };
        network.reconverge();
        network
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn routes(&self) -> &RoutePropagator {
        &self.routes
    }

    pub fn reconverge(&mut self) -> ConvergenceReport {
        self.routes.mark_stale();
        self.routes.converge(&self.topology)
    }

    pub fn add_subnet(&mut self, cidr: Cidr) -> Result<(), TopologyError> {
        self.topology.add_subnet(cidr)
    }

    pub fn add_system(&mut self, system: System) -> Result<(), TopologyError> {
        self.topology.add_system(system)?;
        self.reconverge();
        Ok(())
    }

    /// Removes the system and its connections, then reconverges.
    pub fn remove_system(&mut self, address: Ipv4Addr) -> Result<System, TopologyError> {
        let removed = self.topology.remove_system(address)?;
        self.reconverge();
        Ok(removed)
    }

    pub fn add_connection(&mut self, connection: Connection) -> Result<(), TopologyError> {
        self.topology.add_connection(connection)?;
        self.reconverge();
        Ok(())
    }

    /// Fails with [`TopologyError::ConnectionNotFound`] without touching the
    /// topology when the pair is not connected.
    pub fn remove_connection(&mut self, a: Ipv4Addr, b: Ipv4Addr) -> Result<Connection, TopologyError> {
        let removed = self.topology.remove_connection(a, b)?;
        self.reconverge();
        Ok(removed)
    }

    /// Adds a host named after its address (`PC_10_0_1_5`).
    pub fn add_host(&mut self, cidr: Cidr, address: Ipv4Addr) -> Result<(), TopologyError> {
        if self.topology.subnet_by_cidr(&cidr).is_none() {
            return Err(TopologyError::UnknownSubnet(cidr));
        }
        if self.topology.system_by_address(address).is_some() {
            return Err(TopologyError::DuplicateAddress(address));
        }
        self.add_system(System::host(System::generated_host_name(address), address, cidr))
    }

    /// Removes a host that belongs to `cidr`. Routers are refused.
    pub fn remove_host(&mut self, cidr: Cidr, address: Ipv4Addr) -> Result<System, TopologyError> {
        if self.topology.subnet_by_cidr(&cidr).is_none() {
            return Err(TopologyError::UnknownSubnet(cidr));
        }
        let system = self
            .topology
            .system_by_address(address)
            .ok_or(TopologyError::UnknownSystem(address))?;
        if system.is_router() {
            return Err(TopologyError::NotAHost(address));
        }
        if system.subnet != cidr {
            return Err(TopologyError::NotInSubnet { address, cidr });
        }
        self.remove_system(address)
    }

    /// Hop sequence from `source` to `destination`; empty when there is none.
    pub fn find_shortest_path(&self, source: Ipv4Addr, destination: Ipv4Addr) -> Vec<Ipv4Addr> {
        PathFinder::new(&self.topology, &self.routes).find_shortest_path(source, destination)
    }

    /// Checked path query: distinct, known endpoints and an existing path.
    pub fn send_packet(&self, source: Ipv4Addr, destination: Ipv4Addr) -> Result<Vec<Ipv4Addr>, PathError> {
        if source == destination {
            return Err(PathError::SameEndpoint(source));
        }
        for address in [source, destination] {
            if self.topology.system_by_address(address).is_none() {
                return Err(PathError::UnknownSystem(address));
            }
        }

        let path = self.find_shortest_path(source, destination);
        if path.is_empty() {
            info!("No path from {} to {}", source, destination);
            return Err(PathError::NoPath {
                from: source,
                to: destination,
            });
        }
        debug!("Packet {} -> {} takes {} hops", source, destination, path.len() - 1);
        Ok(path)
    }

    pub fn subnet_by_cidr(&self, cidr: &Cidr) -> Option<&Subnet> {
        self.topology.subnet_by_cidr(cidr)
    }

    pub fn system_by_address(&self, address: Ipv4Addr) -> Option<&System> {
        self.topology.system_by_address(address)
    }

    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.topology.system_by_name(name)
    }

    pub fn connection_exists(&self, a: Ipv4Addr, b: Ipv4Addr) -> bool {
        self.topology.connection_exists(a, b)
    }

    pub fn connections_of(&self, address: Ipv4Addr) -> Vec<&Connection> {
        self.topology.connections_of(address)
    }

    pub fn routing_table(&self, router: Ipv4Addr) -> Option<&RoutingTable> {
        self.routes.table(router)
    }

    /// All subnets, ordered by network address then prefix length.
    pub fn list_subnets(&self) -> Vec<Cidr> {
        self.topology.subnets().map(|subnet| subnet.cidr).collect()
    }

    /// The subnet's router first, then its hosts in address order.
    pub fn list_systems(&self, cidr: &Cidr) -> Result<Vec<Ipv4Addr>, TopologyError> {
        let subnet = self
            .topology
            .subnet_by_cidr(cidr)
            .ok_or(TopologyError::UnknownSubnet(*cidr))?;

        let router = subnet.router();
        Ok(router
            .into_iter()
            .chain(subnet.members().filter(|member| Some(*member) != router))
            .collect())
    }

    /// First and last address of the subnet's range.
    pub fn list_range(&self, cidr: &Cidr) -> Result<(Ipv4Addr, Ipv4Addr), TopologyError> {
        let subnet = self
            .topology
            .subnet_by_cidr(cidr)
            .ok_or(TopologyError::UnknownSubnet(*cidr))?;
        Ok((subnet.cidr.first_address(), subnet.cidr.last_address()))
    }
}
