use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::Ipv4Addr;

use super::{Cidr, Connection, ConnectionKey, System, SystemKind};
use crate::error::TopologyError;

/// A subnet and the systems it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub cidr: Cidr,
    members: BTreeSet<Ipv4Addr>,
    router: Option<Ipv4Addr>,
}

impl Subnet {
    pub fn new(cidr: Cidr) -> Self {
        Self {
            cidr,
            members: BTreeSet::new(),
            router: None,
        }
    }

    /// Member addresses in ascending order, router included.
    pub fn members(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.members.iter().copied()
    }

    pub fn router(&self) -> Option<Ipv4Addr> {
        self.router
    }

    pub fn has_member(&self, address: Ipv4Addr) -> bool {
        self.members.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The topology store: subnets, systems and connections.
///
/// Every mutator checks the structural invariants and refuses the change
/// with a [`TopologyError`] instead of entering an inconsistent state.
/// Getters hand out shared borrows of the live state.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    subnets: BTreeMap<Cidr, Subnet>,
    systems: BTreeMap<Ipv4Addr, System>,
    names: HashMap<String, Ipv4Addr>,
    connections: BTreeMap<ConnectionKey, Connection>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subnet(&mut self, cidr: Cidr) -> Result<(), TopologyError> {
        if self.subnets.contains_key(&cidr) {
            return Err(TopologyError::DuplicateSubnet(cidr));
        }
        if let Some(existing) = self.subnets.keys().find(|existing| existing.overlaps(&cidr)) {
            return Err(TopologyError::OverlappingSubnet {
                cidr,
                existing: *existing,
            });
        }

        debug!("Adding subnet {}", cidr);
        self.subnets.insert(cidr, Subnet::new(cidr));
        Ok(())
    }

    pub fn add_system(&mut self, system: System) -> Result<(), TopologyError> {
        let subnet = self
            .subnets
            .get(&system.subnet)
            .ok_or(TopologyError::UnknownSubnet(system.subnet))?;

        if !subnet.cidr.contains(system.address) {
            return Err(TopologyError::AddressOutOfRange {
                address: system.address,
                cidr: subnet.cidr,
            });
        }
        if self.systems.contains_key(&system.address) {
            return Err(TopologyError::DuplicateAddress(system.address));
        }
        if self.names.contains_key(&system.name) {
            return Err(TopologyError::DuplicateName(system.name));
        }
        if let (SystemKind::Router, Some(router)) = (system.kind, subnet.router) {
            return Err(TopologyError::SubnetHasRouter {
                cidr: subnet.cidr,
                router,
            });
        }

        info!("Adding {:?} {} to {}", system.kind, system, system.subnet);

        if let Some(subnet) = self.subnets.get_mut(&system.subnet) {
            subnet.members.insert(system.address);
            if system.is_router() {
                subnet.router = Some(system.address);
            }
        }
        self.names.insert(system.name.clone(), system.address);
        self.systems.insert(system.address, system);
        Ok(())
    }

    /// Removes a system together with every connection touching it.
    pub fn remove_system(&mut self, address: Ipv4Addr) -> Result<System, TopologyError> {
        let system = self
            .systems
            .remove(&address)
            .ok_or(TopologyError::UnknownSystem(address))?;

        self.names.remove(&system.name);
        if let Some(subnet) = self.subnets.get_mut(&system.subnet) {
            subnet.members.remove(&address);
            if subnet.router == Some(address) {
                subnet.router = None;
            }
        }

        let before = self.connections.len();
        self.connections.retain(|key, _| !key.touches(address));
        info!(
            "Removed {} from {} along with {} connection(s)",
            system,
            system.subnet,
            before - self.connections.len()
        );

        Ok(system)
    }

    pub fn add_connection(&mut self, connection: Connection) -> Result<(), TopologyError> {
        let (a, b) = (connection.a, connection.b);
        if a == b {
            return Err(TopologyError::SelfConnection(a));
        }
        let first = self.systems.get(&a).ok_or(TopologyError::UnknownSystem(a))?;
        let second = self.systems.get(&b).ok_or(TopologyError::UnknownSystem(b))?;

        if self.connections.contains_key(&connection.key()) {
            return Err(TopologyError::DuplicateConnection(a, b));
        }

        if first.subnet == second.subnet {
            if connection.weight.is_none() {
                return Err(TopologyError::MissingWeight(a, b));
            }
        } else if first.is_router() && second.is_router() {
            if connection.weight.is_some() {
                return Err(TopologyError::UnexpectedWeight(a, b));
            }
        } else {
            return Err(TopologyError::CrossSubnetHost(a, b));
        }

        info!("Adding connection {} <--> {} (cost {})", a, b, connection.cost());
        self.connections.insert(connection.key(), connection);
        Ok(())
    }

    pub fn remove_connection(&mut self, a: Ipv4Addr, b: Ipv4Addr) -> Result<Connection, TopologyError> {
        let removed = self
            .connections
            .remove(&ConnectionKey::new(a, b))
            .ok_or(TopologyError::ConnectionNotFound(a, b))?;
        info!("Removed connection {} <--> {}", a, b);
        Ok(removed)
    }

    pub fn connection_exists(&self, a: Ipv4Addr, b: Ipv4Addr) -> bool {
        self.connections.contains_key(&ConnectionKey::new(a, b))
    }

    pub fn connection(&self, a: Ipv4Addr, b: Ipv4Addr) -> Option<&Connection> {
        self.connections.get(&ConnectionKey::new(a, b))
    }

    pub fn subnet_by_cidr(&self, cidr: &Cidr) -> Option<&Subnet> {
        self.subnets.get(cidr)
    }

    pub fn system_by_address(&self, address: Ipv4Addr) -> Option<&System> {
        self.systems.get(&address)
    }

    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.names.get(name).and_then(|address| self.systems.get(address))
    }

    /// Subnets ordered by network address, then prefix length.
    pub fn subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets.values()
    }

    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn routers(&self) -> impl Iterator<Item = &System> {
        self.systems.values().filter(|system| system.is_router())
    }

    /// Links whose endpoints are both routers, in ascending key order.
    pub fn router_links(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(|link| {
            let is_router = |address: Ipv4Addr| self.systems.get(&address).is_some_and(System::is_router);
            is_router(link.a) && is_router(link.b)
        })
    }

    pub fn connections_of(&self, address: Ipv4Addr) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|(key, _)| key.touches(address))
            .map(|(_, link)| link)
            .collect()
    }

    /// Adjacent systems and link costs, ordered by neighbor address.
    pub fn get_neighbors(&self, address: Ipv4Addr) -> Vec<(Ipv4Addr, u32)> {
        let mut neighbors: Vec<(Ipv4Addr, u32)> = self
            .connections_of(address)
            .into_iter()
            .filter_map(|link| link.other(address).map(|other| (other, link.cost())))
            .collect();
        neighbors.sort();
        neighbors
    }

    pub fn subnet_of(&self, address: Ipv4Addr) -> Option<&Subnet> {
        self.systems
            .get(&address)
            .and_then(|system| self.subnets.get(&system.subnet))
    }
}
