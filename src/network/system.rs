use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use super::Cidr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemKind {
    Host,
    /// May link to other subnets and owns a routing table
    Router,
}

/// A node of the topology. Name and address are unique across the whole
/// topology; `subnet` is the owning subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    pub address: Ipv4Addr,
    pub subnet: Cidr,
    pub kind: SystemKind,
}

impl System {
    pub fn new(name: impl Into<String>, address: Ipv4Addr, subnet: Cidr, kind: SystemKind) -> Self {
        Self {
            name: name.into(),
            address,
            subnet,
            kind,
        }
    }

    pub fn host(name: impl Into<String>, address: Ipv4Addr, subnet: Cidr) -> Self {
        Self::new(name, address, subnet, SystemKind::Host)
    }

    pub fn router(name: impl Into<String>, address: Ipv4Addr, subnet: Cidr) -> Self {
        Self::new(name, address, subnet, SystemKind::Router)
    }

    /// Name given to hosts created from an address alone: `PC_10_0_1_5`.
    pub fn generated_host_name(address: Ipv4Addr) -> String {
        let [a, b, c, d] = address.octets();
        format!("PC_{}_{}_{}_{}", a, b, c, d)
    }

    pub fn is_router(&self) -> bool {
        self.kind == SystemKind::Router
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}
