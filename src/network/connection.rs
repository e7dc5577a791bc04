use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Cost of an unweighted router-to-router link between subnets.
pub const INTER_SUBNET_COST: u32 = 1;

/// Unordered endpoint pair, stored with the lower address first so that
/// `(a, b)` and `(b, a)` map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionKey(Ipv4Addr, Ipv4Addr);

impl ConnectionKey {
    pub fn new(a: Ipv4Addr, b: Ipv4Addr) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn endpoints(&self) -> (Ipv4Addr, Ipv4Addr) {
        (self.0, self.1)
    }

    pub fn touches(&self, address: Ipv4Addr) -> bool {
        self.0 == address || self.1 == address
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub a: Ipv4Addr,
    pub b: Ipv4Addr,
    /// Present for links inside a subnet, absent for router links between subnets
    pub weight: Option<u32>,
}

impl Connection {
    pub fn weighted(a: Ipv4Addr, b: Ipv4Addr, weight: u32) -> Self {
        Self {
            a,
            b,
            weight: Some(weight),
        }
    }

    pub fn unweighted(a: Ipv4Addr, b: Ipv4Addr) -> Self {
        Self { a, b, weight: None }
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey::new(self.a, self.b)
    }

    pub fn cost(&self) -> u32 {
        self.weight.unwrap_or(INTER_SUBNET_COST)
    }

    /// The far end of the link as seen from `address`.
    pub fn other(&self, address: Ipv4Addr) -> Option<Ipv4Addr> {
        if self.a == address {
            Some(self.b)
        } else if self.b == address {
            Some(self.a)
        } else {
            None
        }
    }
}
