use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::TopologyError;

/// An IPv4 subnet identified by its network address and prefix length.
///
/// The network address always has its host bits cleared, so two `Cidr`s are
/// equal exactly when they describe the same range. Ordering is by network
/// address, then prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr(Ipv4Net);

impl Cidr {
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Result<Self, TopologyError> {
        let net = Ipv4Net::new(network, prefix_len)
            .map_err(|_| TopologyError::InvalidCidr(format!("{}/{}", network, prefix_len)))?;
        Self::from_net(net)
    }

    fn from_net(net: Ipv4Net) -> Result<Self, TopologyError> {
        if net.addr() != net.network() {
            return Err(TopologyError::InvalidCidr(net.to_string()));
        }
        Ok(Self(net))
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Lowest address of the range (host bits cleared).
    pub fn first_address(&self) -> Ipv4Addr {
        self.0.network()
    }

    /// Highest address of the range (host bits set).
    pub fn last_address(&self) -> Ipv4Addr {
        self.0.broadcast()
    }

    /// The address right after the network address. For /31 and /32 there is
    /// no such host inside the range and the network address is returned.
    pub fn first_host_address(&self) -> Ipv4Addr {
        let first = u32::from(self.first_address());
        if self.prefix_len() >= 31 {
            return Ipv4Addr::from(first);
        }
        Ipv4Addr::from(first + 1)
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        self.0.contains(&address)
    }

    /// Closed-range intersection on the first and last addresses.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.first_address() <= other.last_address() && other.first_address() <= self.last_address()
    }

    pub fn as_net(&self) -> &Ipv4Net {
        &self.0
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cidr {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv4Net = s
            .trim()
            .parse()
            .map_err(|_| TopologyError::InvalidCidr(s.to_string()))?;
        Self::from_net(net)
    }
}

impl TryFrom<String> for Cidr {
    type Error = TopologyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}
