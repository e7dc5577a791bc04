//! Error types for topology mutation and path queries.
//!
//! Structural problems are reported at the mutation boundary and never reach
//! the routing state. A missing route is not an error for the path engine
//! itself; only the checked `send_packet` surface turns it into [`PathError`].

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::network::Cidr;

/// Structural errors raised when building or mutating a topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// CIDR string that does not parse or has host bits set
    #[error("invalid subnet: {0}")]
    InvalidCidr(String),

    #[error("subnet {0} already exists")]
    DuplicateSubnet(Cidr),

    #[error("subnet {cidr} overlaps existing subnet {existing}")]
    OverlappingSubnet { cidr: Cidr, existing: Cidr },

    #[error("subnet not found: {0}")]
    UnknownSubnet(Cidr),

    #[error("address {address} is not inside subnet {cidr}")]
    AddressOutOfRange { address: Ipv4Addr, cidr: Cidr },

    #[error("address {0} is already in use")]
    DuplicateAddress(Ipv4Addr),

    #[error("system name {0} is already in use")]
    DuplicateName(String),

    /// A subnet carries at most one router
    #[error("subnet {cidr} already has router {router}")]
    SubnetHasRouter { cidr: Cidr, router: Ipv4Addr },

    #[error("no system with address {0}")]
    UnknownSystem(Ipv4Addr),

    #[error("no system named {0}")]
    UnknownSystemName(String),

    #[error("system {0} is a router, not a host")]
    NotAHost(Ipv4Addr),

    #[error("system {address} does not belong to subnet {cidr}")]
    NotInSubnet { address: Ipv4Addr, cidr: Cidr },

    #[error("cannot connect {0} to itself")]
    SelfConnection(Ipv4Addr),

    #[error("connection {0} <--> {1} already exists")]
    DuplicateConnection(Ipv4Addr, Ipv4Addr),

    #[error("no connection exists between {0} and {1}")]
    ConnectionNotFound(Ipv4Addr, Ipv4Addr),

    /// Connections inside a subnet must be weighted
    #[error("connection inside a subnet must be weighted: {0} <--> {1}")]
    MissingWeight(Ipv4Addr, Ipv4Addr),

    /// Router-to-router links across subnets carry the fixed unit cost
    #[error("connection between subnets must not be weighted: {0} <--> {1}")]
    UnexpectedWeight(Ipv4Addr, Ipv4Addr),

    #[error("only routers can connect to other subnets: {0} <--> {1}")]
    CrossSubnetHost(Ipv4Addr, Ipv4Addr),
}

/// Errors surfaced by the checked packet-sending query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("source and destination cannot be the same: {0}")]
    SameEndpoint(Ipv4Addr),

    #[error("no system with address {0}")]
    UnknownSystem(Ipv4Addr),

    #[error("no path found between {from} and {to}")]
    NoPath { from: Ipv4Addr, to: Ipv4Addr },
}
