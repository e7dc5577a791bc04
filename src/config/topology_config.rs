use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use crate::error::TopologyError;
use crate::network::{Cidr, Connection, Network, System, SystemKind, Topology};

/// JSON description of a whole topology.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub subnets: Vec<SubnetConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfig {
    pub cidr: Cidr,
    #[serde(default)]
    pub systems: Vec<SystemConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub address: Ipv4Addr,
    #[serde(default = "default_kind")]
    pub kind: SystemKind,
}

/// Link between two systems given by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

fn default_kind() -> SystemKind {
    SystemKind::Host
}

impl TopologyConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading topology file {}", path.display()))?;
        let config: TopologyConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing topology file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing topology file {}", path.display()))?;
        Ok(())
    }

    /// Validates the description and returns a converged network.
    ///
    /// Subnets are added first, then systems, then connections, so every
    /// structural rule is checked by the store's own mutators.
    pub fn build(&self) -> Result<Network, TopologyError> {
        let mut topology = Topology::new();

        for subnet in &self.subnets {
            topology.add_subnet(subnet.cidr)?;
        }
        for subnet in &self.subnets {
            for system in &subnet.systems {
                topology.add_system(System::new(
                    system.name.clone(),
                    system.address,
                    subnet.cidr,
                    system.kind,
                ))?;
            }
        }
        for link in &self.connections {
            let a = resolve(&topology, &link.from)?;
            let b = resolve(&topology, &link.to)?;
            topology.add_connection(Connection {
                a,
                b,
                weight: link.weight,
            })?;
        }

        info!(
            "Loaded topology: {} subnets, {} systems, {} connections",
            topology.subnets().count(),
            topology.systems().count(),
            topology.connections().count()
        );
        Ok(Network::from_topology(topology))
    }

    /// Snapshot of a network in config form.
    pub fn from_network(network: &Network) -> Self {
        let topology = network.topology();
        let name_of = |address: Ipv4Addr| {
            topology
                .system_by_address(address)
                .map(|system| system.name.clone())
                .unwrap_or_else(|| address.to_string())
        };

        let subnets = topology
            .subnets()
            .map(|subnet| SubnetConfig {
                cidr: subnet.cidr,
                systems: subnet
                    .members()
                    .filter_map(|address| topology.system_by_address(address))
                    .map(|system| SystemConfig {
                        name: system.name.clone(),
                        address: system.address,
                        kind: system.kind,
                    })
                    .collect(),
            })
            .collect();

        let connections = topology
            .connections()
            .map(|link| ConnectionConfig {
                from: name_of(link.a),
                to: name_of(link.b),
                weight: link.weight,
            })
            .collect();

        Self {
            subnets,
            connections,
        }
    }
}

fn resolve(topology: &Topology, name: &str) -> Result<Ipv4Addr, TopologyError> {
    topology
        .system_by_name(name)
        .map(|system| system.address)
        .ok_or_else(|| TopologyError::UnknownSystemName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SUBNETS: &str = r#"{
        "subnets": [
            { "cidr": "10.0.1.0/24",
              "systems": [ { "name": "R1", "address": "10.0.1.1", "kind": "router" },
                           { "name": "H1", "address": "10.0.1.2" } ] },
            { "cidr": "10.0.2.0/24",
              "systems": [ { "name": "R2", "address": "10.0.2.1", "kind": "router" },
                           { "name": "H2", "address": "10.0.2.2", "kind": "host" } ] }
        ],
        "connections": [
            { "from": "R1", "to": "H1", "weight": 5 },
            { "from": "R2", "to": "H2", "weight": 3 },
            { "from": "R1", "to": "R2" }
        ]
    }"#;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_build() {
        let config: TopologyConfig = serde_json::from_str(TWO_SUBNETS).unwrap();
        assert_eq!(config.subnets.len(), 2);
        assert_eq!(config.subnets[0].systems[1].kind, SystemKind::Host);

        let network = config.build().unwrap();
        assert!(network.routes().is_converged());
        assert_eq!(
            network.find_shortest_path(ip("10.0.1.2"), ip("10.0.2.2")),
            vec![ip("10.0.1.2"), ip("10.0.1.1"), ip("10.0.2.1"), ip("10.0.2.2")]
        );
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let mut config: TopologyConfig = serde_json::from_str(TWO_SUBNETS).unwrap();
        config.connections.push(ConnectionConfig {
            from: "H1".to_string(),
            to: "ghost".to_string(),
            weight: Some(1),
        });
        assert_eq!(
            config.build().unwrap_err(),
            TopologyError::UnknownSystemName("ghost".to_string())
        );
    }

    #[test]
    fn rejects_weighted_router_link() {
        let mut config: TopologyConfig = serde_json::from_str(TWO_SUBNETS).unwrap();
        config.connections[2].weight = Some(2);
        assert_eq!(
            config.build().unwrap_err(),
            TopologyError::UnexpectedWeight(ip("10.0.1.1"), ip("10.0.2.1"))
        );
    }

    #[test]
    fn rejects_malformed_cidr() {
        let json = r#"{ "subnets": [ { "cidr": "10.0.1.7/24" } ] }"#;
        assert!(serde_json::from_str::<TopologyConfig>(json).is_err());
    }

    #[test]
    fn snapshot_round_trip() {
        let config: TopologyConfig = serde_json::from_str(TWO_SUBNETS).unwrap();
        let network = config.build().unwrap();

        let snapshot = TopologyConfig::from_network(&network);
        let rebuilt = snapshot.build().unwrap();
        assert_eq!(TopologyConfig::from_network(&rebuilt), snapshot);
        assert_eq!(snapshot.connections.len(), 3);
    }

    #[test]
    fn save_and_load() {
        let config: TopologyConfig = serde_json::from_str(TWO_SUBNETS).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.json");

        config.save_to_file(&path).unwrap();
        let loaded = TopologyConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        assert!(TopologyConfig::load_from_file(dir.path().join("missing.json")).is_err());
    }
}
