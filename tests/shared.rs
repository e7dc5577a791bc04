use std::net::Ipv4Addr;

use subnet_routing::config::TopologyConfig;
use subnet_routing::{SharedNetwork, shared};

fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

fn campus() -> SharedNetwork {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/topologies/campus.json");
    shared(TopologyConfig::load_from_file(path).unwrap().build().unwrap())
}

#[tokio::test]
async fn readers_see_whole_updates() {
    let network = campus();

    let writer = {
        let network = network.clone();
        tokio::spawn(async move {
            let mut guard = network.write().await;
            guard.remove_connection(ip("10.0.1.1"), ip("10.0.2.1")).unwrap();
            guard.remove_connection(ip("10.0.1.1"), ip("10.0.4.1")).unwrap();
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let network = network.clone();
        readers.push(tokio::spawn(async move {
            let guard = network.read().await;
            assert!(guard.routes().is_converged());
            guard.find_shortest_path(ip("10.0.1.10"), ip("10.0.3.30"))
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        let path = reader.await.unwrap();
        // core is either fully linked or fully cut off, never in between
        assert!(path.is_empty() || path.first() == Some(&ip("10.0.1.10")));
    }

    let guard = network.read().await;
    assert!(guard.find_shortest_path(ip("10.0.1.10"), ip("10.0.3.30")).is_empty());
    assert_eq!(
        guard.find_shortest_path(ip("10.0.2.20"), ip("10.0.4.40")),
        vec![
            ip("10.0.2.20"),
            ip("10.0.2.1"),
            ip("10.0.3.1"),
            ip("10.0.4.1"),
            ip("10.0.4.40"),
        ]
    );
}

#[tokio::test]
async fn hosts_added_under_write_guard_are_routable() {
    let network = campus();

    {
        let mut guard = network.write().await;
        guard
            .add_host("10.0.4.0/24".parse().unwrap(), ip("10.0.4.41"))
            .unwrap();
        guard
            .add_connection(subnet_routing::Connection::weighted(
                ip("10.0.4.1"),
                ip("10.0.4.41"),
                2,
            ))
            .unwrap();
    }

    let guard = network.read().await;
    assert_eq!(
        guard.system_by_address(ip("10.0.4.41")).map(|system| system.name.as_str()),
        Some("PC_10_0_4_41")
    );
    assert_eq!(
        guard.send_packet(ip("10.0.2.20"), ip("10.0.4.41")).unwrap(),
        vec![
            ip("10.0.2.20"),
            ip("10.0.2.1"),
            ip("10.0.1.1"),
            ip("10.0.4.1"),
            ip("10.0.4.41"),
        ]
    );
}
