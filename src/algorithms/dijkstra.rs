use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::net::Ipv4Addr;

use crate::network::{Subnet, Topology};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: u32,
    pub path: Vec<Ipv4Addr>,
}

impl ShortestPath {
    pub fn next_hop(&self) -> Option<Ipv4Addr> {
        self.path.get(1).copied()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct State {
    cost: u32,
    system: Ipv4Addr,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal costs settle the lower address first
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.system.cmp(&self.system))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted shortest path between two members of `subnet`, using only
/// connections whose endpoints both lie in it.
///
/// Ties between equal-cost frontier entries go to the lower address, and a
/// predecessor is only replaced by a strictly cheaper one, so the result is
/// stable for an unchanged topology. Returns `None` when either endpoint is
/// not a member or the destination cannot be reached.
pub fn shortest_path_in_subnet(
    topology: &Topology,
    subnet: &Subnet,
    source: Ipv4Addr,
    destination: Ipv4Addr,
) -> Option<ShortestPath> {
    if !subnet.has_member(source) || !subnet.has_member(destination) {
        return None;
    }

    let mut distances: HashMap<Ipv4Addr, u32> = HashMap::new();
    let mut previous: HashMap<Ipv4Addr, Ipv4Addr> = HashMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(source, 0);
    heap.push(State {
        cost: 0,
        system: source,
    });

    while let Some(State { cost, system }) = heap.pop() {
        if system == destination {
            return Some(ShortestPath {
                cost,
                path: reconstruct_path(&previous, destination),
            });
        }

        // Skip if we've already found a better path
        if cost > *distances.get(&system).unwrap_or(&u32::MAX) {
            continue;
        }

        for (neighbor, link_cost) in topology.get_neighbors(system) {
            if !subnet.has_member(neighbor) {
                continue;
            }
            let new_cost = cost.saturating_add(link_cost);

            if new_cost < *distances.get(&neighbor).unwrap_or(&u32::MAX) {
                distances.insert(neighbor, new_cost);
                previous.insert(neighbor, system);
                heap.push(State {
                    cost: new_cost,
                    system: neighbor,
                });
            }
        }
    }

    None
}

/// Sum of connection costs along `path`, or `None` if two consecutive
/// systems are not connected.
pub fn path_cost(topology: &Topology, path: &[Ipv4Addr]) -> Option<u32> {
    path.windows(2).try_fold(0u32, |total, hop| {
        topology
            .connection(hop[0], hop[1])
            .map(|link| total.saturating_add(link.cost()))
    })
}

fn reconstruct_path(previous: &HashMap<Ipv4Addr, Ipv4Addr>, destination: Ipv4Addr) -> Vec<Ipv4Addr> {
    let mut path = vec![destination];
    let mut current = destination;

    while let Some(&prev) = previous.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Cidr, Connection, System};

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn subnet_with_hosts(hosts: &[&str]) -> (Topology, Cidr) {
        let cidr: Cidr = "192.168.1.0/24".parse().unwrap();
        let mut topology = Topology::new();
        topology.add_subnet(cidr).unwrap();
        for (i, host) in hosts.iter().enumerate() {
            topology
                .add_system(System::host(format!("C{}", i + 1), ip(host), cidr))
                .unwrap();
        }
        (topology, cidr)
    }

    fn link(topology: &mut Topology, a: &str, b: &str, weight: u32) {
        topology
            .add_connection(Connection::weighted(ip(a), ip(b), weight))
            .unwrap();
    }

    fn search(topology: &Topology, cidr: Cidr, from: &str, to: &str) -> Option<ShortestPath> {
        let subnet = topology.subnet_by_cidr(&cidr).unwrap();
        shortest_path_in_subnet(topology, subnet, ip(from), ip(to))
    }

    #[test]
    fn direct_connection() {
        let (mut topology, cidr) = subnet_with_hosts(&["192.168.1.1", "192.168.1.2", "192.168.1.3"]);
        link(&mut topology, "192.168.1.1", "192.168.1.2", 10);

        let found = search(&topology, cidr, "192.168.1.1", "192.168.1.2").unwrap();
        assert_eq!(found.path, vec![ip("192.168.1.1"), ip("192.168.1.2")]);
        assert_eq!(found.cost, 10);
        assert_eq!(found.next_hop(), Some(ip("192.168.1.2")));
    }

    #[test]
    fn cheaper_detour_preferred() {
        let (mut topology, cidr) = subnet_with_hosts(&["192.168.1.1", "192.168.1.2", "192.168.1.3"]);
        link(&mut topology, "192.168.1.1", "192.168.1.2", 100);
        link(&mut topology, "192.168.1.1", "192.168.1.3", 10);
        link(&mut topology, "192.168.1.3", "192.168.1.2", 10);

        let found = search(&topology, cidr, "192.168.1.1", "192.168.1.2").unwrap();
        assert_eq!(
            found.path,
            vec![ip("192.168.1.1"), ip("192.168.1.3"), ip("192.168.1.2")]
        );
        assert_eq!(found.cost, 20);
        assert_eq!(path_cost(&topology, &found.path), Some(20));
    }

    #[test]
    fn no_connection_means_no_path() {
        let (topology, cidr) = subnet_with_hosts(&["192.168.1.1", "192.168.1.2"]);
        assert!(search(&topology, cidr, "192.168.1.1", "192.168.1.2").is_none());
    }

    #[test]
    fn source_equals_destination() {
        let (topology, cidr) = subnet_with_hosts(&["192.168.1.1"]);
        let found = search(&topology, cidr, "192.168.1.1", "192.168.1.1").unwrap();
        assert_eq!(found.path, vec![ip("192.168.1.1")]);
        assert_eq!(found.cost, 0);
    }

    #[test]
    fn equal_cost_paths_are_stable() {
        // 1 -> 2 -> 4 and 1 -> 3 -> 4 both cost 2
        let (mut topology, cidr) = subnet_with_hosts(&[
            "192.168.1.1",
            "192.168.1.2",
            "192.168.1.3",
            "192.168.1.4",
        ]);
        link(&mut topology, "192.168.1.1", "192.168.1.3", 1);
        link(&mut topology, "192.168.1.3", "192.168.1.4", 1);
        link(&mut topology, "192.168.1.1", "192.168.1.2", 1);
        link(&mut topology, "192.168.1.2", "192.168.1.4", 1);

        let first = search(&topology, cidr, "192.168.1.1", "192.168.1.4").unwrap();
        assert_eq!(first.cost, 2);
        assert_eq!(first.next_hop(), Some(ip("192.168.1.2")));
        for _ in 0..10 {
            assert_eq!(search(&topology, cidr, "192.168.1.1", "192.168.1.4"), Some(first.clone()));
        }
    }

    #[test]
    fn minimal_cost_on_denser_graph() {
        let hosts = [
            "192.168.1.1",
            "192.168.1.2",
            "192.168.1.3",
            "192.168.1.4",
            "192.168.1.5",
        ];
        let (mut topology, cidr) = subnet_with_hosts(&hosts);
        link(&mut topology, hosts[0], hosts[1], 7);
        link(&mut topology, hosts[0], hosts[2], 9);
        link(&mut topology, hosts[0], hosts[4], 14);
        link(&mut topology, hosts[1], hosts[2], 10);
        link(&mut topology, hosts[1], hosts[3], 15);
        link(&mut topology, hosts[2], hosts[3], 11);
        link(&mut topology, hosts[2], hosts[4], 2);
        link(&mut topology, hosts[3], hosts[4], 6);

        let found = search(&topology, cidr, hosts[0], hosts[3]).unwrap();
        assert_eq!(found.cost, 17);
        assert_eq!(
            found.path,
            vec![ip(hosts[0]), ip(hosts[2]), ip(hosts[4]), ip(hosts[3])]
        );
        assert_eq!(path_cost(&topology, &found.path), Some(17));
    }

    #[test]
    fn stays_inside_subnet() {
        let left: Cidr = "10.0.1.0/24".parse().unwrap();
        let right: Cidr = "10.0.2.0/24".parse().unwrap();
        let mut topology = Topology::new();
        topology.add_subnet(left).unwrap();
        topology.add_subnet(right).unwrap();
        topology.add_system(System::router("R1", ip("10.0.1.1"), left)).unwrap();
        topology.add_system(System::host("H1", ip("10.0.1.2"), left)).unwrap();
        topology.add_system(System::router("R2", ip("10.0.2.1"), right)).unwrap();
        topology
            .add_connection(Connection::unweighted(ip("10.0.1.1"), ip("10.0.2.1")))
            .unwrap();

        let subnet = topology.subnet_by_cidr(&left).unwrap();
        assert!(shortest_path_in_subnet(&topology, subnet, ip("10.0.1.1"), ip("10.0.1.2")).is_none());
        assert!(shortest_path_in_subnet(&topology, subnet, ip("10.0.1.1"), ip("10.0.2.1")).is_none());
    }
}
