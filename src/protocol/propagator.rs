use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use super::RoutingTable;
use crate::network::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    /// The topology changed since the tables were last computed
    Stale,
    Converged,
}

/// Summary of one convergence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvergenceReport {
    /// Full passes over the router links, terminal pass included
    pub passes: usize,
    pub routers: usize,
    /// Table entries replaced during the run
    pub updates: usize,
}

impl ConvergenceReport {
    /// Upper bound on passes for a topology with `routers` routers.
    pub fn pass_bound(routers: usize) -> usize {
        routers.max(1)
    }
}

/// Distance-vector route propagation between routers.
///
/// Tables are derived state: every call to [`RoutePropagator::converge`]
/// rebuilds them from the trivial home routes and exchanges them over the
/// router-to-router links until a full pass changes nothing.
#[derive(Debug, Clone)]
pub struct RoutePropagator {
    state: ConvergenceState,
    tables: BTreeMap<Ipv4Addr, RoutingTable>,
    last_report: Option<ConvergenceReport>,
}

impl Default for RoutePropagator {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutePropagator {
    pub fn new() -> Self {
        Self {
            state: ConvergenceState::Stale,
            tables: BTreeMap::new(),
            last_report: None,
        }
    }

    pub fn state(&self) -> ConvergenceState {
        self.state
    }

    pub fn is_converged(&self) -> bool {
        self.state == ConvergenceState::Converged
    }

    pub fn mark_stale(&mut self) {
        self.state = ConvergenceState::Stale;
    }

    pub fn last_report(&self) -> Option<ConvergenceReport> {
        self.last_report
    }

    pub fn table(&self, router: Ipv4Addr) -> Option<&RoutingTable> {
        self.tables.get(&router)
    }

    pub fn tables(&self) -> impl Iterator<Item = &RoutingTable> {
        self.tables.values()
    }

    pub fn converge(&mut self, topology: &Topology) -> ConvergenceReport {
        self.tables = topology
            .routers()
            .map(|router| (router.address, RoutingTable::new(router.address, router.subnet)))
            .collect();

        let links: Vec<(Ipv4Addr, Ipv4Addr)> = topology
            .router_links()
            .map(|link| link.key().endpoints())
            .collect();

        let bound = ConvergenceReport::pass_bound(self.tables.len());
        let mut report = ConvergenceReport {
            routers: self.tables.len(),
            ..Default::default()
        };

        let mut changed = true;
        while changed {
            changed = false;
            report.passes += 1;

            for &(a, b) in &links {
                for (router, neighbor) in [(a, b), (b, a)] {
                    if self.improve(router, neighbor) {
                        changed = true;
                        report.updates += 1;
                    }
                }
            }
            trace!("Propagation pass {} changed tables: {}", report.passes, changed);

            if changed && report.passes > bound {
                warn!(
                    "Route propagation still changing after {} passes over {} routers, stopping",
                    report.passes, report.routers
                );
                break;
            }
        }

        self.state = ConvergenceState::Converged;
        self.last_report = Some(report);
        debug!(
            "Routes converged: {} routers, {} links, {} passes, {} updates",
            report.routers,
            links.len(),
            report.passes,
            report.updates
        );
        report
    }

    fn improve(&mut self, router: Ipv4Addr, neighbor: Ipv4Addr) -> bool {
        let Some(advertised) = self.tables.get(&neighbor).cloned() else {
            return false;
        };
        match self.tables.get_mut(&router) {
            Some(table) => table.merge_from(&advertised),
            None => false,
        }
    }
}
