pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;

use std::sync::Arc;
use tokio::sync::RwLock;

pub use error::{PathError, TopologyError};
pub use network::{Cidr, Connection, Network, System, SystemKind, Topology};

/// Network handle for multi-threaded callers. A write guard spans a whole
/// mutate-then-reconverge unit, so readers never see half-updated tables.
pub type SharedNetwork = Arc<RwLock<Network>>;

pub fn shared(network: Network) -> SharedNetwork {
    Arc::new(RwLock::new(network))
}
