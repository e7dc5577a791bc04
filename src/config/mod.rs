pub mod topology_config;

pub use topology_config::*;
