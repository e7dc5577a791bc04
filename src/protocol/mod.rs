pub mod propagator;
pub mod routing_table;

pub use propagator::*;
pub use routing_table::*;
