pub mod dijkstra;
pub mod path_finder;

pub use dijkstra::{ShortestPath, path_cost, shortest_path_in_subnet};
pub use path_finder::PathFinder;
