pub mod dijkstra;

pub use dijkstra::{ShortestPaths, shortest_paths};
