pub mod builder;
pub mod geo;
pub mod topology;

pub use builder::build_topology;
pub use geo::haversine;
pub use topology::{Graph, Link};
