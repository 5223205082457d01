pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod types;

pub use error::{Result, SimError};

/// Identifier of a simulated router. Stable for the lifetime of a run.
pub type RouterId = u32;

/// Link or path cost. Finite and non-negative, except for [`UNREACHABLE`].
pub type Cost = f64;

/// Sentinel cost of a destination that cannot be reached. Compares larger than any finite cost.
pub const UNREACHABLE: Cost = f64::INFINITY;
