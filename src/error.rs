use thiserror::Error;

use crate::RouterId;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("drop fraction must lie in [0, 1), got {0}")]
    InvalidDropFraction(f64),

    #[error("router {0} does not exist in this topology")]
    UnknownRouter(RouterId),

    #[error("router {0} is defined more than once")]
    DuplicateRouter(RouterId),

    #[error("router {router} has an invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { router: RouterId, lat: f64, lon: f64 },

    #[error("cannot link router {0} to itself")]
    SelfLoop(RouterId),

    #[error("link cost between {a} and {b} must be finite and non-negative, got {cost}")]
    InvalidCost { a: RouterId, b: RouterId, cost: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}
