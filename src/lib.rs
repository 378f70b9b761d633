/// Shortest path search and tabular learning agents
pub mod algo;

/// Implementations of strategies for decaying hyperparameters
pub mod decay;

/// Environment
pub mod env;

/// Configuration errors
pub mod error;

/// Exploration policies
pub mod exploration;

/// Obstacle layouts
pub mod grid;

/// The grid maze environment
pub mod maze;

/// Transition records
pub mod memory;

/// A maze, both solvers, and the training state behind one surface
pub mod sim;

/// Episode control for learning agents
pub mod train;

mod util;

pub use error::{Error, Result};
