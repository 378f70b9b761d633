pub mod bfs;
pub mod tabular;

pub use bfs::{BfsSolver, Solution};
pub use tabular::{QTableAgent, QTableAgentConfig};
