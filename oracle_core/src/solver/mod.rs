pub mod central;
pub mod convergence;
pub mod solver_config;

pub use central::{find_central, CentralEstimate};
pub use convergence::{CentralTendencySolver, ConvergenceState, SolverResult};
pub use solver_config::SolverConfig;
