//! Model and solution types for the selection solver.

mod formulation;
mod solution;

pub use formulation::{formulate, Model};
pub use solution::{IncumbentTracker, Solution, SolveStatus};
