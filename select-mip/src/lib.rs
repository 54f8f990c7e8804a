//! Minimum-cost distinguishing test selection.
//!
//! Given a set of diagnostic tests with costs and a 0/1 response matrix
//! over a set of diseases, find the cheapest subset of tests under which
//! every pair of diseases produces a different response pattern.
//!
//! The requirement is formulated as a binary covering program, with one
//! cardinality constraint per disease pair over the tests that tell the
//! pair apart, and solved exactly by branch-and-bound, bounding each node
//! with the two-phase simplex relaxation from `select-lp`.
//!
//! # Example
//!
//! ```
//! use select_mip::{solve, Instance, Settings};
//!
//! let instance = Instance::parse("3\n2\n1 2 3\n1 0\n1 1\n0 1\n").unwrap();
//! let solution = solve(&instance, &Settings::default()).unwrap();
//!
//! assert_eq!(solution.status_tag(), "OPT");
//! assert_eq!(solution.objective, 1.0);
//! assert_eq!(solution.selected, vec![0]);
//! ```

#![warn(missing_docs)]

mod error;
mod instance;
mod model;
mod relax;
mod search;
mod settings;
mod solver;

pub use error::{SolveError, SolveResult};
pub use instance::{FormatError, Instance};
pub use model::{formulate, Model, Solution, SolveStatus};
pub use relax::{RelaxResult, RelaxStatus, RelaxationBackend, SimplexBackend};
pub use settings::{BranchingRule, NodeSelection, Settings};
pub use solver::{solve, solve_model};

// Row types are re-exported so callers can assemble custom models for
// `solve_model` without depending on select-lp directly.
pub use select_lp::{LpRow, RowSense};
