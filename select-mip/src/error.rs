//! Error types for the selection solver.

use thiserror::Error;

/// Errors that can occur while formulating or solving an instance.
///
/// Budget exhaustion (node or time limit) is not an error: it surfaces as a
/// [`SolveStatus`](crate::SolveStatus) on the returned solution so a
/// best-effort result is never lost.
#[derive(Error, Debug)]
pub enum SolveError {
    /// Two diseases respond identically on every test, so no selection can
    /// distinguish them.
    #[error("instance is infeasible: diseases {i} and {j} have identical responses on every test")]
    Infeasible {
        /// First disease of the indistinguishable pair.
        i: usize,
        /// Second disease of the indistinguishable pair.
        j: usize,
    },

    /// The relaxation engine failed even after retrying with the
    /// anti-cycling pivot rule.
    #[error("relaxation solve failed: {0}")]
    Numerical(String),

    /// Internal solver error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;
