//! Relaxation backend trait and result types.

use crate::error::SolveResult;
use crate::model::Model;

/// Status of a node relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxStatus {
    /// Optimal fractional vertex found; `obj_val` is a valid lower bound
    /// for the node's subtree.
    Optimal,

    /// The node's bound fixes contradict the constraints; prune.
    Infeasible,

    /// Unbounded relaxation. Cannot occur for box-bounded variables under
    /// a nonnegative-cost minimization; kept so a modeling bug surfaces as
    /// a status instead of a bogus bound.
    Unbounded,
}

/// Result of a node relaxation solve.
#[derive(Debug, Clone)]
pub struct RelaxResult {
    /// Solve status.
    pub status: RelaxStatus,

    /// Optimal fractional point (empty unless Optimal).
    pub x: Vec<f64>,

    /// Relaxation objective: the node's dual bound (infinity unless
    /// Optimal).
    pub obj_val: f64,
}

impl RelaxResult {
    /// An infeasible-node result.
    pub fn infeasible() -> Self {
        Self {
            status: RelaxStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::INFINITY,
        }
    }
}

/// A bounding engine the search can drive.
///
/// The backend holds the continuous relaxation of the model and the
/// current node's variable bounds. The search fixes variables through
/// [`set_var_bounds`](RelaxationBackend::set_var_bounds) before each
/// solve and resets them when moving to another node.
pub trait RelaxationBackend {
    /// Load the model's rows, objective, and default `[0, 1]` boxes.
    fn initialize(&mut self, model: &Model) -> SolveResult<()>;

    /// Restore every variable to its default box.
    fn reset_bounds(&mut self);

    /// Tighten one variable's box for the current node.
    fn set_var_bounds(&mut self, var: usize, lb: f64, ub: f64);

    /// Solve the relaxation under the current bounds.
    ///
    /// Numerical failures are retried internally with an alternate pivot
    /// rule; only exhausted retries surface as an error.
    fn solve(&mut self) -> SolveResult<RelaxResult>;
}
