//! Dense two-phase simplex solver for small linear programs.
//!
//! This crate is the continuous engine behind the test-selection solver:
//! the branch-and-bound layer in `select-mip` calls it once per node to
//! bound the node's subtree. Problems are stated as
//!
//! ```text
//! minimize    c^T x
//! subject to  a_i^T x  {<=, >=, =}  b_i    for each row i
//!             lb <= x <= ub
//! ```
//!
//! with all lower bounds nonnegative. Box bounds are lowered to rows
//! internally, so the tableau only ever deals with `x >= 0`.

mod simplex;

pub use simplex::solve;

use thiserror::Error;

/// Errors from LP setup. Solve outcomes (infeasible, unbounded, iteration
/// limit) are statuses, not errors.
#[derive(Error, Debug)]
pub enum LpError {
    /// Row or bound dimensions disagree with the objective length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A coefficient, bound, or right-hand side is NaN or infinite where
    /// a finite value is required.
    #[error("non-finite data: {0}")]
    NonFiniteData(String),
}

/// Result type for LP operations.
pub type LpResult<T> = Result<T, LpError>;

/// Constraint row sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// `a^T x <= b`
    Le,
    /// `a^T x >= b`
    Ge,
    /// `a^T x = b`
    Eq,
}

/// A single constraint row with sparse coefficients.
#[derive(Debug, Clone)]
pub struct LpRow {
    /// Nonzero coefficients as (variable index, value) pairs.
    pub coefs: Vec<(usize, f64)>,

    /// Row sense.
    pub sense: RowSense,

    /// Right-hand side.
    pub rhs: f64,
}

impl LpRow {
    /// Create a `>=` row.
    pub fn ge(coefs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coefs, sense: RowSense::Ge, rhs }
    }

    /// Create a `<=` row.
    pub fn le(coefs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coefs, sense: RowSense::Le, rhs }
    }

    /// Create an `=` row.
    pub fn eq(coefs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coefs, sense: RowSense::Eq, rhs }
    }
}

/// A linear program in row form.
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Objective coefficients (minimization), length n.
    pub objective: Vec<f64>,

    /// Constraint rows.
    pub rows: Vec<LpRow>,

    /// Per-variable (lower, upper) bounds. Lower bounds must be >= 0.
    pub bounds: Vec<(f64, f64)>,
}

/// Pivot column selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative reduced cost, lowest index on ties.
    #[default]
    Dantzig,

    /// Lowest index with negative reduced cost. Slower but cycle-free;
    /// used as the retry rule when Dantzig stalls.
    Bland,
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct LpSettings {
    /// Maximum simplex pivots across both phases.
    pub max_iter: usize,

    /// Feasibility / optimality tolerance.
    pub tol: f64,

    /// Pivot column selection rule.
    pub pivot_rule: PivotRule,
}

impl Default for LpSettings {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tol: 1e-9,
            pivot_rule: PivotRule::default(),
        }
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// Optimal vertex found.
    Optimal,

    /// No point satisfies the constraints (phase-1 optimum above tolerance).
    Infeasible,

    /// Objective unbounded below over the feasible region.
    Unbounded,

    /// Pivot budget exhausted before convergence.
    IterationLimit,
}

/// Solution returned by [`solve`].
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Solve status.
    pub status: LpStatus,

    /// Primal solution over the structural variables (empty unless Optimal).
    pub x: Vec<f64>,

    /// Objective value at `x` (infinity unless Optimal).
    pub obj_val: f64,

    /// Total pivots performed.
    pub iterations: usize,
}

impl LpSolution {
    pub(crate) fn without_point(status: LpStatus, iterations: usize) -> Self {
        Self {
            status,
            x: Vec::new(),
            obj_val: f64::INFINITY,
            iterations,
        }
    }
}
