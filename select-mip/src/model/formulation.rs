//! Constraint formulation.
//!
//! The distinguishability requirement (every disease pair must differ on
//! at least one selected test) is encoded in its cardinality form: for
//! each unordered pair `(i, j)`, one row
//!
//! ```text
//! sum(T_k  for k where A[k][i] != A[k][j]) >= 1
//! ```
//!
//! over the binary selection variables, with objective
//! `min sum(cost[k] * T_k)`. Equivalent but bulkier encodings (per-test
//! XOR gadgets with auxiliary variables) are exercised only by the
//! equivalence tests, never built here.

use sprs::{CsMat, TriMat};

use select_lp::{LpRow, RowSense};

use crate::error::{SolveError, SolveResult};
use crate::instance::Instance;

/// A mixed-binary linear model: sparse constraint rows over box-bounded
/// `[0, 1]` variables, some of which are binary.
#[derive(Debug, Clone)]
pub struct Model {
    objective: Vec<f64>,
    /// Constraint coefficients, one outer row per constraint (CSR).
    a: CsMat<f64>,
    senses: Vec<RowSense>,
    rhs: Vec<f64>,
    binary: Vec<bool>,
}

impl Model {
    /// Assemble a model from sparse rows.
    pub fn from_rows(
        objective: Vec<f64>,
        binary: Vec<bool>,
        rows: Vec<LpRow>,
    ) -> SolveResult<Self> {
        let n = objective.len();
        if binary.len() != n {
            return Err(SolveError::Internal(format!(
                "{} integrality flags for {} variables",
                binary.len(),
                n
            )));
        }

        let mut tri = TriMat::new((rows.len(), n));
        let mut senses = Vec::with_capacity(rows.len());
        let mut rhs = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            for &(j, v) in &row.coefs {
                if j >= n {
                    return Err(SolveError::Internal(format!(
                        "row {i} references variable {j} of {n}"
                    )));
                }
                tri.add_triplet(i, j, v);
            }
            senses.push(row.sense);
            rhs.push(row.rhs);
        }

        Ok(Self {
            objective,
            a: tri.to_csr(),
            senses,
            rhs,
            binary,
        })
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraint rows.
    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    /// Objective coefficients.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Which variables are binary.
    pub fn binary(&self) -> &[bool] {
        &self.binary
    }

    /// Constraint rows in [`LpRow`] form for the relaxation backend.
    pub fn lp_rows(&self) -> Vec<LpRow> {
        self.a
            .outer_iterator()
            .enumerate()
            .map(|(i, row)| LpRow {
                coefs: row.iter().map(|(j, &v)| (j, v)).collect(),
                sense: self.senses[i],
                rhs: self.rhs[i],
            })
            .collect()
    }

    /// Objective value at a point.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        x.iter().zip(&self.objective).map(|(xi, ci)| xi * ci).sum()
    }

    /// Check whether every binary variable is integral within tolerance.
    pub fn is_integer_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.binary
            .iter()
            .zip(x)
            .all(|(&is_bin, &v)| !is_bin || (v - v.round()).abs() <= tol)
    }

    /// Fractional binary variables as (index, value, fractionality).
    ///
    /// Fractionality is the distance to the nearest integer, so 0.5 is the
    /// most fractional a value can be.
    pub fn fractional_vars(&self, x: &[f64], tol: f64) -> Vec<(usize, f64, f64)> {
        let mut result = Vec::new();
        for (i, (&is_bin, &v)) in self.binary.iter().zip(x).enumerate() {
            if !is_bin {
                continue;
            }
            let frac = (v - v.round()).abs();
            if frac > tol {
                result.push((i, v, frac));
            }
        }
        result
    }
}

/// Build the cardinality formulation for an instance.
///
/// Fails with [`SolveError::Infeasible`] when some disease pair has no
/// distinguishing test: an empty `diff` set would otherwise become the
/// unsatisfiable row `sum() >= 1` and send the search chasing a model that
/// can never be satisfied.
pub fn formulate(instance: &Instance) -> SolveResult<Model> {
    let n = instance.num_tests();
    let mut rows = Vec::new();

    for (i, j) in instance.disease_pairs() {
        let diff = instance.distinguishing_tests(i, j);
        if diff.is_empty() {
            return Err(SolveError::Infeasible { i, j });
        }
        rows.push(LpRow::ge(
            diff.into_iter().map(|k| (k, 1.0)).collect(),
            1.0,
        ));
    }

    log::debug!(
        "formulated {} pair constraints over {} selection variables",
        rows.len(),
        n
    );

    Model::from_rows(instance.costs().to_vec(), vec![true; n], rows)
}
