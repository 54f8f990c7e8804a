//! Relaxation backend over the two-phase simplex in `select-lp`.

use select_lp::{LpProblem, LpRow, LpSettings, LpStatus, PivotRule};

use super::{RelaxResult, RelaxStatus, RelaxationBackend};
use crate::error::{SolveError, SolveResult};
use crate::model::Model;

/// Simplex-backed bounding engine.
///
/// Rows and objective are extracted from the model once; per-node state is
/// just the bound vectors, so moving between nodes is two `Vec` writes.
pub struct SimplexBackend {
    objective: Vec<f64>,
    rows: Vec<LpRow>,
    var_lb: Vec<f64>,
    var_ub: Vec<f64>,
    settings: LpSettings,
}

impl SimplexBackend {
    /// Create a backend with the given LP settings.
    pub fn new(settings: LpSettings) -> Self {
        Self {
            objective: Vec::new(),
            rows: Vec::new(),
            var_lb: Vec::new(),
            var_ub: Vec::new(),
            settings,
        }
    }

    fn problem(&self) -> LpProblem {
        LpProblem {
            objective: self.objective.clone(),
            rows: self.rows.clone(),
            bounds: self
                .var_lb
                .iter()
                .zip(&self.var_ub)
                .map(|(&lb, &ub)| (lb, ub))
                .collect(),
        }
    }
}

impl RelaxationBackend for SimplexBackend {
    fn initialize(&mut self, model: &Model) -> SolveResult<()> {
        self.objective = model.objective().to_vec();
        self.rows = model.lp_rows();
        self.var_lb = vec![0.0; model.num_vars()];
        self.var_ub = vec![1.0; model.num_vars()];
        Ok(())
    }

    fn reset_bounds(&mut self) {
        self.var_lb.fill(0.0);
        self.var_ub.fill(1.0);
    }

    fn set_var_bounds(&mut self, var: usize, lb: f64, ub: f64) {
        if var < self.var_lb.len() {
            self.var_lb[var] = lb;
            self.var_ub[var] = ub;
        }
    }

    fn solve(&mut self) -> SolveResult<RelaxResult> {
        // A contradictory box never reaches the simplex.
        if self
            .var_lb
            .iter()
            .zip(&self.var_ub)
            .any(|(&lb, &ub)| lb > ub + 1e-9)
        {
            return Ok(RelaxResult::infeasible());
        }

        let prob = self.problem();
        let mut result = select_lp::solve(&prob, &self.settings)
            .map_err(|e| SolveError::Numerical(e.to_string()))?;

        // Dantzig can stall on degenerate vertices; Bland's rule cannot
        // cycle, so one retry settles whether the stall was real.
        if result.status == LpStatus::IterationLimit {
            log::debug!(
                "relaxation stalled after {} pivots, retrying with Bland's rule",
                result.iterations
            );
            let retry_settings = LpSettings {
                pivot_rule: PivotRule::Bland,
                max_iter: self.settings.max_iter.saturating_mul(4),
                ..self.settings.clone()
            };
            result = select_lp::solve(&prob, &retry_settings)
                .map_err(|e| SolveError::Numerical(e.to_string()))?;
        }

        match result.status {
            LpStatus::Optimal => Ok(RelaxResult {
                status: RelaxStatus::Optimal,
                x: result.x,
                obj_val: result.obj_val,
            }),
            LpStatus::Infeasible => Ok(RelaxResult::infeasible()),
            LpStatus::Unbounded => Ok(RelaxResult {
                status: RelaxStatus::Unbounded,
                x: Vec::new(),
                obj_val: f64::NEG_INFINITY,
            }),
            LpStatus::IterationLimit => Err(SolveError::Numerical(format!(
                "simplex failed to converge within {} pivots under both pivot rules",
                result.iterations
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::model::formulate;

    fn backend_for(input: &str) -> SimplexBackend {
        let inst = Instance::parse(input).unwrap();
        let model = formulate(&inst).unwrap();
        let mut backend = SimplexBackend::new(LpSettings::default());
        backend.initialize(&model).unwrap();
        backend
    }

    #[test]
    fn test_root_relaxation() {
        let mut backend = backend_for("3\n2\n1 2 3\n1 0\n1 1\n0 1\n");

        let result = backend.solve().unwrap();
        assert_eq!(result.status, RelaxStatus::Optimal);
        // Cheapest cover of the single pair row {0, 2} is test 0 alone.
        assert!((result.obj_val - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_bound_fixing() {
        let mut backend = backend_for("3\n2\n1 2 3\n1 0\n1 1\n0 1\n");

        // Forbid test 0: the pair must be covered by test 2.
        backend.set_var_bounds(0, 0.0, 0.0);
        let result = backend.solve().unwrap();
        assert_eq!(result.status, RelaxStatus::Optimal);
        assert!((result.obj_val - 3.0).abs() < 1e-8);

        backend.reset_bounds();
        let result = backend.solve().unwrap();
        assert!((result.obj_val - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_contradictory_fixes_prune() {
        let mut backend = backend_for("3\n2\n1 2 3\n1 0\n1 1\n0 1\n");

        backend.set_var_bounds(0, 1.0, 0.0);
        let result = backend.solve().unwrap();
        assert_eq!(result.status, RelaxStatus::Infeasible);
    }

    #[test]
    fn test_node_infeasible() {
        let mut backend = backend_for("3\n2\n1 2 3\n1 0\n1 1\n0 1\n");

        // Forbid both covering tests: the pair row cannot be satisfied.
        backend.set_var_bounds(0, 0.0, 0.0);
        backend.set_var_bounds(2, 0.0, 0.0);
        let result = backend.solve().unwrap();
        assert_eq!(result.status, RelaxStatus::Infeasible);
    }
}
