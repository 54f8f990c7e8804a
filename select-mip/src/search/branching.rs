//! Branching variable selection.

use crate::model::Model;
use crate::settings::BranchingRule;

/// A branching decision on one fractional variable.
#[derive(Debug, Clone, Copy)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,

    /// Its fractional value in the node relaxation.
    pub value: f64,
}

/// Branching variable selector.
pub struct BranchingSelector {
    rule: BranchingRule,

    /// Average objective change per unit of fractionality, per direction.
    pseudocosts_down: Vec<f64>,
    pseudocosts_up: Vec<f64>,
    branch_count_down: Vec<u64>,
    branch_count_up: Vec<u64>,
}

impl BranchingSelector {
    /// Create a selector for `num_vars` variables.
    pub fn new(rule: BranchingRule, num_vars: usize) -> Self {
        Self {
            rule,
            pseudocosts_down: vec![1.0; num_vars],
            pseudocosts_up: vec![1.0; num_vars],
            branch_count_down: vec![0; num_vars],
            branch_count_up: vec![0; num_vars],
        }
    }

    /// Seed pseudocosts from objective coefficients, so the first
    /// pseudocost picks are not uniform guesses.
    pub fn init_from_objective(&mut self, costs: &[f64]) {
        for (i, &ci) in costs.iter().enumerate() {
            if i < self.pseudocosts_down.len() {
                let init = ci.abs().max(0.1);
                self.pseudocosts_down[i] = init;
                self.pseudocosts_up[i] = init;
            }
        }
    }

    /// Pick a branching variable, or None when the point is integral.
    pub fn select(&self, x: &[f64], model: &Model, tol: f64) -> Option<BranchDecision> {
        let fractional = model.fractional_vars(x, tol);
        if fractional.is_empty() {
            return None;
        }

        match self.rule {
            BranchingRule::MostFractional => {
                // Closest to 0.5; lowest index on ties (max_by keeps the
                // last maximum, so scan from the back).
                fractional
                    .iter()
                    .rev()
                    .max_by(|(_, _, f1), (_, _, f2)| f1.total_cmp(f2))
                    .map(|&(var, value, _)| BranchDecision { var, value })
            }
            BranchingRule::Pseudocost => fractional
                .iter()
                .rev()
                .map(|&(var, value, _)| (var, value, self.pseudocost_score(var, value)))
                .max_by(|(_, _, s1), (_, _, s2)| s1.total_cmp(s2))
                .map(|(var, value, _)| BranchDecision { var, value }),
        }
    }

    /// Record the observed bound change of a solved child.
    pub fn update_pseudocosts(&mut self, var: usize, value: f64, up: bool, obj_change: f64) {
        if var >= self.pseudocosts_down.len() || obj_change <= 0.0 || !obj_change.is_finite() {
            return;
        }
        let frac = value - value.floor();
        if up {
            let dist = 1.0 - frac;
            if dist > 1e-6 {
                let pc = obj_change / dist;
                let count = self.branch_count_up[var] as f64;
                self.pseudocosts_up[var] = (self.pseudocosts_up[var] * count + pc) / (count + 1.0);
                self.branch_count_up[var] += 1;
            }
        } else if frac > 1e-6 {
            let pc = obj_change / frac;
            let count = self.branch_count_down[var] as f64;
            self.pseudocosts_down[var] = (self.pseudocosts_down[var] * count + pc) / (count + 1.0);
            self.branch_count_down[var] += 1;
        }
    }

    /// Product score: prefers variables promising improvement in both
    /// directions.
    fn pseudocost_score(&self, var: usize, value: f64) -> f64 {
        let frac = value - value.floor();
        let down = frac * self.pseudocosts_down[var];
        let up = (1.0 - frac) * self.pseudocosts_up[var];
        (down * up).max(1e-10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::model::formulate;

    fn three_var_model() -> Model {
        let inst = Instance::parse("3\n3\n1 1 1\n1 0 0\n0 1 0\n0 0 1\n").unwrap();
        formulate(&inst).unwrap()
    }

    #[test]
    fn test_most_fractional() {
        let model = three_var_model();
        let selector = BranchingSelector::new(BranchingRule::MostFractional, 3);

        let decision = selector.select(&[0.3, 0.5, 1.0], &model, 1e-6).unwrap();
        assert_eq!(decision.var, 1);
        assert_eq!(decision.value, 0.5);
    }

    #[test]
    fn test_most_fractional_tie_breaks_low_index() {
        let model = three_var_model();
        let selector = BranchingSelector::new(BranchingRule::MostFractional, 3);

        let decision = selector.select(&[0.5, 0.5, 0.0], &model, 1e-6).unwrap();
        assert_eq!(decision.var, 0);
    }

    #[test]
    fn test_integral_point_yields_none() {
        let model = three_var_model();
        let selector = BranchingSelector::new(BranchingRule::MostFractional, 3);

        assert!(selector.select(&[1.0, 0.0, 1.0], &model, 1e-6).is_none());
    }

    #[test]
    fn test_pseudocost_learning() {
        let model = three_var_model();
        let mut selector = BranchingSelector::new(BranchingRule::Pseudocost, 3);

        // Teach the selector that branching up on variable 2 moves the
        // bound a lot.
        selector.update_pseudocosts(2, 0.5, true, 10.0);
        selector.update_pseudocosts(2, 0.5, false, 10.0);

        let decision = selector.select(&[0.5, 0.5, 0.5], &model, 1e-6).unwrap();
        assert_eq!(decision.var, 2);
    }
}
