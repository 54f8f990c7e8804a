//! Solution and incumbent types.

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimality proven: the search frontier was exhausted.
    Optimal,

    /// The search exhausted the frontier without ever finding an integer
    /// solution.
    Infeasible,

    /// Node budget hit; the incumbent (if any) is best-effort, unproven.
    NodeLimit,

    /// Wall-clock budget hit; the incumbent (if any) is best-effort,
    /// unproven.
    TimeLimit,
}

impl SolveStatus {
    /// Whether optimality was proven. Budget-limited runs never count,
    /// no matter how good the incumbent.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Result of solving a selection instance or model.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solve status.
    pub status: SolveStatus,

    /// Objective of the best solution found: the exact sum of the selected
    /// test costs (infinity when no solution was found).
    pub objective: f64,

    /// Indices of the selected binary variables (tests), ascending.
    pub selected: Vec<usize>,

    /// Full variable assignment of the best solution (empty when none).
    pub x: Vec<f64>,

    /// Best lower bound on the optimum across the remaining frontier.
    pub bound: f64,

    /// Nodes whose relaxation was solved.
    pub nodes_explored: u64,

    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,

    /// How many times the incumbent improved.
    pub incumbent_updates: u64,
}

impl Solution {
    /// Whether a feasible integer solution is available.
    pub fn has_solution(&self) -> bool {
        !self.x.is_empty()
    }

    /// Reporting tag: `"OPT"` only when optimality is proven.
    pub fn status_tag(&self) -> &'static str {
        match self.status {
            SolveStatus::Optimal => "OPT",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::NodeLimit | SolveStatus::TimeLimit => {
                if self.has_solution() {
                    "BEST_FOUND"
                } else {
                    "UNKNOWN"
                }
            }
        }
    }
}

/// Best integer-feasible solution found so far.
///
/// Owned by the tree controller; the single place incumbent state lives.
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best assignment, if any.
    pub solution: Option<Vec<f64>>,

    /// Objective of the incumbent; +inf before the first one.
    pub obj_val: f64,

    /// Number of improvements.
    pub update_count: u64,
}

impl Default for IncumbentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IncumbentTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            solution: None,
            obj_val: f64::INFINITY,
            update_count: 0,
        }
    }

    /// Whether an incumbent exists.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// Accept a solution only when it strictly improves the incumbent.
    ///
    /// Returns true on improvement.
    pub fn update(&mut self, x: &[f64], obj: f64) -> bool {
        if obj < self.obj_val - 1e-9 {
            self.solution = Some(x.to_vec());
            self.obj_val = obj;
            self.update_count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incumbent_tracker() {
        let mut tracker = IncumbentTracker::new();
        assert!(!tracker.has_incumbent());
        assert_eq!(tracker.obj_val, f64::INFINITY);

        assert!(tracker.update(&[1.0, 0.0], 10.0));
        assert_eq!(tracker.obj_val, 10.0);

        // Worse and equal solutions rejected.
        assert!(!tracker.update(&[0.0, 1.0], 15.0));
        assert!(!tracker.update(&[0.0, 1.0], 10.0));
        assert_eq!(tracker.update_count, 1);

        assert!(tracker.update(&[0.0, 0.0], 5.0));
        assert_eq!(tracker.obj_val, 5.0);
        assert_eq!(tracker.update_count, 2);
    }

    #[test]
    fn test_status_tags() {
        let mut sol = Solution {
            status: SolveStatus::Optimal,
            objective: 2.0,
            selected: vec![0, 2],
            x: vec![1.0, 0.0, 1.0],
            bound: 2.0,
            nodes_explored: 3,
            solve_time_ms: 1,
            incumbent_updates: 1,
        };
        assert_eq!(sol.status_tag(), "OPT");
        assert!(sol.status.is_optimal());

        sol.status = SolveStatus::NodeLimit;
        assert_eq!(sol.status_tag(), "BEST_FOUND");
        assert!(!sol.status.is_optimal());

        sol.x.clear();
        assert_eq!(sol.status_tag(), "UNKNOWN");

        sol.status = SolveStatus::Infeasible;
        assert_eq!(sol.status_tag(), "INFEASIBLE");
    }
}
