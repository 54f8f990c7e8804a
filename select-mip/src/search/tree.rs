//! Branch-and-bound tree controller.
//!
//! Owns the node queue, the branching selector, and the incumbent: the
//! driver in `solver.rs` pushes relaxation results through it and it
//! answers with pruning and termination decisions.

use std::time::Instant;

use super::{BoundChange, BranchDecision, BranchInfo, BranchingSelector, NodeQueue, SearchNode};
use crate::model::{IncumbentTracker, Model, Solution, SolveStatus};
use crate::settings::Settings;

/// Branch-and-bound tree controller.
pub struct BranchAndBound {
    queue: NodeQueue,
    branching: BranchingSelector,

    /// Incumbent solution tracker; the only incumbent state in the solver.
    pub incumbent: IncumbentTracker,

    next_node_id: u64,
    nodes_explored: u64,
    nodes_pruned: u64,
    start_time: Instant,
    settings: Settings,
}

impl BranchAndBound {
    /// Create a controller and enqueue the root node.
    pub fn new(settings: Settings, num_vars: usize) -> Self {
        let mut tree = Self {
            queue: NodeQueue::new(settings.node_selection),
            branching: BranchingSelector::new(settings.branching_rule, num_vars),
            incumbent: IncumbentTracker::new(),
            next_node_id: 1, // 0 reserved for root
            nodes_explored: 0,
            nodes_pruned: 0,
            start_time: Instant::now(),
            settings,
        };
        tree.queue.push(SearchNode::root());
        tree
    }

    /// Seed branching pseudocosts from the objective.
    pub fn init_branching(&mut self, costs: &[f64]) {
        self.branching.init_from_objective(costs);
    }

    /// Take the next node to process.
    pub fn next_node(&mut self) -> Option<SearchNode> {
        self.queue.pop()
    }

    /// Record that a node's relaxation was solved.
    pub fn node_explored(&mut self) {
        self.nodes_explored += 1;
    }

    /// Record that a node was discarded without branching.
    pub fn node_pruned(&mut self) {
        self.nodes_pruned += 1;
    }

    /// Pick a branching variable for a fractional point.
    pub fn select_branching(&self, x: &[f64], model: &Model) -> Option<BranchDecision> {
        self.branching.select(x, model, self.settings.int_feas_tol)
    }

    /// Feed an observed child bound improvement back to the selector.
    pub fn record_branch_outcome(&mut self, info: BranchInfo, obj_change: f64) {
        self.branching
            .update_pseudocosts(info.var, info.value, info.up, obj_change);
    }

    /// Create and enqueue both children of a branching decision.
    pub fn branch(&mut self, parent: &SearchNode, decision: BranchDecision) {
        let down_id = self.next_node_id;
        let up_id = self.next_node_id + 1;
        self.next_node_id += 2;

        let down = parent.child(
            down_id,
            BoundChange::fix_zero(decision.var),
            BranchInfo {
                var: decision.var,
                value: decision.value,
                up: false,
            },
        );
        let up = parent.child(
            up_id,
            BoundChange::fix_one(decision.var),
            BranchInfo {
                var: decision.var,
                value: decision.value,
                up: true,
            },
        );

        self.queue.push(down);
        self.queue.push(up);
    }

    /// Offer a new integer solution; prunes dominated open nodes when it
    /// improves the incumbent. Returns true on improvement.
    pub fn update_incumbent(&mut self, x: &[f64], obj: f64) -> bool {
        let improved = self.incumbent.update(x, obj);
        if improved {
            let pruned = self.queue.prune_by_bound(obj);
            self.nodes_pruned += pruned as u64;
            if self.settings.verbose {
                log::info!("new incumbent: obj={obj:.6}, pruned {pruned} open nodes");
            }
        }
        improved
    }

    /// Elapsed wall-clock time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Check termination; Some(status) means stop now.
    ///
    /// Optimality is claimed only when the frontier is exhausted; budget
    /// statuses are reported as such so a limited run can never pass
    /// itself off as proven.
    pub fn check_termination(&self) -> Option<SolveStatus> {
        if let Some(limit) = self.settings.time_limit_ms {
            if self.elapsed_ms() >= limit {
                return Some(SolveStatus::TimeLimit);
            }
        }

        if self.nodes_explored >= self.settings.max_nodes {
            return Some(SolveStatus::NodeLimit);
        }

        if self.queue.is_empty() {
            return Some(if self.incumbent.has_incumbent() {
                SolveStatus::Optimal
            } else {
                SolveStatus::Infeasible
            });
        }

        None
    }

    /// Assemble the final solution.
    ///
    /// The objective is recomputed as the exact cost sum over the selected
    /// binaries, not the relaxation value that produced the incumbent.
    pub fn finalize(&self, status: SolveStatus, model: &Model) -> Solution {
        let x = self.incumbent.solution.clone().unwrap_or_default();
        let selected: Vec<usize> = model
            .binary()
            .iter()
            .enumerate()
            .filter(|&(k, &is_bin)| is_bin && x.get(k).copied().unwrap_or(0.0) > 0.5)
            .map(|(k, _)| k)
            .collect();
        let objective = if x.is_empty() {
            f64::INFINITY
        } else {
            selected.iter().map(|&k| model.objective()[k]).sum()
        };

        Solution {
            status,
            objective,
            selected,
            x,
            bound: self.queue.best_bound().min(self.incumbent.obj_val),
            nodes_explored: self.nodes_explored,
            solve_time_ms: self.elapsed_ms(),
            incumbent_updates: self.incumbent.update_count,
        }
    }

    /// Periodic progress line (verbose runs only).
    pub fn log_progress(&self) {
        if !self.settings.verbose || self.nodes_explored % self.settings.log_freq != 0 {
            return;
        }
        log::info!(
            "nodes: {} ({} open, {} pruned) | bound: {:.6} | incumbent: {:.6} | time: {:.1}s",
            self.nodes_explored,
            self.queue.len(),
            self.nodes_pruned,
            self.queue.best_bound(),
            self.incumbent.obj_val,
            self.elapsed_ms() as f64 / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::model::formulate;
    use select_lp::LpRow;

    fn unit_model(num_vars: usize) -> Model {
        Model::from_rows(
            vec![1.0; num_vars],
            vec![true; num_vars],
            vec![LpRow::ge((0..num_vars).map(|k| (k, 1.0)).collect(), 1.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_root_is_enqueued() {
        let mut tree = BranchAndBound::new(Settings::default(), 3);
        let root = tree.next_node().unwrap();
        assert_eq!(root.id, 0);
        assert!(tree.next_node().is_none());
    }

    #[test]
    fn test_incumbent_updates_prune_queue() {
        let mut tree = BranchAndBound::new(Settings::default(), 2);
        let root = tree.next_node().unwrap();

        let mut expensive = root.clone();
        expensive.id = 7;
        expensive.dual_bound = 50.0;
        tree.queue.push(expensive);

        assert!(tree.update_incumbent(&[1.0, 1.0], 40.0));
        // The queued node with bound 50 is dominated and gone.
        assert!(tree.next_node().is_none());

        assert!(!tree.update_incumbent(&[1.0, 0.0], 45.0));
        assert!(tree.update_incumbent(&[1.0, 0.0], 30.0));
        assert_eq!(tree.incumbent.obj_val, 30.0);
    }

    #[test]
    fn test_termination_states() {
        let mut tree = BranchAndBound::new(Settings::default().with_max_nodes(2), 2);

        // Queue holds the root: keep going.
        assert!(tree.check_termination().is_none());

        tree.node_explored();
        tree.node_explored();
        assert_eq!(tree.check_termination(), Some(SolveStatus::NodeLimit));
    }

    #[test]
    fn test_empty_queue_without_incumbent_is_infeasible() {
        let mut tree = BranchAndBound::new(Settings::default(), 2);
        tree.next_node();
        assert_eq!(tree.check_termination(), Some(SolveStatus::Infeasible));
    }

    #[test]
    fn test_branch_creates_two_children() {
        let mut tree = BranchAndBound::new(Settings::default(), 3);
        let mut root = tree.next_node().unwrap();
        root.dual_bound = 1.5;

        tree.branch(&root, BranchDecision { var: 1, value: 0.5 });

        let first = tree.next_node().unwrap();
        let second = tree.next_node().unwrap();
        assert!(tree.next_node().is_none());

        for child in [&first, &second] {
            assert_eq!(child.parent_id, Some(0));
            assert_eq!(child.depth, 1);
            assert_eq!(child.bound_changes.len(), 1);
            assert_eq!(child.bound_changes[0].var, 1);
            assert_eq!(child.dual_bound, 1.5);
        }
    }

    #[test]
    fn test_finalize_recomputes_exact_objective() {
        let inst = Instance::parse("3\n2\n0.1 0.2 0.3\n1 0\n1 1\n0 1\n").unwrap();
        let model = formulate(&inst).unwrap();

        let mut tree = BranchAndBound::new(Settings::default(), 3);
        tree.next_node();
        // Incumbent with slightly noisy relaxation values.
        tree.update_incumbent(&[0.9999999, 0.0, 1.0000001], 0.4000001);

        let sol = tree.finalize(SolveStatus::Optimal, &model);
        assert_eq!(sol.selected, vec![0, 2]);
        assert_eq!(sol.objective, 0.1 + 0.3);
        assert_eq!(sol.status_tag(), "OPT");
    }

    #[test]
    fn test_finalize_without_incumbent() {
        let model = unit_model(2);
        let tree = BranchAndBound::new(Settings::default(), 2);

        let sol = tree.finalize(SolveStatus::NodeLimit, &model);
        assert!(!sol.has_solution());
        assert!(sol.selected.is_empty());
        assert_eq!(sol.objective, f64::INFINITY);
        assert_eq!(sol.status_tag(), "UNKNOWN");
    }
}
