//! Top-level solve loop: branch-and-bound over the simplex relaxation.

use crate::error::{SolveError, SolveResult};
use crate::instance::Instance;
use crate::model::{formulate, Model, Solution};
use crate::relax::{RelaxStatus, RelaxationBackend, SimplexBackend};
use crate::search::BranchAndBound;
use crate::settings::Settings;

/// Solve a selection instance to proven optimality (budget permitting).
///
/// Formulates the cardinality model and runs branch-and-bound. An
/// indistinguishable disease pair surfaces here as
/// [`SolveError::Infeasible`] before any search happens.
pub fn solve(instance: &Instance, settings: &Settings) -> SolveResult<Solution> {
    let model = formulate(instance)?;
    solve_model(&model, settings)
}

/// Solve an already-formulated model.
///
/// Exposed separately so alternative encodings of the same instance can be
/// run through the identical search for equivalence checks.
pub fn solve_model(model: &Model, settings: &Settings) -> SolveResult<Solution> {
    let mut backend = SimplexBackend::new(settings.lp.clone());
    backend.initialize(model)?;

    let mut tree = BranchAndBound::new(settings.clone(), model.num_vars());
    tree.init_branching(model.objective());

    loop {
        if let Some(status) = tree.check_termination() {
            let solution = tree.finalize(status, model);
            log::debug!(
                "search finished: {:?} after {} nodes, objective {}",
                status,
                solution.nodes_explored,
                solution.objective
            );
            return Ok(solution);
        }

        let node = match tree.next_node() {
            Some(node) => node,
            None => continue, // termination check handles the empty queue
        };

        // The incumbent may have improved since this node was queued.
        if node.can_prune(tree.incumbent.obj_val) {
            tree.node_pruned();
            continue;
        }

        backend.reset_bounds();
        for change in &node.bound_changes {
            backend.set_var_bounds(change.var, change.new_lb, change.new_ub);
        }

        let relax = backend.solve()?;
        tree.node_explored();
        tree.log_progress();

        match relax.status {
            RelaxStatus::Infeasible => {
                tree.node_pruned();
                continue;
            }
            RelaxStatus::Unbounded => {
                // Box-bounded nonnegative minimization cannot be unbounded.
                return Err(SolveError::Internal(
                    "relaxation reported unbounded on a box-bounded model".into(),
                ));
            }
            RelaxStatus::Optimal => {}
        }

        // Tell the branching selector how much this child's fix moved the
        // bound relative to its parent.
        if let Some(info) = node.branch {
            let change = relax.obj_val - node.dual_bound;
            tree.record_branch_outcome(info, change);
        }

        if relax.obj_val >= tree.incumbent.obj_val - 1e-9 {
            tree.node_pruned();
            continue;
        }

        match tree.select_branching(&relax.x, model) {
            None => {
                // Integral vertex: snap the binaries and offer it as the
                // incumbent. The exact objective comes from the rounded
                // point, not the relaxation value.
                let mut x = relax.x;
                for (k, &is_bin) in model.binary().iter().enumerate() {
                    if is_bin {
                        x[k] = x[k].round();
                    }
                }
                let obj = model.objective_value(&x);
                tree.update_incumbent(&x, obj);
            }
            Some(decision) => {
                let mut solved = node;
                solved.dual_bound = relax.obj_val;
                tree.branch(&solved, decision);
            }
        }
    }
}
