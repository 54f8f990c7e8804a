//! Search node representation.

/// A variable fixing imposed by branching.
///
/// Selection variables are binary, so a branch always pins one of them to
/// an endpoint of its `[0, 1]` box.
#[derive(Debug, Clone, Copy)]
pub struct BoundChange {
    /// Variable index.
    pub var: usize,

    /// New lower bound.
    pub new_lb: f64,

    /// New upper bound.
    pub new_ub: f64,
}

impl BoundChange {
    /// Fix a variable to 0 (the "down" branch).
    pub fn fix_zero(var: usize) -> Self {
        Self {
            var,
            new_lb: 0.0,
            new_ub: 0.0,
        }
    }

    /// Fix a variable to 1 (the "up" branch).
    pub fn fix_one(var: usize) -> Self {
        Self {
            var,
            new_lb: 1.0,
            new_ub: 1.0,
        }
    }
}

/// How a node was created, kept for pseudocost bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct BranchInfo {
    /// Variable that was branched on.
    pub var: usize,

    /// Fractional value the variable had in the parent relaxation.
    pub value: f64,

    /// True for the "fix to 1" child.
    pub up: bool,
}

/// A node in the branch-and-bound tree.
///
/// `bound_changes` is the cumulative fixing path from the root, so a node
/// fully describes its subproblem on its own; the frontier is the sole
/// owner of pending nodes.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier.
    pub id: u64,

    /// Parent node ID (None for root).
    pub parent_id: Option<u64>,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// All variable fixings from the root down to this node.
    pub bound_changes: Vec<BoundChange>,

    /// Lower bound on the optimum within this subtree. Inherited from the
    /// parent's relaxation at creation, replaced by this node's own
    /// relaxation once solved.
    pub dual_bound: f64,

    /// Branching step that created this node (None for root).
    pub branch: Option<BranchInfo>,
}

impl SearchNode {
    /// Create the root node.
    pub fn root() -> Self {
        Self {
            id: 0,
            parent_id: None,
            depth: 0,
            bound_changes: Vec::new(),
            dual_bound: f64::NEG_INFINITY,
            branch: None,
        }
    }

    /// Create a child extending this node's fixing path.
    pub fn child(&self, id: u64, change: BoundChange, branch: BranchInfo) -> Self {
        let mut bound_changes = self.bound_changes.clone();
        bound_changes.push(change);
        Self {
            id,
            parent_id: Some(self.id),
            depth: self.depth + 1,
            bound_changes,
            dual_bound: self.dual_bound,
            branch: Some(branch),
        }
    }

    /// Whether this subtree cannot beat the incumbent.
    pub fn can_prune(&self, incumbent_obj: f64) -> bool {
        self.dual_bound >= incumbent_obj - 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let root = SearchNode::root();
        assert_eq!(root.id, 0);
        assert!(root.parent_id.is_none());
        assert_eq!(root.depth, 0);
        assert!(root.bound_changes.is_empty());
        assert!(root.branch.is_none());
    }

    #[test]
    fn test_child_accumulates_path() {
        let root = SearchNode::root();
        let child = root.child(
            1,
            BoundChange::fix_zero(2),
            BranchInfo {
                var: 2,
                value: 0.5,
                up: false,
            },
        );
        let grandchild = child.child(
            2,
            BoundChange::fix_one(0),
            BranchInfo {
                var: 0,
                value: 0.4,
                up: true,
            },
        );

        assert_eq!(grandchild.depth, 2);
        assert_eq!(grandchild.parent_id, Some(1));
        assert_eq!(grandchild.bound_changes.len(), 2);
        assert_eq!(grandchild.bound_changes[0].var, 2);
        assert_eq!(grandchild.bound_changes[0].new_ub, 0.0);
        assert_eq!(grandchild.bound_changes[1].var, 0);
        assert_eq!(grandchild.bound_changes[1].new_lb, 1.0);
    }

    #[test]
    fn test_pruning() {
        let mut node = SearchNode::root();
        node.dual_bound = 10.0;

        assert!(!node.can_prune(15.0));
        assert!(node.can_prune(10.0));
        assert!(node.can_prune(8.0));
    }
}
