//! Node priority queue for tree exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SearchNode;
use crate::settings::NodeSelection;

/// Entry in the node queue with precomputed priority.
struct QueuedNode {
    node: SearchNode,
    priority: f64, // Higher = selected first
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .partial_cmp(&other.priority)
            .unwrap_or(Ordering::Equal)
    }
}

/// Priority queue over open search nodes.
pub struct NodeQueue {
    strategy: NodeSelection,
    heap: BinaryHeap<QueuedNode>,
    nodes_popped: u64,

    /// Lowest dual bound among queued nodes; +inf when empty.
    best_bound: f64,
}

impl NodeQueue {
    /// Create a queue with the given selection strategy.
    pub fn new(strategy: NodeSelection) -> Self {
        Self {
            strategy,
            heap: BinaryHeap::new(),
            nodes_popped: 0,
            best_bound: f64::INFINITY,
        }
    }

    /// Add a node.
    pub fn push(&mut self, node: SearchNode) {
        let priority = self.compute_priority(&node);
        self.best_bound = self.best_bound.min(node.dual_bound);
        self.heap.push(QueuedNode { node, priority });
    }

    /// Take the next node to process.
    pub fn pop(&mut self) -> Option<SearchNode> {
        let queued = self.heap.pop()?;
        self.nodes_popped += 1;
        self.recompute_best_bound();
        Some(queued.node)
    }

    /// Lowest dual bound across all open nodes (+inf when none remain).
    pub fn best_bound(&self) -> f64 {
        self.best_bound
    }

    /// Drop every node dominated by the incumbent; returns how many.
    pub fn prune_by_bound(&mut self, incumbent_obj: f64) -> usize {
        let before = self.heap.len();

        let remaining: Vec<QueuedNode> = self
            .heap
            .drain()
            .filter(|q| !q.node.can_prune(incumbent_obj))
            .collect();
        self.heap = remaining.into_iter().collect();
        self.recompute_best_bound();

        before - self.heap.len()
    }

    /// Whether the frontier is exhausted.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of open nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    fn compute_priority(&self, node: &SearchNode) -> f64 {
        match self.strategy {
            // Lowest dual bound first (negate for the max-heap).
            NodeSelection::BestBound => -node.dual_bound,
            // Deepest first: dives toward integer solutions.
            NodeSelection::DepthFirst => node.depth as f64,
            NodeSelection::Hybrid { dive_freq } => {
                if self.nodes_popped % (dive_freq.max(1) as u64) == 0 {
                    node.depth as f64
                } else {
                    -node.dual_bound
                }
            }
        }
    }

    fn recompute_best_bound(&mut self) {
        self.best_bound = self
            .heap
            .iter()
            .map(|q| q.node.dual_bound)
            .fold(f64::INFINITY, f64::min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_bound(id: u64, bound: f64) -> SearchNode {
        let mut node = SearchNode::root();
        node.id = id;
        node.dual_bound = bound;
        node
    }

    #[test]
    fn test_best_bound_selection() {
        let mut queue = NodeQueue::new(NodeSelection::BestBound);
        queue.push(node_with_bound(1, 10.0));
        queue.push(node_with_bound(2, 5.0));
        queue.push(node_with_bound(3, 15.0));

        assert_eq!(queue.best_bound(), 5.0);
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 1);
        assert_eq!(queue.pop().unwrap().id, 3);
        assert!(queue.is_empty());
        assert_eq!(queue.best_bound(), f64::INFINITY);
    }

    #[test]
    fn test_depth_first_selection() {
        let mut queue = NodeQueue::new(NodeSelection::DepthFirst);

        let mut shallow = node_with_bound(1, 0.0);
        shallow.depth = 0;
        let mut deep = node_with_bound(2, 0.0);
        deep.depth = 2;
        let mut mid = node_with_bound(3, 0.0);
        mid.depth = 1;

        queue.push(shallow);
        queue.push(deep);
        queue.push(mid);

        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 1);
    }

    #[test]
    fn test_prune_by_bound() {
        let mut queue = NodeQueue::new(NodeSelection::BestBound);
        for i in 0..5 {
            queue.push(node_with_bound(i, i as f64 * 10.0));
        }

        // Nodes with bound 30 and 40 cannot beat an incumbent of 25.
        let pruned = queue.prune_by_bound(25.0);
        assert_eq!(pruned, 2);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.best_bound(), 0.0);
    }
}
