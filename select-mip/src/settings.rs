//! Configuration settings for the selection solver.

use select_lp::LpSettings;

/// Branching variable selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// Select the variable with fractional part closest to 0.5.
    #[default]
    MostFractional,

    /// Use pseudocost estimates learned from earlier branches.
    Pseudocost,
}

/// Node selection strategy for the search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Always take the node with the best (lowest) dual bound.
    #[default]
    BestBound,

    /// Depth-first: finds feasible solutions quickly.
    DepthFirst,

    /// Alternate between diving and best-bound.
    Hybrid {
        /// Dive every N pops.
        dive_freq: usize,
    },
}

/// Solver settings.
///
/// The defaults solve any reasonably sized instance to proven optimality;
/// the budgets exist so a runaway instance degrades to a best-effort
/// answer instead of hanging.
#[derive(Debug, Clone)]
pub struct Settings {
    // === Termination budgets ===
    /// Maximum number of nodes to explore.
    pub max_nodes: u64,

    /// Wall-clock limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    // === Tolerances ===
    /// Integer feasibility tolerance: a variable counts as integral when
    /// `|x - round(x)| <= int_feas_tol`.
    pub int_feas_tol: f64,

    // === Search strategy ===
    /// Branching variable selection rule.
    pub branching_rule: BranchingRule,

    /// Node selection strategy.
    pub node_selection: NodeSelection,

    // === Relaxation engine ===
    /// Settings for the simplex relaxation solves.
    pub lp: LpSettings,

    // === Output ===
    /// Emit progress log lines during the search.
    pub verbose: bool,

    /// Log every N explored nodes.
    pub log_freq: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            time_limit_ms: None,
            int_feas_tol: 1e-6,
            branching_rule: BranchingRule::default(),
            node_selection: NodeSelection::default(),
            lp: LpSettings::default(),
            verbose: false,
            log_freq: 100,
        }
    }
}

impl Settings {
    /// Set the wall-clock limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the node budget.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }
}
