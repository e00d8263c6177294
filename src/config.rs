//! Configuration for query optimization.

use serde::{Deserialize, Serialize};

/// Configuration for the index optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Upper bound on estimated hits below which answering a subtree from
    /// the full-text index is considered profitable. Subtrees whose
    /// estimate exceeds this budget fall back to sequential scanning.
    /// Ties (estimate equal to the budget) go to the index.
    pub selectivity_budget: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            selectivity_budget: 10_000,
        }
    }
}
