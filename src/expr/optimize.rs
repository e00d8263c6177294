//! Two-phase compilation driver.
//!
//! Runs the accessibility analysis exactly once per compiled query and,
//! when the tree qualifies, the index-equivalent rewrite exactly once on
//! the same tree with the analysis it produced. Callers substitute the
//! returned expression for the original in the compiled query.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::analyze::{AnalysisOutcome, AnalyzeContext};
use crate::expr::node::FtExpr;

/// How a compiled full-text expression is to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Answer the expression from the full-text index.
    IndexAccess,
    /// Evaluate the expression per document item.
    SequentialScan,
}

/// An expression tree bound to its execution strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedQuery {
    /// The (possibly rewritten) expression tree.
    pub expr: FtExpr,
    /// The chosen execution strategy.
    pub strategy: ExecutionStrategy,
    /// Estimated hit count, when the index path was chosen.
    pub estimated_hits: Option<u64>,
}

/// Decide how to execute `expr` and rewrite it when the index wins.
///
/// The index path is taken when the tree is index-accessible, its result
/// is not negated at the top level, no subtree forced a sequential scan,
/// and the estimated hit count stays within the selectivity budget. Ties
/// go to the index. In every other case the original tree is returned
/// unchanged for per-item evaluation.
pub fn optimize(expr: FtExpr, ctx: &AnalyzeContext) -> Result<OptimizedQuery> {
    match expr.analyze(ctx)? {
        AnalysisOutcome::Accessible(analysis)
            if !analysis.negated
                && !analysis.scan_forced
                && analysis.estimated_hits <= ctx.budget() =>
        {
            let estimated_hits = analysis.estimated_hits;
            log::debug!(
                "rewriting {expr} into an index plan (estimated hits: {estimated_hits})"
            );
            let plan = expr.rewrite(analysis)?;
            Ok(OptimizedQuery {
                expr: plan,
                strategy: ExecutionStrategy::IndexAccess,
                estimated_hits: Some(estimated_hits),
            })
        }
        outcome => {
            log::debug!(
                "full-text index not applicable to {expr} (accessible: {}, scan forced: {}), \
                 falling back to sequential scan",
                outcome.is_accessible(),
                outcome.scan_forced()
            );
            Ok(OptimizedQuery {
                expr,
                strategy: ExecutionStrategy::SequentialScan,
                estimated_hits: None,
            })
        }
    }
}
