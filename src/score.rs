//! Relevance scores and pluggable score combination.

use std::fmt::Debug;

/// A relevance score for one evaluated expression against one document item.
pub type Score = f32;

/// Pluggable strategy for combining the scores of sibling operands.
///
/// Expression nodes never combine scores by direct arithmetic; the
/// combination policy is configurable per query, so all folding goes
/// through this trait. `combine_or` must be associative and commutative
/// for disjunction evaluation to be order-independent — that is a contract
/// on the implementor, not something the evaluator enforces.
pub trait ScoreCombinator: Debug + Send + Sync {
    /// Combine the scores of two disjunctive (or) operands.
    fn combine_or(&self, a: Score, b: Score) -> Score;

    /// Combine the scores of two conjunctive (and) operands.
    fn combine_and(&self, a: Score, b: Score) -> Score;
}

/// Combines scores by taking the maximum for `or` and the minimum for `and`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCombinator;

impl ScoreCombinator for MaxCombinator {
    fn combine_or(&self, a: Score, b: Score) -> Score {
        a.max(b)
    }

    fn combine_and(&self, a: Score, b: Score) -> Score {
        a.min(b)
    }
}

/// Treats scores as independent match probabilities.
///
/// `or` is the probability of either matching (`a + b - a*b`), `and` the
/// probability of both (`a * b`). Inputs are expected in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilisticCombinator;

impl ScoreCombinator for ProbabilisticCombinator {
    fn combine_or(&self, a: Score, b: Score) -> Score {
        a + b - a * b
    }

    fn combine_and(&self, a: Score, b: Score) -> Score {
        a * b
    }
}
