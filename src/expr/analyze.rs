//! Index-accessibility analysis.
//!
//! A bottom-up pass deciding, per node, whether the full-text index can
//! answer it, what the result cardinality is expected to be, and whether
//! the node's logical polarity is index-representable. The pass returns an
//! explicit [`Analysis`] tree that [`rewrite`](crate::expr::node::FtExpr::rewrite)
//! later consumes by value; no state is cached on the nodes themselves,
//! and each child reports its own polarity instead of toggling a shared
//! traversal flag, so polarity cannot leak between siblings.

use crate::config::OptimizerConfig;
use crate::error::{Result, TiliaError};
use crate::expr::node::FtExpr;
use crate::index::SelectivityEstimator;

/// Traversal context for one analysis pass.
///
/// Owned exclusively by a single query compilation; never shared across
/// concurrently compiling queries.
#[derive(Debug)]
pub struct AnalyzeContext<'a> {
    budget: u64,
    estimator: &'a dyn SelectivityEstimator,
}

impl<'a> AnalyzeContext<'a> {
    /// Create an analysis context from the optimizer configuration.
    pub fn new(config: &OptimizerConfig, estimator: &'a dyn SelectivityEstimator) -> Self {
        AnalyzeContext {
            budget: config.selectivity_budget,
            estimator,
        }
    }

    /// The selectivity budget: the hit-count ceiling below which index
    /// use is considered profitable.
    pub fn budget(&self) -> u64 {
        self.budget
    }
}

/// Analysis result for one index-accessible node.
///
/// Produced by [`FtExpr::analyze`], consumed exactly once by
/// [`FtExpr::rewrite`](crate::expr::node::FtExpr::rewrite). `children`
/// mirrors the node's child list one to one, so the rewriter can recurse
/// without re-analyzing; `positive`/`negative` hold child indices
/// partitioned by polarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Upper bound on the number of index hits for this subtree.
    pub estimated_hits: u64,
    /// Whether this subtree forces the surrounding query into a
    /// sequential scan even though it is index-representable.
    pub scan_forced: bool,
    /// Whether the subtree's result is logically negated; the enclosing
    /// operator decides what to make of it.
    pub negated: bool,
    /// Indices of index-positive children, in child order.
    pub positive: Vec<usize>,
    /// Indices of index-accessible but negated children, in child order.
    pub negative: Vec<usize>,
    /// Analyses of all children, in child order.
    pub children: Vec<Analysis>,
}

impl Analysis {
    fn leaf(estimated_hits: u64) -> Self {
        Analysis {
            estimated_hits,
            scan_forced: false,
            negated: false,
            positive: Vec::new(),
            negative: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Outcome of analyzing one node.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The subtree can be answered from the full-text index.
    Accessible(Analysis),
    /// The subtree can only be answered by scanning document content.
    ///
    /// `scan_forced` distinguishes the deliberate fallback cases (mixed
    /// polarity, unbounded negation) from a plain "no index answer".
    SequentialOnly {
        /// Whether the fallback was forced by an unsupported combination.
        scan_forced: bool,
    },
}

impl AnalysisOutcome {
    /// Whether the analyzed subtree is index-accessible.
    pub fn is_accessible(&self) -> bool {
        matches!(self, AnalysisOutcome::Accessible(_))
    }

    /// Whether the analysis forced a sequential scan.
    pub fn scan_forced(&self) -> bool {
        match self {
            AnalysisOutcome::Accessible(analysis) => analysis.scan_forced,
            AnalysisOutcome::SequentialOnly { scan_forced } => *scan_forced,
        }
    }

    /// The analysis, if the subtree was accessible.
    pub fn into_analysis(self) -> Option<Analysis> {
        match self {
            AnalysisOutcome::Accessible(analysis) => Some(analysis),
            AnalysisOutcome::SequentialOnly { .. } => None,
        }
    }
}

/// Child analyses partitioned by polarity.
struct Partition {
    positive: Vec<usize>,
    negative: Vec<usize>,
    children: Vec<Analysis>,
    /// Saturating sum of positive children's estimates.
    positive_sum: u64,
    /// Minimum of positive children's estimates.
    positive_min: u64,
    /// Whether any child forced a sequential scan; the flag is sticky
    /// through the whole traversal.
    scan_forced: bool,
}

/// Walk the children of an n-ary operator, partitioning them by polarity.
///
/// Returns `Err(outcome)` with the short-circuit result when a child is
/// not accessible or a negated child has no bounded hit estimate. With
/// `keep_empty_positives` unset (disjunctions), positive children with a
/// zero estimate contribute nothing to the union and are left out of both
/// partitions; conjunctions keep them, since an intersection must cover
/// every operand.
fn partition_children(
    operands: &[FtExpr],
    ctx: &AnalyzeContext,
    keep_empty_positives: bool,
) -> Result<std::result::Result<Partition, AnalysisOutcome>> {
    let mut partition = Partition {
        positive: Vec::new(),
        negative: Vec::new(),
        children: Vec::with_capacity(operands.len()),
        positive_sum: 0,
        positive_min: u64::MAX,
        scan_forced: false,
    };
    for (i, operand) in operands.iter().enumerate() {
        let analysis = match operand.analyze(ctx)? {
            AnalysisOutcome::Accessible(analysis) => analysis,
            sequential @ AnalysisOutcome::SequentialOnly { .. } => {
                return Ok(Err(sequential));
            }
        };
        partition.scan_forced |= analysis.scan_forced;
        if analysis.negated {
            if analysis.estimated_hits == 0 {
                // Negation of a provably empty subtree matches everything;
                // no bounded index answer exists.
                return Ok(Err(AnalysisOutcome::SequentialOnly { scan_forced: true }));
            }
            partition.negative.push(i);
        } else if analysis.estimated_hits > 0 || keep_empty_positives {
            partition.positive.push(i);
            partition.positive_sum = partition.positive_sum.saturating_add(analysis.estimated_hits);
            partition.positive_min = partition.positive_min.min(analysis.estimated_hits);
        }
        partition.children.push(analysis);
    }
    Ok(Ok(partition))
}

impl FtExpr {
    /// Decide whether this subtree can be answered from the full-text
    /// index, estimating result cardinality along the way.
    ///
    /// Estimates are upper bounds and saturate instead of overflowing.
    /// The returned [`Analysis`] must be handed to
    /// [`rewrite`](FtExpr::rewrite) unmodified and at most once; re-running
    /// this pass is the only way to obtain a fresh one.
    pub fn analyze(&self, ctx: &AnalyzeContext) -> Result<AnalysisOutcome> {
        match self {
            FtExpr::Word { terms } => {
                if terms.is_empty() {
                    return Err(TiliaError::protocol("word expression has no terms"));
                }
                let mut estimate = 0u64;
                for term in terms {
                    estimate = estimate.saturating_add(ctx.estimator.cardinality(term)?);
                }
                Ok(AnalysisOutcome::Accessible(Analysis::leaf(estimate)))
            }
            FtExpr::Not(operand) => match operand.analyze(ctx)? {
                AnalysisOutcome::Accessible(child) => {
                    Ok(AnalysisOutcome::Accessible(Analysis {
                        estimated_hits: child.estimated_hits,
                        scan_forced: child.scan_forced,
                        negated: !child.negated,
                        positive: Vec::new(),
                        negative: Vec::new(),
                        children: vec![child],
                    }))
                }
                sequential => Ok(sequential),
            },
            FtExpr::Or(operands) => {
                if operands.is_empty() {
                    return Err(TiliaError::protocol("ftor requires at least one operand"));
                }
                let partition = match partition_children(operands, ctx, false)? {
                    Ok(partition) => partition,
                    Err(outcome) => return Ok(outcome),
                };
                if !partition.positive.is_empty() && !partition.negative.is_empty() {
                    // Mixed polarity under a disjunction would need DNF/CNF
                    // normalization, which is not attempted.
                    log::debug!("mixed-polarity disjunction forces a sequential scan");
                    return Ok(AnalysisOutcome::SequentialOnly { scan_forced: true });
                }
                if partition.positive.is_empty() && !partition.negative.is_empty() {
                    // Purely negated disjunction: index-representable via
                    // De Morgan, but unbounded at this level. The caller
                    // above decides further.
                    return Ok(AnalysisOutcome::Accessible(Analysis {
                        estimated_hits: u64::MAX,
                        scan_forced: true,
                        negated: true,
                        positive: partition.positive,
                        negative: partition.negative,
                        children: partition.children,
                    }));
                }
                Ok(AnalysisOutcome::Accessible(Analysis {
                    estimated_hits: partition.positive_sum.min(ctx.budget),
                    scan_forced: partition.scan_forced,
                    negated: false,
                    positive: partition.positive,
                    negative: partition.negative,
                    children: partition.children,
                }))
            }
            FtExpr::And(operands) => {
                if operands.is_empty() {
                    return Err(TiliaError::protocol("ftand requires at least one operand"));
                }
                let partition = match partition_children(operands, ctx, true)? {
                    Ok(partition) => partition,
                    Err(outcome) => return Ok(outcome),
                };
                if partition.positive.is_empty() {
                    // Purely negated conjunction: same shape as the
                    // purely negated disjunction above.
                    return Ok(AnalysisOutcome::Accessible(Analysis {
                        estimated_hits: u64::MAX,
                        scan_forced: true,
                        negated: true,
                        positive: partition.positive,
                        negative: partition.negative,
                        children: partition.children,
                    }));
                }
                // Mixed polarity is fine for a conjunction: the index can
                // subtract negated operands from the positive ones. The
                // intersection is bounded by its cheapest operand.
                Ok(AnalysisOutcome::Accessible(Analysis {
                    estimated_hits: partition.positive_min,
                    scan_forced: partition.scan_forced,
                    negated: false,
                    positive: partition.positive,
                    negative: partition.negative,
                    children: partition.children,
                }))
            }
            FtExpr::Union(_) | FtExpr::Intersection(_) | FtExpr::NotIndex(_) => Err(
                TiliaError::protocol("index plan nodes cannot be re-analyzed"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    fn fixture() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.insert("apple", 1, &[1, 5]);
        index.insert("apple", 2, &[0]);
        index.insert("banana", 1, &[3]);
        index
    }

    fn context(index: &MemoryIndex, budget: u64) -> AnalyzeContext<'_> {
        AnalyzeContext::new(
            &OptimizerConfig {
                selectivity_budget: budget,
            },
            index,
        )
    }

    #[test]
    fn test_word_estimate_sums_terms() {
        let index = fixture();
        let ctx = context(&index, 100);

        let outcome = FtExpr::words(["apple", "banana"]).analyze(&ctx).unwrap();
        let analysis = outcome.into_analysis().unwrap();
        assert_eq!(analysis.estimated_hits, 4);
        assert!(!analysis.negated);
    }

    #[test]
    fn test_or_estimate_is_capped_by_budget() {
        let index = fixture();

        let expr = FtExpr::or([FtExpr::word("apple"), FtExpr::word("banana")]);

        let roomy = expr.analyze(&context(&index, 100)).unwrap();
        assert_eq!(roomy.into_analysis().unwrap().estimated_hits, 4);

        let tight = expr.analyze(&context(&index, 2)).unwrap();
        assert_eq!(tight.into_analysis().unwrap().estimated_hits, 2);
    }

    #[test]
    fn test_or_partitions_children() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::or([
            FtExpr::not(FtExpr::word("apple")),
            FtExpr::not(FtExpr::word("banana")),
        ]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert!(analysis.negated);
        assert!(analysis.scan_forced);
        assert_eq!(analysis.positive, Vec::<usize>::new());
        assert_eq!(analysis.negative, vec![0, 1]);
        assert_eq!(analysis.estimated_hits, u64::MAX);
    }

    #[test]
    fn test_or_mixed_polarity_falls_back() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::or([FtExpr::word("apple"), FtExpr::not(FtExpr::word("banana"))]);
        let outcome = expr.analyze(&ctx).unwrap();
        assert!(!outcome.is_accessible());
        assert!(outcome.scan_forced());
    }

    #[test]
    fn test_or_skips_provably_empty_operands() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::or([FtExpr::word("apple"), FtExpr::word("cherry")]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert_eq!(analysis.positive, vec![0]);
        assert_eq!(analysis.estimated_hits, 3);
    }

    #[test]
    fn test_negated_empty_operand_forces_scan() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::or([FtExpr::word("apple"), FtExpr::not(FtExpr::word("cherry"))]);
        let outcome = expr.analyze(&ctx).unwrap();
        assert!(!outcome.is_accessible());
        assert!(outcome.scan_forced());
    }

    #[test]
    fn test_not_flips_polarity() {
        let index = fixture();
        let ctx = context(&index, 100);

        let single = FtExpr::not(FtExpr::word("apple")).analyze(&ctx).unwrap();
        let analysis = single.into_analysis().unwrap();
        assert!(analysis.negated);
        assert_eq!(analysis.estimated_hits, 3);
        assert_eq!(analysis.children.len(), 1);

        let double = FtExpr::not(FtExpr::not(FtExpr::word("apple")))
            .analyze(&ctx)
            .unwrap();
        assert!(!double.into_analysis().unwrap().negated);
    }

    #[test]
    fn test_and_estimate_is_minimum() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::and([FtExpr::word("apple"), FtExpr::word("banana")]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert_eq!(analysis.estimated_hits, 1);
        assert_eq!(analysis.positive, vec![0, 1]);
    }

    #[test]
    fn test_and_supports_mixed_polarity() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::and([FtExpr::word("apple"), FtExpr::not(FtExpr::word("banana"))]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert!(!analysis.negated);
        assert_eq!(analysis.positive, vec![0]);
        assert_eq!(analysis.negative, vec![1]);
        assert_eq!(analysis.estimated_hits, 3);
    }

    #[test]
    fn test_and_with_empty_operand_estimates_zero() {
        let index = fixture();
        let ctx = context(&index, 100);

        let expr = FtExpr::and([FtExpr::word("apple"), FtExpr::word("cherry")]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert_eq!(analysis.estimated_hits, 0);
    }

    #[test]
    fn test_scan_forced_is_sticky_through_parents() {
        let index = fixture();
        let ctx = context(&index, 100);

        // The inner purely-negated disjunction forces a scan; wrapping it
        // in ftnot makes it positive again, but the flag must survive up
        // to the root.
        let expr = FtExpr::or([
            FtExpr::not(FtExpr::or([
                FtExpr::not(FtExpr::word("apple")),
                FtExpr::not(FtExpr::word("banana")),
            ])),
            FtExpr::word("apple"),
        ]);
        let analysis = expr.analyze(&ctx).unwrap().into_analysis().unwrap();
        assert!(!analysis.negated);
        assert!(analysis.scan_forced);
    }

    #[test]
    fn test_plan_nodes_cannot_be_analyzed() {
        let index = fixture();
        let ctx = context(&index, 100);

        let plan = FtExpr::Union(vec![FtExpr::word("apple")]);
        assert!(plan.analyze(&ctx).is_err());
    }

    #[test]
    fn test_empty_operator_fails_fast() {
        let index = fixture();
        let ctx = context(&index, 100);

        assert!(FtExpr::Or(vec![]).analyze(&ctx).is_err());
        assert!(FtExpr::And(vec![]).analyze(&ctx).is_err());
    }
}
