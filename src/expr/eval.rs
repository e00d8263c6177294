//! Per-item evaluation of expression and plan trees.

use crate::document::DocumentItem;
use crate::error::{Result, TiliaError};
use crate::expr::node::FtExpr;
use crate::index::FullTextIndex;
use crate::matches::{FtMatch, MatchSet};
use crate::score::ScoreCombinator;
use crate::source::PositionSource;

/// Evaluation collaborators for one query.
///
/// The context is read-only during evaluation; every [`FtExpr::evaluate`]
/// call allocates fresh accumulators, so one context may serve concurrent
/// evaluations of different document items.
pub struct EvalContext<'a> {
    positions: &'a dyn PositionSource,
    combinator: &'a dyn ScoreCombinator,
    index: Option<&'a dyn FullTextIndex>,
}

impl<'a> EvalContext<'a> {
    /// Create an evaluation context for sequential (brute-force) scanning.
    pub fn new(positions: &'a dyn PositionSource, combinator: &'a dyn ScoreCombinator) -> Self {
        EvalContext {
            positions,
            combinator,
            index: None,
        }
    }

    /// Attach a full-text index, enabling evaluation of plan nodes.
    pub fn with_index(mut self, index: &'a dyn FullTextIndex) -> Self {
        self.index = Some(index);
        self
    }
}

impl FtExpr {
    /// Evaluate this expression against one document item.
    ///
    /// Source operators (`Word`/`And`/`Or`/`Not`) resolve word leaves
    /// through the context's position source; plan operators resolve them
    /// through the attached full-text index. Both paths fold scores with
    /// the same combinator, so a rewritten tree scores like its source
    /// counterpart node for node.
    pub fn evaluate(&self, item: &DocumentItem, ctx: &EvalContext) -> Result<FtMatch> {
        match self {
            FtExpr::Word { terms } => {
                let mut acc: Option<FtMatch> = None;
                for term in terms {
                    let positions = ctx.positions.positions_of(term, item)?;
                    let score = ctx.positions.score_of(term, item)?;
                    accumulate_or(
                        &mut acc,
                        FtMatch {
                            matched: !positions.is_empty(),
                            positions,
                            score,
                        },
                        ctx,
                    );
                }
                acc.ok_or_else(|| TiliaError::protocol("word expression has no terms"))
            }
            FtExpr::And(operands) => {
                let mut acc: Option<FtMatch> = None;
                for operand in operands {
                    let result = operand.evaluate(item, ctx)?;
                    accumulate_and(&mut acc, result, ctx);
                }
                let mut out =
                    acc.ok_or_else(|| TiliaError::protocol("ftand requires at least one operand"))?;
                // A position only counts when every operand matched.
                if !out.matched {
                    out.positions = MatchSet::new();
                }
                Ok(out)
            }
            FtExpr::Or(operands) => {
                let mut acc: Option<FtMatch> = None;
                for operand in operands {
                    let result = operand.evaluate(item, ctx)?;
                    accumulate_or(&mut acc, result, ctx);
                }
                acc.ok_or_else(|| TiliaError::protocol("ftor requires at least one operand"))
            }
            FtExpr::Not(operand) => {
                let result = operand.evaluate(item, ctx)?;
                Ok(FtMatch {
                    positions: MatchSet::new(),
                    score: result.score,
                    matched: !result.matched,
                })
            }
            FtExpr::Union(_) | FtExpr::Intersection(_) | FtExpr::NotIndex(_) => {
                self.evaluate_plan(item, ctx)
            }
        }
    }

    /// Evaluate a plan subtree, resolving word leaves through the index.
    fn evaluate_plan(&self, item: &DocumentItem, ctx: &EvalContext) -> Result<FtMatch> {
        match self {
            FtExpr::Word { terms } => {
                let index = ctx.index.ok_or_else(|| {
                    TiliaError::invalid_argument(
                        "evaluating an index plan requires a full-text index",
                    )
                })?;
                let mut acc: Option<FtMatch> = None;
                for term in terms {
                    let (positions, _) = index.lookup(term, item)?;
                    let score = ctx.positions.score_of(term, item)?;
                    accumulate_or(
                        &mut acc,
                        FtMatch {
                            matched: !positions.is_empty(),
                            positions,
                            score,
                        },
                        ctx,
                    );
                }
                acc.ok_or_else(|| TiliaError::protocol("word expression has no terms"))
            }
            FtExpr::Union(operands) => {
                let mut acc: Option<FtMatch> = None;
                for operand in operands {
                    let result = operand.evaluate_plan(item, ctx)?;
                    accumulate_or(&mut acc, result, ctx);
                }
                // An empty union is a provably empty disjunction.
                Ok(acc.unwrap_or_else(FtMatch::no_match))
            }
            FtExpr::Intersection(operands) => {
                let mut acc: Option<FtMatch> = None;
                for operand in operands {
                    let result = operand.evaluate_plan(item, ctx)?;
                    accumulate_and(&mut acc, result, ctx);
                }
                let mut out = acc.ok_or_else(|| {
                    TiliaError::protocol("intersection plan requires at least one operand")
                })?;
                if !out.matched {
                    out.positions = MatchSet::new();
                }
                Ok(out)
            }
            FtExpr::NotIndex(operand) => {
                let result = operand.evaluate_plan(item, ctx)?;
                Ok(FtMatch {
                    positions: MatchSet::new(),
                    score: result.score,
                    matched: !result.matched,
                })
            }
            FtExpr::And(_) | FtExpr::Or(_) | FtExpr::Not(_) => Err(TiliaError::protocol(format!(
                "operator {self} was not rewritten for index access"
            ))),
        }
    }
}

/// Fold one disjunctive operand result into the accumulator.
fn accumulate_or(acc: &mut Option<FtMatch>, result: FtMatch, ctx: &EvalContext) {
    match acc {
        Some(acc) => {
            acc.positions.or(&result.positions);
            acc.score = ctx.combinator.combine_or(acc.score, result.score);
            acc.matched |= result.matched;
        }
        None => *acc = Some(result),
    }
}

/// Fold one conjunctive operand result into the accumulator.
fn accumulate_and(acc: &mut Option<FtMatch>, result: FtMatch, ctx: &EvalContext) {
    match acc {
        Some(acc) => {
            acc.positions.or(&result.positions);
            acc.score = ctx.combinator.combine_and(acc.score, result.score);
            acc.matched &= result.matched;
        }
        None => *acc = Some(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::score::MaxCombinator;
    use crate::source::MemoryPositions;

    fn fixture() -> MemoryPositions {
        let mut source = MemoryPositions::new();
        source.insert_scored("apple", 1, &[1, 5], 0.8);
        source.insert_scored("banana", 1, &[3], 0.5);
        source
    }

    #[test]
    fn test_or_union_and_score() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let expr = FtExpr::or([FtExpr::word("apple"), FtExpr::word("banana")]);
        let result = expr.evaluate(&item, &ctx).unwrap();

        assert!(result.matched);
        assert_eq!(result.positions.positions().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!((result.score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_or_is_commutative() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let ab = FtExpr::or([FtExpr::word("apple"), FtExpr::word("banana")])
            .evaluate(&item, &ctx)
            .unwrap();
        let ba = FtExpr::or([FtExpr::word("banana"), FtExpr::word("apple")])
            .evaluate(&item, &ctx)
            .unwrap();

        assert_eq!(ab.positions, ba.positions);
        assert_eq!(ab.matched, ba.matched);
        assert!((ab.score - ba.score).abs() < f32::EPSILON);
    }

    #[test]
    fn test_and_requires_all_operands() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let both = FtExpr::and([FtExpr::word("apple"), FtExpr::word("banana")])
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(both.matched);
        assert_eq!(both.positions.positions().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!((both.score - 0.5).abs() < f32::EPSILON);

        let missing = FtExpr::and([FtExpr::word("apple"), FtExpr::word("cherry")])
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(!missing.matched);
        assert!(missing.positions.is_empty());
    }

    #[test]
    fn test_not_inverts_match() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let absent = FtExpr::not(FtExpr::word("cherry"))
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(absent.matched);
        assert!(absent.positions.is_empty());

        let present = FtExpr::not(FtExpr::word("apple"))
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(!present.matched);
    }

    #[test]
    fn test_and_with_negated_operand() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        // apple ftand ftnot cherry: matches, positions from apple only.
        let result = FtExpr::and([FtExpr::word("apple"), FtExpr::not(FtExpr::word("cherry"))])
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(result.matched);
        assert_eq!(result.positions.positions().collect::<Vec<_>>(), vec![1, 5]);

        // apple ftand ftnot banana: banana present, no match.
        let result = FtExpr::and([FtExpr::word("apple"), FtExpr::not(FtExpr::word("banana"))])
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(!result.matched);
        assert!(result.positions.is_empty());
    }

    #[test]
    fn test_multi_term_word() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let result = FtExpr::words(["apple", "banana"])
            .evaluate(&item, &ctx)
            .unwrap();
        assert!(result.matched);
        assert_eq!(result.positions.positions().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!((result.score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_operator_fails_fast() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        assert!(FtExpr::Or(vec![]).evaluate(&item, &ctx).is_err());
        assert!(FtExpr::And(vec![]).evaluate(&item, &ctx).is_err());
        assert!(
            FtExpr::Word { terms: vec![] }
                .evaluate(&item, &ctx)
                .is_err()
        );
    }

    #[test]
    fn test_plan_nodes_resolve_through_index() {
        let source = fixture();
        let mut index = MemoryIndex::new();
        index.insert("apple", 1, &[1, 5]);
        index.insert("banana", 1, &[3]);

        let ctx = EvalContext::new(&source, &MaxCombinator).with_index(&index);
        let item = DocumentItem::by_id(1);

        let union = FtExpr::Union(vec![FtExpr::word("apple"), FtExpr::word("banana")]);
        let result = union.evaluate(&item, &ctx).unwrap();
        assert!(result.matched);
        assert_eq!(result.positions.positions().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert!((result.score - 0.8).abs() < f32::EPSILON);

        let complement = FtExpr::NotIndex(Box::new(FtExpr::word("cherry")));
        assert!(complement.evaluate(&item, &ctx).unwrap().matched);
    }

    #[test]
    fn test_plan_without_index_is_rejected() {
        let source = fixture();
        let ctx = EvalContext::new(&source, &MaxCombinator);
        let item = DocumentItem::by_id(1);

        let union = FtExpr::Union(vec![FtExpr::word("apple")]);
        assert!(union.evaluate(&item, &ctx).is_err());
    }

    #[test]
    fn test_unrewritten_operator_inside_plan_is_rejected() {
        let source = fixture();
        let index = MemoryIndex::new();
        let ctx = EvalContext::new(&source, &MaxCombinator).with_index(&index);
        let item = DocumentItem::by_id(1);

        let malformed = FtExpr::Union(vec![FtExpr::or([FtExpr::word("apple")])]);
        assert!(malformed.evaluate(&item, &ctx).is_err());
    }

    #[test]
    fn test_empty_union_matches_nothing() {
        let source = fixture();
        let index = MemoryIndex::new();
        let ctx = EvalContext::new(&source, &MaxCombinator).with_index(&index);
        let item = DocumentItem::by_id(1);

        let result = FtExpr::Union(vec![]).evaluate(&item, &ctx).unwrap();
        assert!(!result.matched);
        assert!(result.positions.is_empty());
    }
}
