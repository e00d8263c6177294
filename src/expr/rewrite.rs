//! Index-equivalent plan rewriting.
//!
//! Consumes the [`Analysis`] produced by the accessibility pass and
//! replaces an expression subtree with an equivalent index plan built
//! from `Union`, `Intersection` and `NotIndex` nodes. The analysis is
//! taken by value: a rewrite without a prior analyze is unrepresentable,
//! and reusing stale results requires an explicit (and visible) clone.

use crate::error::{Result, TiliaError};
use crate::expr::analyze::Analysis;
use crate::expr::node::FtExpr;

fn shape_error() -> TiliaError {
    TiliaError::protocol(
        "analysis does not match the expression shape; rewrite requires the result of a \
         matching analyze pass",
    )
}

/// Expression children paired with their analyses, claimable by index.
struct Operands {
    slots: Vec<Option<(FtExpr, Analysis)>>,
}

impl Operands {
    fn new(operands: Vec<FtExpr>, analysis: Vec<Analysis>) -> Result<Self> {
        if operands.len() != analysis.len() {
            return Err(shape_error());
        }
        Ok(Operands {
            slots: operands.into_iter().zip(analysis).map(Some).collect(),
        })
    }

    /// Claim the operand at `index`; each operand may be claimed once.
    fn claim(&mut self, index: usize) -> Result<(FtExpr, Analysis)> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(shape_error)
    }

    /// Claim the operand at `index` and strip its negation, yielding the
    /// inner expression and the inner analysis.
    fn claim_negated(&mut self, index: usize) -> Result<(FtExpr, Analysis)> {
        let (operand, analysis) = self.claim(index)?;
        let FtExpr::Not(inner) = operand else {
            return Err(TiliaError::protocol(
                "negative partition entry is not a negation",
            ));
        };
        Ok((*inner, single_child(analysis)?))
    }
}

/// Unwrap the single child analysis of a unary node.
fn single_child(analysis: Analysis) -> Result<Analysis> {
    if analysis.children.len() != 1 {
        return Err(shape_error());
    }
    analysis
        .children
        .into_iter()
        .next()
        .ok_or_else(shape_error)
}

impl FtExpr {
    /// Rewrite this subtree into its index-equivalent plan.
    ///
    /// `analysis` must be the result of [`analyze`](FtExpr::analyze) on
    /// this very tree, unmodified; any shape mismatch aborts with a
    /// protocol violation rather than producing an incorrect plan.
    /// Children are rewritten bottom-up and child order is preserved for
    /// deterministic output.
    pub fn rewrite(self, analysis: Analysis) -> Result<FtExpr> {
        match self {
            FtExpr::Word { .. } => {
                if !analysis.children.is_empty() {
                    return Err(shape_error());
                }
                // A word leaf is its own plan: executed as an index lookup.
                Ok(self)
            }
            FtExpr::Not(operand) => {
                let inner = single_child(analysis)?;
                Ok(FtExpr::NotIndex(Box::new(operand.rewrite(inner)?)))
            }
            FtExpr::Or(operands) => {
                let mut operands = Operands::new(operands, analysis.children)?;
                if analysis.positive.is_empty() && !analysis.negative.is_empty() {
                    // ftnot A ftor ftnot B == ftnot (A ftand B)
                    let mut plans = Vec::with_capacity(analysis.negative.len());
                    for &index in &analysis.negative {
                        let (inner, inner_analysis) = operands.claim_negated(index)?;
                        plans.push(inner.rewrite(inner_analysis)?);
                    }
                    return Ok(FtExpr::NotIndex(Box::new(FtExpr::Intersection(plans))));
                }
                if !analysis.negative.is_empty() {
                    // Analysis already rejected mixed polarity; reaching it
                    // here means the analysis belongs to another tree.
                    return Err(TiliaError::protocol(
                        "mixed positive and negative operands survived analysis",
                    ));
                }
                let mut plans = Vec::with_capacity(analysis.positive.len());
                for &index in &analysis.positive {
                    let (operand, operand_analysis) = operands.claim(index)?;
                    plans.push(operand.rewrite(operand_analysis)?);
                }
                if plans.len() == 1 {
                    // No redundant single-operand wrapper.
                    return Ok(plans.remove(0));
                }
                Ok(FtExpr::Union(plans))
            }
            FtExpr::And(operands) => {
                let count = operands.len();
                let mut operands = Operands::new(operands, analysis.children)?;
                if analysis.positive.is_empty() && !analysis.negative.is_empty() {
                    // ftnot A ftand ftnot B == ftnot (A ftor B)
                    let mut plans = Vec::with_capacity(analysis.negative.len());
                    for &index in &analysis.negative {
                        let (inner, inner_analysis) = operands.claim_negated(index)?;
                        plans.push(inner.rewrite(inner_analysis)?);
                    }
                    return Ok(FtExpr::NotIndex(Box::new(FtExpr::Union(plans))));
                }
                if analysis.negative.is_empty() {
                    let mut plans = Vec::with_capacity(analysis.positive.len());
                    for &index in &analysis.positive {
                        let (operand, operand_analysis) = operands.claim(index)?;
                        plans.push(operand.rewrite(operand_analysis)?);
                    }
                    if plans.len() == 1 {
                        return Ok(plans.remove(0));
                    }
                    return Ok(FtExpr::Intersection(plans));
                }
                // Mixed polarity: intersect positive plans with the
                // complements of the negated ones, in original child order.
                let mut plans = Vec::with_capacity(count);
                for index in 0..count {
                    if analysis.positive.contains(&index) {
                        let (operand, operand_analysis) = operands.claim(index)?;
                        plans.push(operand.rewrite(operand_analysis)?);
                    } else if analysis.negative.contains(&index) {
                        let (inner, inner_analysis) = operands.claim_negated(index)?;
                        plans.push(FtExpr::NotIndex(Box::new(inner.rewrite(inner_analysis)?)));
                    } else {
                        return Err(shape_error());
                    }
                }
                Ok(FtExpr::Intersection(plans))
            }
            FtExpr::Union(_) | FtExpr::Intersection(_) | FtExpr::NotIndex(_) => Err(
                TiliaError::protocol("index plan nodes cannot be rewritten again"),
            ),
        }
    }
}
