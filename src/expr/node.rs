//! Expression and plan node types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A full-text query expression.
///
/// The first four variants form the source algebra produced by query
/// compilation; `Union`, `Intersection` and `NotIndex` are plan variants
/// produced by [`rewrite`](FtExpr::rewrite) for index-driven execution.
/// The variant set is closed on purpose: every pass matches exhaustively,
/// so adding an operator forces every pass to handle it.
///
/// Trees are strict: children are owned and never shared between parents.
/// A tree is immutable after construction except for wholesale subtree
/// replacement during rewriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FtExpr {
    /// Word match against one or more alternative terms.
    Word {
        /// Alternative terms; any of them matching makes the leaf match.
        terms: Vec<String>,
    },
    /// All operands must match.
    And(Vec<FtExpr>),
    /// At least one operand must match.
    Or(Vec<FtExpr>),
    /// The operand must not match; interpreted by the enclosing operator.
    Not(Box<FtExpr>),
    /// Index plan: union of index lookups.
    Union(Vec<FtExpr>),
    /// Index plan: intersection of index lookups.
    Intersection(Vec<FtExpr>),
    /// Index plan: complement of an index lookup.
    NotIndex(Box<FtExpr>),
}

impl FtExpr {
    /// Create a word leaf matching a single term.
    pub fn word<S: Into<String>>(term: S) -> Self {
        FtExpr::Word {
            terms: vec![term.into()],
        }
    }

    /// Create a word leaf matching any of the given terms.
    pub fn words<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FtExpr::Word {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a conjunction.
    pub fn and<I: IntoIterator<Item = FtExpr>>(operands: I) -> Self {
        FtExpr::And(operands.into_iter().collect())
    }

    /// Create a disjunction.
    pub fn or<I: IntoIterator<Item = FtExpr>>(operands: I) -> Self {
        FtExpr::Or(operands.into_iter().collect())
    }

    /// Create a negation.
    pub fn not(operand: FtExpr) -> Self {
        FtExpr::Not(Box::new(operand))
    }

    /// Whether this node is an index-plan variant.
    pub fn is_plan(&self) -> bool {
        matches!(
            self,
            FtExpr::Union(_) | FtExpr::Intersection(_) | FtExpr::NotIndex(_)
        )
    }

    /// Number of direct children.
    pub fn arity(&self) -> usize {
        match self {
            FtExpr::Word { .. } => 0,
            FtExpr::And(operands)
            | FtExpr::Or(operands)
            | FtExpr::Union(operands)
            | FtExpr::Intersection(operands) => operands.len(),
            FtExpr::Not(_) | FtExpr::NotIndex(_) => 1,
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, operands: &[FtExpr], separator: &str) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{operand}")?;
    }
    Ok(())
}

impl fmt::Display for FtExpr {
    /// Stable diagnostic rendering: children joined by the operator's
    /// keyword.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtExpr::Word { terms } => match terms.as_slice() {
                [term] => write!(f, "\"{term}\""),
                terms => {
                    f.write_str("(")?;
                    for (i, term) in terms.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" | ")?;
                        }
                        write!(f, "\"{term}\"")?;
                    }
                    f.write_str(")")
                }
            },
            FtExpr::And(operands) => {
                f.write_str("(")?;
                join(f, operands, " ftand ")?;
                f.write_str(")")
            }
            FtExpr::Or(operands) => {
                f.write_str("(")?;
                join(f, operands, " ftor ")?;
                f.write_str(")")
            }
            FtExpr::Not(operand) => write!(f, "ftnot {operand}"),
            FtExpr::Union(operands) => {
                f.write_str("union(")?;
                join(f, operands, ", ")?;
                f.write_str(")")
            }
            FtExpr::Intersection(operands) => {
                f.write_str("intersect(")?;
                join(f, operands, ", ")?;
                f.write_str(")")
            }
            FtExpr::NotIndex(operand) => write!(f, "not-index({operand})"),
        }
    }
}
