//! Match positions and per-item evaluation results.

use serde::{Deserialize, Serialize};

use crate::score::Score;

/// An inclusive interval of token ordinals within one document item.
///
/// A single-token hit has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Ordinal of the first matched token.
    pub start: u32,
    /// Ordinal of the last matched token.
    pub end: u32,
}

impl Span {
    /// Create a span covering the tokens from `start` to `end` inclusive.
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create a span covering a single token.
    pub fn point(position: u32) -> Self {
        Span {
            start: position,
            end: position,
        }
    }
}

/// An ordered, deduplicated set of match position intervals within one
/// document item's token stream.
///
/// A `MatchSet` is owned exclusively by the evaluation call that produced
/// it; union via [`MatchSet::or`] is the only combination applied during
/// evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    spans: Vec<Span>,
}

impl MatchSet {
    /// Create an empty match set.
    pub fn new() -> Self {
        MatchSet { spans: Vec::new() }
    }

    /// Create a match set of single-token spans from token ordinals.
    pub fn from_positions<I: IntoIterator<Item = u32>>(positions: I) -> Self {
        let mut set = MatchSet::new();
        for position in positions {
            set.insert(Span::point(position));
        }
        set
    }

    /// Insert a span, keeping the set ordered and deduplicated.
    pub fn insert(&mut self, span: Span) {
        match self.spans.binary_search(&span) {
            Ok(_) => {}
            Err(at) => self.spans.insert(at, span),
        }
    }

    /// Union the other set into this one.
    pub fn or(&mut self, other: &MatchSet) {
        if other.spans.is_empty() {
            return;
        }
        if self.spans.is_empty() {
            self.spans = other.spans.clone();
            return;
        }
        let mut merged = Vec::with_capacity(self.spans.len() + other.spans.len());
        let mut left = self.spans.iter().peekable();
        let mut right = other.spans.iter().peekable();
        while let (Some(&&a), Some(&&b)) = (left.peek(), right.peek()) {
            let next = if a <= b {
                left.next();
                if a == b {
                    right.next();
                }
                a
            } else {
                right.next();
                b
            };
            merged.push(next);
        }
        merged.extend(left.copied());
        merged.extend(right.copied());
        self.spans = merged;
    }

    /// The spans in ascending order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Iterator over the start ordinals of all spans.
    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.spans.iter().map(|span| span.start)
    }

    /// Number of spans in the set.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the set holds no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Result of evaluating an expression against one document item.
///
/// `matched` is tracked separately from the position set: a negation can
/// hold for an item (the term is absent) while contributing no positions,
/// so emptiness of `positions` alone does not decide the match.
#[derive(Debug, Clone, PartialEq)]
pub struct FtMatch {
    /// Match positions contributed by the expression.
    pub positions: MatchSet,
    /// Relevance score, combined through the query's score combinator.
    pub score: Score,
    /// Whether the expression holds for the evaluated item.
    pub matched: bool,
}

impl FtMatch {
    /// A result that matched nothing.
    pub fn no_match() -> Self {
        FtMatch {
            positions: MatchSet::new(),
            score: 0.0,
            matched: false,
        }
    }
}
