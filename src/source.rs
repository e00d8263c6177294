//! Token position sources consumed by word-leaf evaluation.

use std::fmt::Debug;

use ahash::AHashMap;

use crate::document::DocumentItem;
use crate::error::Result;
use crate::matches::MatchSet;
use crate::score::Score;

/// Source of match positions and leaf scores for single terms.
///
/// Implemented by the surrounding system's tokenizer or posting storage;
/// the evaluator consults it for every word leaf. Leaf scores come from
/// this collaborator on both the sequential and the index-driven
/// evaluation path, which keeps score combination consistent between the
/// two.
pub trait PositionSource: Debug + Send + Sync {
    /// Match positions for `term` within one document item.
    fn positions_of(&self, term: &str, item: &DocumentItem) -> Result<MatchSet>;

    /// Leaf relevance score for `term` within one document item.
    fn score_of(&self, term: &str, item: &DocumentItem) -> Result<Score>;
}

#[derive(Debug, Clone)]
struct TermEntry {
    positions: MatchSet,
    score: Score,
}

/// In-memory position source backed by explicit per-term postings.
///
/// Intended for tests and for callers that already hold tokenized
/// positions. Terms are matched verbatim; no normalization is applied.
#[derive(Debug, Clone, Default)]
pub struct MemoryPositions {
    entries: AHashMap<String, AHashMap<u64, TermEntry>>,
}

impl MemoryPositions {
    /// Create an empty position source.
    pub fn new() -> Self {
        MemoryPositions {
            entries: AHashMap::new(),
        }
    }

    /// Record token positions for `term` in document `doc_id` with a
    /// default leaf score of 1.0.
    pub fn insert(&mut self, term: &str, doc_id: u64, positions: &[u32]) {
        self.insert_scored(term, doc_id, positions, 1.0);
    }

    /// Record token positions for `term` in document `doc_id` with an
    /// explicit leaf score.
    pub fn insert_scored(&mut self, term: &str, doc_id: u64, positions: &[u32], score: Score) {
        self.entries
            .entry(term.to_string())
            .or_default()
            .insert(
                doc_id,
                TermEntry {
                    positions: MatchSet::from_positions(positions.iter().copied()),
                    score,
                },
            );
    }
}

impl PositionSource for MemoryPositions {
    fn positions_of(&self, term: &str, item: &DocumentItem) -> Result<MatchSet> {
        Ok(self
            .entries
            .get(term)
            .and_then(|docs| docs.get(&item.doc_id))
            .map(|entry| entry.positions.clone())
            .unwrap_or_default())
    }

    fn score_of(&self, term: &str, item: &DocumentItem) -> Result<Score> {
        Ok(self
            .entries
            .get(term)
            .and_then(|docs| docs.get(&item.doc_id))
            .map(|entry| entry.score)
            .unwrap_or(0.0))
    }
}
