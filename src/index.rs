//! Full-text index interfaces consumed by the optimizer and plan nodes.

use std::fmt::Debug;

use ahash::AHashMap;

use crate::document::DocumentItem;
use crate::error::Result;
use crate::matches::MatchSet;

/// Cardinality estimates consulted by the accessibility analysis.
///
/// Estimates are upper bounds on result cardinality, not exact counts.
/// Analysis only ever asks for estimates; actual postings are read through
/// [`FullTextIndex`] once a plan executes.
pub trait SelectivityEstimator: Debug + Send + Sync {
    /// Upper bound on the number of index hits for `term`.
    fn cardinality(&self, term: &str) -> Result<u64>;
}

/// Lookup interface of the on-disk full-text index.
///
/// Consumed only by index-plan nodes after rewriting; the analysis and
/// rewrite passes never read postings.
pub trait FullTextIndex: Debug + Send + Sync {
    /// Match positions for `term` within one document item, together with
    /// the index's estimated cardinality for the term.
    fn lookup(&self, term: &str, item: &DocumentItem) -> Result<(MatchSet, u64)>;
}

/// In-memory index implementing both index interfaces from one posting map.
///
/// Intended for tests and small corpora.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    postings: AHashMap<String, AHashMap<u64, MatchSet>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        MemoryIndex {
            postings: AHashMap::new(),
        }
    }

    /// Record token positions for `term` in document `doc_id`.
    pub fn insert(&mut self, term: &str, doc_id: u64, positions: &[u32]) {
        self.postings
            .entry(term.to_string())
            .or_default()
            .insert(doc_id, MatchSet::from_positions(positions.iter().copied()));
    }
}

impl SelectivityEstimator for MemoryIndex {
    fn cardinality(&self, term: &str) -> Result<u64> {
        Ok(self
            .postings
            .get(term)
            .map(|docs| docs.values().map(|set| set.len() as u64).sum())
            .unwrap_or(0))
    }
}

impl FullTextIndex for MemoryIndex {
    fn lookup(&self, term: &str, item: &DocumentItem) -> Result<(MatchSet, u64)> {
        let cardinality = self.cardinality(term)?;
        let positions = self
            .postings
            .get(term)
            .and_then(|docs| docs.get(&item.doc_id))
            .cloned()
            .unwrap_or_default();
        Ok((positions, cardinality))
    }
}
