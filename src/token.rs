//! Word-boundary scanning over raw item text.
//!
//! [`ScanTokenizer`] is a [`PositionSource`] that tokenizes
//! [`DocumentItem::content`] on the fly using Unicode word segmentation,
//! for items whose text has not been indexed up front. It also maps token
//! ordinals back to byte ranges and expands arbitrary byte offsets to word
//! boundaries, which is what result highlighting needs when a fuzzy hit
//! lands inside a larger text segment.

use std::fmt::Debug;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::document::DocumentItem;
use crate::error::Result;
use crate::matches::MatchSet;
use crate::score::Score;
use crate::source::PositionSource;

/// Character-category decisions for what counts as a word character.
pub trait WordClassifier: Debug + Send + Sync {
    /// Whether `c` belongs to a word.
    fn is_word_char(&self, c: char) -> bool;
}

/// Default classifier: Unicode alphanumeric characters form words.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeClassifier;

impl WordClassifier for UnicodeClassifier {
    fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric()
    }
}

/// Tokenizing position source over raw document text.
#[derive(Debug)]
pub struct ScanTokenizer {
    classifier: Box<dyn WordClassifier>,
}

impl Default for ScanTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanTokenizer {
    /// Create a tokenizer with the default Unicode classifier.
    pub fn new() -> Self {
        ScanTokenizer {
            classifier: Box::new(UnicodeClassifier),
        }
    }

    /// Create a tokenizer with a custom word classifier.
    pub fn with_classifier(classifier: Box<dyn WordClassifier>) -> Self {
        ScanTokenizer { classifier }
    }

    /// Normalize a term for comparison: NFC, then lowercase.
    pub fn normalize(&self, term: &str) -> String {
        term.nfc().collect::<String>().to_lowercase()
    }

    /// Map a set of token-ordinal spans to byte ranges within `text`.
    ///
    /// Spans whose ordinals fall outside the token stream are skipped.
    pub fn byte_ranges(&self, text: &str, matches: &MatchSet) -> Vec<(usize, usize)> {
        let tokens: Vec<(usize, &str)> = text.unicode_word_indices().collect();
        matches
            .spans()
            .iter()
            .filter_map(|span| {
                let (first_offset, _) = tokens.get(span.start as usize)?;
                let (last_offset, last_token) = tokens.get(span.end as usize)?;
                Some((*first_offset, last_offset + last_token.len()))
            })
            .collect()
    }

    /// Expand a byte offset to the boundaries of the word containing it.
    ///
    /// Returns `None` when the offset does not fall on a word character.
    pub fn expand_to_word(&self, text: &str, offset: usize) -> Option<(usize, usize)> {
        if offset >= text.len() {
            return None;
        }
        let mut word_start: Option<usize> = None;
        for (at, c) in text.char_indices() {
            if self.classifier.is_word_char(c) {
                if word_start.is_none() {
                    word_start = Some(at);
                }
            } else {
                if let Some(start) = word_start
                    && (start..at).contains(&offset)
                {
                    return Some((start, at));
                }
                if at >= offset {
                    return None;
                }
                word_start = None;
            }
        }
        match word_start {
            Some(start) if offset >= start => Some((start, text.len())),
            _ => None,
        }
    }
}

impl PositionSource for ScanTokenizer {
    fn positions_of(&self, term: &str, item: &DocumentItem) -> Result<MatchSet> {
        let needle = self.normalize(term);
        let positions = item
            .content
            .unicode_words()
            .enumerate()
            .filter(|(_, word)| self.normalize(word) == needle)
            .map(|(ordinal, _)| ordinal as u32);
        Ok(MatchSet::from_positions(positions))
    }

    /// Token frequency: matching tokens over total tokens.
    fn score_of(&self, term: &str, item: &DocumentItem) -> Result<Score> {
        let total = item.content.unicode_words().count();
        if total == 0 {
            return Ok(0.0);
        }
        let hits = self.positions_of(term, item)?.len();
        Ok(hits as f32 / total as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::Span;

    #[test]
    fn test_positions_of_scans_content() {
        let tokenizer = ScanTokenizer::new();
        let item = DocumentItem::new(1, "the apple fell near the apple tree");
        let positions = tokenizer.positions_of("apple", &item).unwrap();
        assert_eq!(positions.positions().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let tokenizer = ScanTokenizer::new();
        let item = DocumentItem::new(1, "Apple pie");
        assert_eq!(tokenizer.positions_of("APPLE", &item).unwrap().len(), 1);
    }

    #[test]
    fn test_score_is_token_frequency() {
        let tokenizer = ScanTokenizer::new();
        let item = DocumentItem::new(1, "apple banana apple cherry");
        let score = tokenizer.score_of("apple", &item).unwrap();
        assert!((score - 0.5).abs() < f32::EPSILON);

        let empty = DocumentItem::new(2, "");
        assert_eq!(tokenizer.score_of("apple", &empty).unwrap(), 0.0);
    }

    #[test]
    fn test_byte_ranges_map_ordinals() {
        let tokenizer = ScanTokenizer::new();
        let text = "one two three";
        let matches = MatchSet::from_positions([1]);
        assert_eq!(tokenizer.byte_ranges(text, &matches), vec![(4, 7)]);

        let mut wide = MatchSet::new();
        wide.insert(Span::new(0, 2));
        assert_eq!(tokenizer.byte_ranges(text, &wide), vec![(0, 13)]);
    }

    #[test]
    fn test_expand_to_word() {
        let tokenizer = ScanTokenizer::new();
        let text = "lorem ipsum, dolor";
        // Inside "ipsum".
        assert_eq!(tokenizer.expand_to_word(text, 8), Some((6, 11)));
        // On the comma.
        assert_eq!(tokenizer.expand_to_word(text, 11), None);
        // Inside the trailing word.
        assert_eq!(tokenizer.expand_to_word(text, 14), Some((13, 18)));
        // Past the end.
        assert_eq!(tokenizer.expand_to_word(text, 99), None);
    }
}
