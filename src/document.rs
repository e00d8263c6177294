//! Per-item document view handed to evaluation.

use serde::{Deserialize, Serialize};

/// One document item as seen by per-item query evaluation.
///
/// The core treats the item as opaque: position sources key off `doc_id`
/// or scan `content`, whichever their backing data supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Database-wide identifier of the document node.
    pub doc_id: u64,
    /// Text content of the node, for collaborators that tokenize on the fly.
    pub content: String,
}

impl DocumentItem {
    /// Create a document item with text content.
    pub fn new<S: Into<String>>(doc_id: u64, content: S) -> Self {
        DocumentItem {
            doc_id,
            content: content.into(),
        }
    }

    /// Create a document item with no inline content.
    ///
    /// Used with position sources that resolve terms from precomputed
    /// postings rather than the item text.
    pub fn by_id(doc_id: u64) -> Self {
        DocumentItem {
            doc_id,
            content: String::new(),
        }
    }
}
