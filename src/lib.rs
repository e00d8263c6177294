//! # Tilia
//!
//! Full-text query algebra and index optimizer for XML document databases.
//!
//! ## Features
//!
//! - Boolean algebra over full-text match expressions (word, and, or, not)
//! - Brute-force per-item evaluation with match positions and relevance scores
//! - Pluggable score combination strategies
//! - Index-accessibility analysis with selectivity estimates
//! - Index-equivalent plan rewriting (union, intersection, negated index)
// Core modules
pub mod config;
pub mod document;
mod error;
pub mod expr;
pub mod index;
pub mod matches;
pub mod score;
pub mod source;
pub mod token;

// Re-exports for the public API
pub use config::OptimizerConfig;
pub use document::DocumentItem;
pub use error::{Result, TiliaError};
pub use expr::{
    Analysis, AnalysisOutcome, AnalyzeContext, EvalContext, ExecutionStrategy, FtExpr,
    OptimizedQuery, optimize,
};
pub use index::{FullTextIndex, MemoryIndex, SelectivityEstimator};
pub use matches::{FtMatch, MatchSet, Span};
pub use score::{MaxCombinator, ProbabilisticCombinator, Score, ScoreCombinator};
pub use source::{MemoryPositions, PositionSource};
pub use token::{ScanTokenizer, UnicodeClassifier, WordClassifier};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
