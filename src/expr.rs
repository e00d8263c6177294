//! The full-text expression algebra and its passes.
//!
//! A compiled query hands an expression tree to the accessibility
//! analysis exactly once; if the tree can be answered from the full-text
//! index, the rewriter turns it into an index plan that replaces the
//! original, otherwise the tree is evaluated per document item by the
//! atomic evaluator.
//!
//! # Module Structure
//!
//! - `node`: the expression/plan node sum type
//! - `eval`: brute-force and index-driven per-item evaluation
//! - `analyze`: index-accessibility analysis
//! - `rewrite`: index-equivalent plan rewriting
//! - `optimize`: the two-phase compilation driver

pub mod analyze;
pub mod eval;
pub mod node;
pub mod optimize;
pub mod rewrite;

pub use analyze::{Analysis, AnalysisOutcome, AnalyzeContext};
pub use eval::EvalContext;
pub use node::FtExpr;
pub use optimize::{ExecutionStrategy, OptimizedQuery, optimize};
