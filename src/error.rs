//! Error types for the tilia crate.

use thiserror::Error;

/// Errors raised by query evaluation, analysis and rewriting.
///
/// Collaborator failures (index lookups, tokenization) are wrapped in
/// [`TiliaError::Index`] by the collaborator and propagate unchanged through
/// the core; the core itself performs no retries and holds no recoverable
/// state across a failure.
#[derive(Error, Debug)]
pub enum TiliaError {
    /// An argument violated a documented precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The two-phase analyze/rewrite protocol was violated.
    ///
    /// Raised when a rewrite is attempted with an analysis that does not
    /// match the expression shape, when an operator with no operands is
    /// reached, or when a pass is applied to a tree it must never see
    /// (e.g. re-analyzing an index plan). These are fatal: query
    /// compilation must abort rather than emit an incorrect plan.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// A failure reported by an index or token-position collaborator.
    #[error("Index error: {0}")]
    Index(String),
}

impl TiliaError {
    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        TiliaError::InvalidArgument(message.into())
    }

    /// Create a protocol violation error.
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        TiliaError::Protocol(message.into())
    }

    /// Create an index error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        TiliaError::Index(message.into())
    }
}

/// Result type alias for tilia operations.
pub type Result<T> = std::result::Result<T, TiliaError>;
