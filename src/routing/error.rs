//! Routing error types.

use axum::BoxError;
use thiserror::Error;

/// A path pattern rejected at registration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {pattern:?} has an empty segment at position {position}")]
    EmptySegment { pattern: String, position: usize },

    #[error("pattern {pattern:?} has a parameter without a name at position {position}")]
    UnnamedParameter { pattern: String, position: usize },

    #[error("pattern {pattern:?} declares parameter {name:?} more than once")]
    DuplicateParameter { pattern: String, name: String },
}

/// Failure surfaced while dispatching a request.
///
/// Matching itself never fails; these wrap errors raised by user code so the
/// host can turn them into a 500 response.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("middleware at route {route} failed: {source}")]
    Middleware {
        route: usize,
        #[source]
        source: BoxError,
    },

    #[error("handler at route {route} failed: {source}")]
    Handler {
        route: usize,
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// Index of the route whose code failed.
    pub fn route(&self) -> usize {
        match self {
            DispatchError::Middleware { route, .. } | DispatchError::Handler { route, .. } => *route,
        }
    }
}
