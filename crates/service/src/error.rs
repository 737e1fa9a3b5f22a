//! Typed error enum for the service layer.
//!
//! Tags every storage failure with the pagination step that produced it, so callers can
//! tell a failed count from a failed fetch without downcasting.

use std::fmt;
use std::time::Duration;

use roster_core::FilterError;
use roster_storage::StorageError;
use thiserror::Error;

/// Step of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStage {
    AnchorResolution,
    ForwardFetch,
    BackwardFetch,
    Count,
    Satellites,
}

impl QueryStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnchorResolution => "anchor resolution",
            Self::ForwardFetch => "forward fetch",
            Self::BackwardFetch => "backward fetch",
            Self::Count => "count",
            Self::Satellites => "satellites",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-layer error for listing requests.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Filter input was rejected before any query ran.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] FilterError),

    /// A backend query failed. No partial page is returned.
    #[error("{stage} failed: {source}")]
    Query {
        stage: QueryStage,
        #[source]
        source: StorageError,
    },

    /// The request did not finish within its deadline.
    #[error("deadline of {after:?} exceeded")]
    DeadlineExceeded { after: Duration },
}

impl ServiceError {
    pub(crate) fn query(stage: QueryStage) -> impl Fn(StorageError) -> Self {
        move |source| Self::Query { stage, source }
    }

    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Query { source, .. } => source.is_transient(),
            Self::DeadlineExceeded { .. } => true,
            Self::InvalidArgument(_) => false,
        }
    }

    /// Whether the caller sent bad input.
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Step that failed, for query errors.
    pub const fn stage(&self) -> Option<QueryStage> {
        match self {
            Self::Query { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
