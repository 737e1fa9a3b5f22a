//! Typed error enum for the storage layer.
//!
//! Both backends report through this type so the pagination engine can tag failures with
//! the sub-query that produced them without knowing which store it talks to.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row not found for expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// SQL / connection / pool timeout failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Transport failure talking to the search cluster.
    #[error("search transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The search cluster answered with a non-success status.
    #[error("search status {code}: {body}")]
    SearchStatus { code: u16, body: String },

    /// Row or document could not be mapped into a domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Backend client could not be constructed.
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying by the caller).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(e) => matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::SearchStatus { code, .. } => matches!(code, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    pub(crate) fn corrupt(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataCorruption { context: context.into(), source: Box::new(source) }
    }
}

/// Custom `From<sqlx::Error>`: `RowNotFound` becomes `NotFound`, decode failures become
/// `DataCorruption`, everything else is `Database`.
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound { entity: "row", id: "unknown".into() },
            sqlx::Error::ColumnDecode { index, source } => Self::DataCorruption {
                context: format!("decoding column {index}"),
                source,
            },
            other => Self::Database(other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}
