//! Shared constants for roster-paging.
//!
//! Centralizes the limits and defaults every crate agrees on.

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page a caller may request; larger limits are clamped.
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Deadline for a whole page request (anchor, pages, count, satellites) in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// HTTP timeout for a single Elasticsearch request in seconds.
pub const ES_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default Elasticsearch index holding lesson documents.
pub const DEFAULT_LESSON_INDEX: &str = "lessons";

/// Default Elasticsearch index holding student subscription documents.
pub const DEFAULT_SUBSCRIPTION_INDEX: &str = "student_subscriptions";
