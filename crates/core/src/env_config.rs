//! Environment variable parsing with warn-level logging for invalid values.

use std::time::Duration;

use crate::constants::{
    DEFAULT_LESSON_INDEX, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SUBSCRIPTION_INDEX, MAX_PAGE_LIMIT,
};

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok(), default)
}

fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}

/// Paging limits and deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub request_timeout: Duration,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl PagingConfig {
    /// Reads `ROSTER_DEFAULT_PAGE_LIMIT`, `ROSTER_MAX_PAGE_LIMIT` and
    /// `ROSTER_REQUEST_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`PagingConfig::from_env`] with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str, default: u64| parse_with_default(var, lookup(var), default);
        let max_limit = u32::try_from(get("ROSTER_MAX_PAGE_LIMIT", u64::from(MAX_PAGE_LIMIT)))
            .unwrap_or(MAX_PAGE_LIMIT)
            .max(1);
        let default_limit =
            u32::try_from(get("ROSTER_DEFAULT_PAGE_LIMIT", u64::from(DEFAULT_PAGE_LIMIT)))
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, max_limit);
        let timeout_secs = get("ROSTER_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);
        Self { default_limit, max_limit, request_timeout: Duration::from_secs(timeout_secs) }
    }

    /// Applies the default to a zero limit and clamps to `1..=max_limit`.
    #[must_use]
    pub fn effective_limit(&self, requested: u32) -> u32 {
        let limit = if requested == 0 { self.default_limit } else { requested };
        limit.clamp(1, self.max_limit.max(1))
    }
}

/// Elasticsearch index names, overridable via `ROSTER_LESSON_INDEX` and
/// `ROSTER_SUBSCRIPTION_INDEX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    pub lessons: String,
    pub subscriptions: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            lessons: DEFAULT_LESSON_INDEX.to_owned(),
            subscriptions: DEFAULT_SUBSCRIPTION_INDEX.to_owned(),
        }
    }
}

impl IndexNames {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            lessons: env_parse_with_default("ROSTER_LESSON_INDEX", DEFAULT_LESSON_INDEX.to_owned()),
            subscriptions: env_parse_with_default(
                "ROSTER_SUBSCRIPTION_INDEX",
                DEFAULT_SUBSCRIPTION_INDEX.to_owned(),
            ),
        }
    }
}
