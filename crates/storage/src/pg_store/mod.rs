//! PostgreSQL keyset store using sqlx.
//!
//! Split into modular files by concern: table mapping, statement rendering, keyset reads,
//! and per-listing row mapping with satellite lookups.

mod keyset;
mod lessons;
mod render;
mod schema;
mod subscriptions;

use async_trait::async_trait;
use roster_core::{
    Boundary, FilterSet, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS, SortKey,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::StorageError;
use crate::traits::{KeysetQuery, KeysetStore, KeysetWindow};

pub use schema::{PgListing, PgRelation};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        tracing::info!("PgStore initialized");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[async_trait]
impl<L: PgListing> KeysetStore<L> for PgStore {
    async fn resolve_anchor(
        &self,
        sort_key: &SortKey<L>,
        anchor_id: &str,
    ) -> Result<Option<Boundary>, StorageError> {
        keyset::resolve_anchor(self, sort_key, anchor_id).await
    }

    async fn fetch_window(
        &self,
        query: &KeysetQuery<'_, L>,
    ) -> Result<KeysetWindow<L>, StorageError> {
        keyset::fetch_window(self, query).await
    }

    async fn count(&self, filters: &FilterSet<L>) -> Result<u64, StorageError> {
        keyset::count(self, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
