//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use roster_core::{Boundary, FilterSet, IndexNames, SortKey};

use crate::error::StorageError;
use crate::es_store::{EsListing, EsStore};
use crate::pg_store::{PgListing, PgStore};
use crate::traits::{KeysetQuery, KeysetStore, KeysetWindow, SatelliteStore};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StoreBackend::Postgres(s) => <PgStore as $trait>::$method(s, $($arg),*).await,
            StoreBackend::Elasticsearch(s) => <EsStore as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StoreBackend {
    Postgres(PgStore),
    Elasticsearch(EsStore),
}

impl StoreBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStore::new(database_url).await?))
    }

    pub fn new_elasticsearch(base_url: &str, indices: IndexNames) -> Result<Self, StorageError> {
        Ok(Self::Elasticsearch(EsStore::new(base_url, indices)?))
    }

    /// Backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Elasticsearch(_) => "elasticsearch",
        }
    }
}

#[async_trait]
impl<L> KeysetStore<L> for StoreBackend
where
    L: PgListing + EsListing,
{
    async fn resolve_anchor(
        &self,
        sort_key: &SortKey<L>,
        anchor_id: &str,
    ) -> Result<Option<Boundary>, StorageError> {
        dispatch!(self, KeysetStore<L>, resolve_anchor(sort_key, anchor_id))
    }

    async fn fetch_window(
        &self,
        query: &KeysetQuery<'_, L>,
    ) -> Result<KeysetWindow<L>, StorageError> {
        dispatch!(self, KeysetStore<L>, fetch_window(query))
    }

    async fn count(&self, filters: &FilterSet<L>) -> Result<u64, StorageError> {
        dispatch!(self, KeysetStore<L>, count(filters))
    }
}

#[async_trait]
impl<L> SatelliteStore<L> for StoreBackend
where
    L: PgListing + EsListing,
    PgStore: SatelliteStore<L>,
{
    async fn attach_satellites(&self, items: &mut [L]) -> Result<(), StorageError> {
        dispatch!(self, SatelliteStore<L>, attach_satellites(items))
    }
}
