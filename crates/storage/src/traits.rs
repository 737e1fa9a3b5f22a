//! Storage seams consumed by the pagination engine.

use async_trait::async_trait;
use roster_core::{Boundary, FilterSet, Listing, SortKey};

use crate::error::StorageError;

/// One filtered, sorted, bounded fetch.
#[derive(Debug)]
pub struct KeysetQuery<'a, L: Listing> {
    pub filters: &'a FilterSet<L>,
    pub sort_key: SortKey<L>,
    /// Exclusive lower bound under `sort_key`; `None` starts at the head.
    pub boundary: Option<&'a Boundary>,
    pub limit: u32,
}

/// Records returned by a keyset fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetWindow<L> {
    /// At most `limit` records in sort order.
    pub items: Vec<L>,
    /// Records matching filters and boundary, ignoring the limit.
    pub matched: u64,
}

/// Keyset reads against one listing.
#[async_trait]
pub trait KeysetStore<L: Listing>: Send + Sync {
    /// Sort-key values of the live record `anchor_id`, `None` if it does not exist.
    /// Filters are deliberately not applied.
    async fn resolve_anchor(
        &self,
        sort_key: &SortKey<L>,
        anchor_id: &str,
    ) -> Result<Option<Boundary>, StorageError>;

    /// Records strictly after `query.boundary` in `query.sort_key` order.
    async fn fetch_window(&self, query: &KeysetQuery<'_, L>)
    -> Result<KeysetWindow<L>, StorageError>;

    /// Exact number of records matching `filters`.
    async fn count(&self, filters: &FilterSet<L>) -> Result<u64, StorageError>;
}

/// Batched enrichment of fetched records with one-to-many satellite data.
#[async_trait]
pub trait SatelliteStore<L: Listing>: Send + Sync {
    /// Fills satellite fields of `items` with one lookup per satellite, keyed by the ids
    /// of the whole batch.
    async fn attach_satellites(&self, items: &mut [L]) -> Result<(), StorageError>;
}
