//! Bidirectional keyset pagination over any [`KeysetStore`].
//!
//! One request runs anchor resolution, the forward fetch, the backward fetch (anchored
//! requests only), the exact count and the satellite lookup in that order, all under a single
//! deadline. Nothing is cached between requests.

use std::sync::Arc;

use roster_core::{Boundary, FilterSet, Listing, PageRequest, PageResult, PagingConfig, SortKey};
use roster_storage::{KeysetQuery, KeysetStore, SatelliteStore};

use crate::error::{QueryStage, ServiceError};

pub struct PageEngine<S> {
    store: Arc<S>,
    config: PagingConfig,
}

impl<S> Clone for PageEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), config: self.config.clone() }
    }
}

impl<S> PageEngine<S> {
    #[must_use]
    pub const fn new(store: Arc<S>, config: PagingConfig) -> Self {
        Self { store, config }
    }

    /// Fetches one page of `L` matching `filters`, ordered by `sort_key`, starting after
    /// `request.anchor_id()` when given.
    ///
    /// An anchor that does not resolve yields an empty page carrying the exact total.
    ///
    /// # Errors
    /// `ServiceError::Query` tagged with the failing step, or
    /// `ServiceError::DeadlineExceeded` when the request outlives its deadline.
    pub async fn paginate<L>(
        &self,
        filters: &FilterSet<L>,
        sort_key: SortKey<L>,
        request: &PageRequest,
    ) -> Result<PageResult<L>, ServiceError>
    where
        L: Listing,
        S: KeysetStore<L> + SatelliteStore<L>,
    {
        let deadline = request.timeout().unwrap_or(self.config.request_timeout);
        match tokio::time::timeout(deadline, self.run(filters, sort_key, request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(listing = L::NAME, ?deadline, "page request deadline exceeded");
                Err(ServiceError::DeadlineExceeded { after: deadline })
            },
        }
    }

    async fn run<L>(
        &self,
        filters: &FilterSet<L>,
        sort_key: SortKey<L>,
        request: &PageRequest,
    ) -> Result<PageResult<L>, ServiceError>
    where
        L: Listing,
        S: KeysetStore<L> + SatelliteStore<L>,
    {
        let limit = self.config.effective_limit(request.limit());

        let boundary = match request.anchor_id() {
            Some(anchor_id) => {
                let resolved = self
                    .store
                    .resolve_anchor(&sort_key, anchor_id)
                    .await
                    .map_err(ServiceError::query(QueryStage::AnchorResolution))?;
                if resolved.is_none() {
                    tracing::warn!(listing = L::NAME, anchor_id, "anchor not found");
                    let total = self.total(filters).await?;
                    return Ok(PageResult::empty(total));
                }
                resolved
            },
            None => None,
        };

        let query = KeysetQuery { filters, sort_key, boundary: boundary.as_ref(), limit };
        let window = self
            .store
            .fetch_window(&query)
            .await
            .map_err(ServiceError::query(QueryStage::ForwardFetch))?;

        let prev_anchor_id = match &boundary {
            Some(boundary) => self.previous_anchor(filters, sort_key, boundary, limit).await?,
            None => String::new(),
        };

        let total = self.total(filters).await?;

        let mut items = window.items;
        self.store
            .attach_satellites(&mut items)
            .await
            .map_err(ServiceError::query(QueryStage::Satellites))?;

        let next_anchor_id = items.last().map(|item| item.id().to_owned()).unwrap_or_default();
        tracing::debug!(
            listing = L::NAME,
            limit,
            anchor_id = request.anchor_id().unwrap_or_default(),
            returned = items.len(),
            total,
            "page assembled"
        );
        Ok(PageResult { items, next_anchor_id, prev_anchor_id, total })
    }

    /// Anchor that reproduces the page before `boundary` when paged forward from, or empty
    /// when that page is the head of the listing.
    ///
    /// Walks backwards from the boundary under the inverted key. When more than `limit`
    /// records precede the boundary, the `limit`-th of them (the last one fetched) is the
    /// anchor right before the previous page.
    async fn previous_anchor<L>(
        &self,
        filters: &FilterSet<L>,
        sort_key: SortKey<L>,
        boundary: &Boundary,
        limit: u32,
    ) -> Result<String, ServiceError>
    where
        L: Listing,
        S: KeysetStore<L>,
    {
        let query = KeysetQuery {
            filters,
            sort_key: sort_key.inverted(),
            boundary: Some(boundary),
            limit,
        };
        let window = self
            .store
            .fetch_window(&query)
            .await
            .map_err(ServiceError::query(QueryStage::BackwardFetch))?;
        if window.matched <= u64::from(limit) {
            return Ok(String::new());
        }
        Ok(window.items.last().map(|item| item.id().to_owned()).unwrap_or_default())
    }

    async fn total<L>(&self, filters: &FilterSet<L>) -> Result<u32, ServiceError>
    where
        L: Listing,
        S: KeysetStore<L>,
    {
        let total =
            self.store.count(filters).await.map_err(ServiceError::query(QueryStage::Count))?;
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }
}
