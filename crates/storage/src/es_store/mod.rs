//! Elasticsearch keyset store over the REST API.
//!
//! Each listing lives in its own index (see [`IndexNames`]). Documents embed their satellite
//! data, so the satellite step is a no-op here.

mod documents;
mod render;

use async_trait::async_trait;
use roster_core::{Boundary, ES_REQUEST_TIMEOUT_SECS, FilterSet, IndexNames, SortKey};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::traits::{KeysetQuery, KeysetStore, KeysetWindow, SatelliteStore};

pub use documents::{
    EsListing, LessonDocument, MemberDocument, SubscriptionDocument, TeacherDocument,
};

#[derive(Debug, Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
struct SearchResponse<D> {
    hits: SearchHits<D>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
struct SearchHits<D> {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit<D>>,
}

#[derive(Debug, Deserialize)]
struct TotalHits {
    value: u64,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
struct Hit<D> {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: D,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
struct GetResponse<D> {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<D>,
}

/// Client for one Elasticsearch cluster.
#[derive(Clone, Debug)]
pub struct EsStore {
    client: reqwest::Client,
    base_url: Url,
    indices: IndexNames,
}

impl EsStore {
    /// Creates a client for the cluster at `base_url`.
    ///
    /// # Errors
    /// Returns `StorageError::ClientInit` if `base_url` is not a usable base URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, indices: IndexNames) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            StorageError::ClientInit(format!("invalid base url {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::ClientInit(format!("{base_url} cannot be a base url")));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(ES_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::ClientInit(e.to_string()))?;
        tracing::info!(
            base_url = %base_url,
            lessons = %indices.lessons,
            subscriptions = %indices.subscriptions,
            "EsStore initialized"
        );
        Ok(Self { client, base_url, indices })
    }

    /// `{base}/{index}/{segments...}` with every segment percent-encoded as one path segment.
    fn url<L: EsListing>(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(L::index(&self.indices)).extend(segments);
        }
        url
    }

    async fn read_body<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, StorageError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StorageError::SearchStatus { code: status.as_u16(), body });
        }
        serde_json::from_str(&body).map_err(|e| StorageError::corrupt(context, e))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
        context: &str,
    ) -> Result<T, StorageError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::read_body(response, context).await
    }
}

#[async_trait]
impl<L: EsListing> KeysetStore<L> for EsStore {
    async fn resolve_anchor(
        &self,
        sort_key: &SortKey<L>,
        anchor_id: &str,
    ) -> Result<Option<Boundary>, StorageError> {
        // Empty and dot-only ids address no document; `extend` drops dot segments.
        if matches!(anchor_id, "" | "." | "..") {
            return Ok(None);
        }
        let response = self.client.get(self.url::<L>(&["_doc", anchor_id])).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: GetResponse<L::Document> = Self::read_body(response, "anchor document").await?;
        let source = match doc.source {
            Some(source) if doc.found && L::is_live(&source) => source,
            _ => return Ok(None),
        };
        let record = L::from_document(doc.id, source);
        sort_key.boundary_of(&record).map(Some).ok_or_else(|| StorageError::NotFound {
            entity: L::NAME,
            id: format!("sort key of {anchor_id}"),
        })
    }

    async fn fetch_window(
        &self,
        query: &KeysetQuery<'_, L>,
    ) -> Result<KeysetWindow<L>, StorageError> {
        let body =
            render::search_body(query.filters, &query.sort_key, query.boundary, query.limit);
        let response: SearchResponse<L::Document> =
            self.post_json(self.url::<L>(&["_search"]), &body, "search response").await?;
        let matched = response.hits.total.value;
        let items: Vec<L> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| L::from_document(hit.id, hit.source))
            .collect();
        tracing::debug!(
            listing = L::NAME,
            limit = query.limit,
            bounded = query.boundary.is_some(),
            order = %query.sort_key.order(),
            fetched = items.len(),
            matched,
            "keyset window searched"
        );
        Ok(KeysetWindow { items, matched })
    }

    async fn count(&self, filters: &FilterSet<L>) -> Result<u64, StorageError> {
        let body = render::count_body(filters);
        let response: CountResponse =
            self.post_json(self.url::<L>(&["_count"]), &body, "count response").await?;
        Ok(response.count)
    }
}

#[async_trait]
impl<L: EsListing> SatelliteStore<L> for EsStore {
    async fn attach_satellites(&self, _items: &mut [L]) -> Result<(), StorageError> {
        Ok(())
    }
}
