use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Paging parameters of a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    anchor_id: Option<String>,
    timeout: Option<Duration>,
}

impl PageRequest {
    /// `limit == 0` means "use the configured default".
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self { limit, anchor_id: None, timeout: None }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor_id: impl Into<String>) -> Self {
        self.anchor_id = Some(anchor_id.into());
        self
    }

    #[must_use]
    pub fn maybe_anchor(mut self, anchor_id: Option<String>) -> Self {
        self.anchor_id = anchor_id;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// The anchor id, treating an empty string as no anchor.
    #[must_use]
    pub fn anchor_id(&self) -> Option<&str> {
        self.anchor_id.as_deref().filter(|id| !id.is_empty())
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// One page of a listing.
///
/// `next_anchor_id` is the id of the last item whenever the page is non-empty, even on the
/// final page; a page shorter than the limit is the end-of-listing signal.
/// `prev_anchor_id` is empty when there is no earlier page or when the earlier page is the
/// head of the listing, which is fetched without an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub next_anchor_id: String,
    pub prev_anchor_id: String,
    pub total: u32,
}

impl<T> PageResult<T> {
    /// A page with no items that still reports the listing's total.
    #[must_use]
    pub const fn empty(total: u32) -> Self {
        Self {
            items: Vec::new(),
            next_anchor_id: String::new(),
            prev_anchor_id: String::new(),
            total,
        }
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        !self.prev_anchor_id.is_empty()
    }
}
