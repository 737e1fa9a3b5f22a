//! In-memory store used by the engine and service tests.

use std::cmp::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use roster_core::{Boundary, FilterSet, Listing, SortKey, StudentSubscription};
use roster_storage::{KeysetQuery, KeysetStore, KeysetWindow, SatelliteStore, StorageError};

/// Step at which [`MemoryStore`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Resolve,
    /// The n-th `fetch_window` call, counting from zero.
    Fetch(usize),
    Count,
    Satellites,
}

/// Sorted, filtered reads over a fixed record set. `keep` stands in for the filter set.
pub(crate) struct MemoryStore<L> {
    records: Vec<L>,
    keep: fn(&L) -> bool,
    fault: Option<Fault>,
    count_delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
    fetches: Mutex<usize>,
}

impl<L: Listing> MemoryStore<L> {
    pub(crate) fn new(records: Vec<L>) -> Self {
        Self {
            records,
            keep: |_| true,
            fault: None,
            count_delay: None,
            calls: Mutex::new(Vec::new()),
            fetches: Mutex::new(0),
        }
    }

    pub(crate) fn keeping(mut self, keep: fn(&L) -> bool) -> Self {
        self.keep = keep;
        self
    }

    pub(crate) fn failing_at(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub(crate) fn with_count_delay(mut self, delay: Duration) -> Self {
        self.count_delay = Some(delay);
        self
    }

    /// Store operations in call order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn fail_if(&self, fault: Fault) -> Result<(), StorageError> {
        if self.fault == Some(fault) {
            return Err(StorageError::SearchStatus { code: 503, body: "injected".to_owned() });
        }
        Ok(())
    }

    fn matching(&self) -> impl Iterator<Item = &L> {
        self.records.iter().filter(|r| (self.keep)(r))
    }
}

#[async_trait]
impl<L: Listing> KeysetStore<L> for MemoryStore<L> {
    async fn resolve_anchor(
        &self,
        sort_key: &SortKey<L>,
        anchor_id: &str,
    ) -> Result<Option<Boundary>, StorageError> {
        self.record("resolve_anchor");
        self.fail_if(Fault::Resolve)?;
        Ok(self.records.iter().find(|r| r.id() == anchor_id).and_then(|r| sort_key.boundary_of(r)))
    }

    async fn fetch_window(
        &self,
        query: &KeysetQuery<'_, L>,
    ) -> Result<KeysetWindow<L>, StorageError> {
        self.record("fetch_window");
        let nth = match self.fetches.lock() {
            Ok(mut fetches) => {
                *fetches += 1;
                *fetches - 1
            },
            Err(_) => 0,
        };
        self.fail_if(Fault::Fetch(nth))?;

        let mut matched: Vec<L> = self
            .matching()
            .filter(|r| {
                query.boundary.is_none_or(|b| {
                    query.sort_key.compare_to_boundary(r, b) == Ordering::Greater
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.sort_key.compare(a, b));
        let total = matched.len() as u64;
        matched.truncate(query.limit as usize);
        Ok(KeysetWindow { items: matched, matched: total })
    }

    async fn count(&self, _filters: &FilterSet<L>) -> Result<u64, StorageError> {
        self.record("count");
        if let Some(delay) = self.count_delay {
            tokio::time::sleep(delay).await;
        }
        self.fail_if(Fault::Count)?;
        Ok(self.matching().count() as u64)
    }
}

#[async_trait]
impl<L: Listing> SatelliteStore<L> for MemoryStore<L> {
    async fn attach_satellites(&self, _items: &mut [L]) -> Result<(), StorageError> {
        self.record("attach_satellites");
        self.fail_if(Fault::Satellites)
    }
}

pub(crate) fn minute(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).single().unwrap_or_default()
        + chrono::Duration::minutes(n)
}

pub(crate) fn subscription(id: &str, created_minute: i64) -> StudentSubscription {
    StudentSubscription {
        student_subscription_id: id.to_owned(),
        student_id: format!("student-{id}"),
        course_id: "course-1".to_owned(),
        created_at: minute(created_minute),
        ..StudentSubscription::default()
    }
}

/// `C1..=Cn` created one minute apart, in creation order.
pub(crate) fn numbered(n: i64) -> Vec<StudentSubscription> {
    (1..=n).map(|i| subscription(&format!("C{i}"), i)).collect()
}
