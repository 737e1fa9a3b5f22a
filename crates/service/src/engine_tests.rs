use std::sync::Arc;
use std::time::Duration;

use roster_core::{
    FilterSet, Listing, PageRequest, PageResult, PagingConfig, SortKey, SortOrder,
    StudentSubscription,
};

use crate::engine::PageEngine;
use crate::error::{QueryStage, ServiceError};
use crate::test_support::{Fault, MemoryStore, numbered, subscription};

type Store = MemoryStore<StudentSubscription>;

fn engine_over(store: Store) -> (PageEngine<Store>, Arc<Store>) {
    let store = Arc::new(store);
    (PageEngine::new(Arc::clone(&store), PagingConfig::default()), store)
}

async fn page(
    engine: &PageEngine<Store>,
    order: SortOrder,
    limit: u32,
    anchor: &str,
) -> PageResult<StudentSubscription> {
    let filters = FilterSet::unfiltered();
    let request = PageRequest::new(limit).with_anchor(anchor);
    engine.paginate(&filters, SortKey::new(order), &request).await.unwrap()
}

fn ids(page: &PageResult<StudentSubscription>) -> Vec<&str> {
    page.items.iter().map(|s| s.student_subscription_id.as_str()).collect()
}

#[tokio::test]
async fn test_walkthrough_of_five_records() {
    let (engine, _) = engine_over(MemoryStore::new(numbered(5)));

    let first = page(&engine, SortOrder::Ascending, 2, "").await;
    assert_eq!(ids(&first), vec!["C1", "C2"]);
    assert_eq!(first.total, 5);
    assert_eq!(first.next_anchor_id, "C2");
    assert_eq!(first.prev_anchor_id, "");

    let second = page(&engine, SortOrder::Ascending, 2, &first.next_anchor_id).await;
    assert_eq!(ids(&second), vec!["C3", "C4"]);
    assert_eq!(second.total, 5);
    assert_eq!(second.prev_anchor_id, "", "previous page is the head");

    let third = page(&engine, SortOrder::Ascending, 2, &second.next_anchor_id).await;
    assert_eq!(ids(&third), vec!["C5"]);
    assert_eq!(third.total, 5);
    assert_eq!(third.next_anchor_id, "C5", "short final page still carries a next anchor");
    assert_eq!(third.prev_anchor_id, "C2");
}

#[tokio::test]
async fn test_prev_anchor_reproduces_previous_page() {
    let (engine, _) = engine_over(MemoryStore::new(numbered(11)));
    for order in [SortOrder::Ascending, SortOrder::Descending] {
        let mut pages = vec![page(&engine, order, 3, "").await];
        while pages.last().is_some_and(|p| p.items.len() == 3) {
            let anchor = pages.last().map(|p| p.next_anchor_id.clone()).unwrap_or_default();
            pages.push(page(&engine, order, 3, &anchor).await);
        }
        assert_eq!(pages.len(), 4);

        for n in 1..pages.len() {
            let previous = page(&engine, order, 3, &pages[n].prev_anchor_id).await;
            assert_eq!(ids(&previous), ids(&pages[n - 1]), "page {n} under {order}");
        }
    }
}

#[tokio::test]
async fn test_pages_are_totally_ordered_and_disjoint() {
    let mut records = numbered(6);
    records.push(subscription("B", 3));
    records.push(subscription("A", 3));
    let (engine, _) = engine_over(MemoryStore::new(records));

    let mut seen = Vec::new();
    let mut anchor = String::new();
    loop {
        let p = page(&engine, SortOrder::Descending, 3, &anchor).await;
        assert_eq!(p.total, 8);
        seen.extend(ids(&p).into_iter().map(str::to_owned));
        if p.items.len() < 3 {
            break;
        }
        anchor = p.next_anchor_id;
    }
    assert_eq!(seen, vec!["C6", "C5", "C4", "C3", "B", "A", "C2", "C1"]);
}

#[tokio::test]
async fn test_anchor_is_never_repeated() {
    let (engine, _) = engine_over(MemoryStore::new(numbered(5)));
    let p = page(&engine, SortOrder::Descending, 10, "C3").await;
    assert_eq!(ids(&p), vec!["C2", "C1"]);
}

#[tokio::test]
async fn test_total_is_independent_of_anchor() {
    let store = MemoryStore::new(numbered(7)).keeping(|s| s.id() != "C4");
    let (engine, _) = engine_over(store);
    for anchor in ["", "C1", "C3", "C7"] {
        assert_eq!(page(&engine, SortOrder::Ascending, 2, anchor).await.total, 6);
    }
}

#[tokio::test]
async fn test_unanchored_request_skips_backward_fetch() {
    let (engine, store) = engine_over(MemoryStore::new(numbered(3)));
    let p = page(&engine, SortOrder::Ascending, 2, "").await;
    assert!(!p.has_previous());
    assert_eq!(store.calls(), vec!["fetch_window", "count", "attach_satellites"]);
}

#[tokio::test]
async fn test_anchored_request_runs_every_step_in_order() {
    let (engine, store) = engine_over(MemoryStore::new(numbered(3)));
    page(&engine, SortOrder::Ascending, 2, "C1").await;
    assert_eq!(
        store.calls(),
        vec!["resolve_anchor", "fetch_window", "fetch_window", "count", "attach_satellites"]
    );
}

#[tokio::test]
async fn test_missing_anchor_returns_empty_page_with_total() {
    let (engine, store) = engine_over(MemoryStore::new(numbered(4)));
    let p = page(&engine, SortOrder::Ascending, 2, "deleted").await;
    assert_eq!(p, PageResult::empty(4));
    assert_eq!(store.calls(), vec!["resolve_anchor", "count"]);
}

#[tokio::test]
async fn test_empty_listing() {
    let (engine, _) = engine_over(MemoryStore::new(Vec::new()));
    let p = page(&engine, SortOrder::Ascending, 2, "").await;
    assert_eq!(p, PageResult::empty(0));
}

#[tokio::test]
async fn test_zero_limit_uses_default_and_large_limit_is_clamped() {
    let store = Arc::new(MemoryStore::new(numbered(30)));
    let config = PagingConfig { default_limit: 4, max_limit: 10, ..PagingConfig::default() };
    let engine = PageEngine::new(store, config);
    assert_eq!(page(&engine, SortOrder::Ascending, 0, "").await.items.len(), 4);
    assert_eq!(page(&engine, SortOrder::Ascending, 500, "").await.items.len(), 10);
}

#[tokio::test]
async fn test_errors_carry_their_stage() {
    let cases = [
        (Fault::Resolve, QueryStage::AnchorResolution),
        (Fault::Fetch(0), QueryStage::ForwardFetch),
        (Fault::Fetch(1), QueryStage::BackwardFetch),
        (Fault::Count, QueryStage::Count),
        (Fault::Satellites, QueryStage::Satellites),
    ];
    for (fault, stage) in cases {
        let (engine, _) = engine_over(MemoryStore::new(numbered(5)).failing_at(fault));
        let request = PageRequest::new(2).with_anchor("C2");
        let err = engine
            .paginate(&FilterSet::unfiltered(), SortKey::new(SortOrder::Ascending), &request)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(stage), "fault {fault:?}");
        assert!(err.is_transient());
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded() {
    let store = MemoryStore::new(numbered(5)).with_count_delay(Duration::from_secs(60));
    let (engine, _) = engine_over(store);
    let request = PageRequest::new(2).with_timeout(Duration::from_secs(5));
    let err = engine
        .paginate(&FilterSet::unfiltered(), SortKey::new(SortOrder::Ascending), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DeadlineExceeded { after } if after.as_secs() == 5));
}

#[tokio::test(start_paused = true)]
async fn test_default_deadline_comes_from_config() {
    let store = MemoryStore::new(numbered(5)).with_count_delay(Duration::from_secs(60));
    let config =
        PagingConfig { request_timeout: Duration::from_secs(30), ..PagingConfig::default() };
    let engine = PageEngine::new(Arc::new(store), config);
    let key = SortKey::new(SortOrder::Ascending);
    let err = engine
        .paginate(&FilterSet::unfiltered(), key, &PageRequest::new(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DeadlineExceeded { after } if after.as_secs() == 30));
}
