use std::sync::Arc;

use chrono::Weekday;
use roster_core::{
    Lesson, LessonFilter, LessonTime, PageRequest, PageResult, PagingConfig,
    SubscriptionFilter,
};

use crate::engine::PageEngine;
use crate::test_support::{MemoryStore, minute, numbered};
use crate::{
    LessonQueryService, ListLessonsQuery, ListSubscriptionsQuery, SubscriptionQueryService,
};

fn lesson(id: &str, start_minute: i64) -> Lesson {
    Lesson {
        lesson_id: id.to_owned(),
        start_time: minute(start_minute),
        end_time: minute(start_minute + 30),
        ..Lesson::default()
    }
}

fn lesson_service(
    lessons: Vec<Lesson>,
) -> (LessonQueryService<MemoryStore<Lesson>>, Arc<MemoryStore<Lesson>>) {
    let store = Arc::new(MemoryStore::new(lessons));
    let engine = PageEngine::new(Arc::clone(&store), PagingConfig::default());
    (LessonQueryService::new(engine), store)
}

fn future_lessons() -> ListLessonsQuery {
    ListLessonsQuery {
        filter: LessonFilter {
            lesson_time: LessonTime::Future,
            current_time: Some(minute(0)),
            ..LessonFilter::default()
        },
        allowed_location_ids: Vec::new(),
        page: PageRequest::new(2),
    }
}

fn lesson_ids(page: &PageResult<Lesson>) -> Vec<&str> {
    page.items.iter().map(|l| l.lesson_id.as_str()).collect()
}

#[tokio::test]
async fn test_future_lessons_are_earliest_first() {
    let lessons = vec![lesson("L3", 30), lesson("L1", 10), lesson("L2", 20)];
    let (service, _) = lesson_service(lessons);
    let page = service.list_lessons(&future_lessons()).await.unwrap();
    assert_eq!(lesson_ids(&page), vec!["L1", "L2"]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn test_past_lessons_are_latest_first() {
    let lessons = vec![lesson("L1", 10), lesson("L2", 20), lesson("L3", 30)];
    let (service, _) = lesson_service(lessons);
    let mut query = future_lessons();
    query.filter.lesson_time = LessonTime::Past;
    query.filter.current_time = Some(minute(100));
    let page = service.list_lessons(&query).await.unwrap();
    assert_eq!(lesson_ids(&page), vec!["L3", "L2"]);
}

#[tokio::test]
async fn test_disjoint_locations_short_circuit() {
    let (service, store) = lesson_service(vec![lesson("L1", 10)]);
    let mut query = future_lessons();
    query.filter.location_ids = vec!["center-a".to_owned()];
    query.allowed_location_ids = vec!["center-b".to_owned()];
    let page = service.list_lessons(&query).await.unwrap();
    assert_eq!(page, PageResult::empty(0));
    assert!(store.calls().is_empty(), "no query may run");
}

#[tokio::test]
async fn test_invalid_filter_is_rejected_before_any_query() {
    let (service, store) = lesson_service(vec![lesson("L1", 10)]);
    let mut query = future_lessons();
    query.filter.days_of_week = vec![Weekday::Mon];
    let err = service.list_lessons(&query).await.unwrap_err();
    assert!(err.is_invalid_argument());

    let mut query = future_lessons();
    query.filter.current_time = None;
    let err = service.list_lessons(&query).await.unwrap_err();
    assert!(err.is_invalid_argument());

    let mut query = future_lessons();
    query.filter.timezone = Some("Asia/Tokyo".to_owned());
    query.filter.from_time = Some("25:00".to_owned());
    let err = service.list_lessons(&query).await.unwrap_err();
    assert!(err.is_invalid_argument());

    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_subscriptions_default_to_newest_first() {
    let store = Arc::new(MemoryStore::new(numbered(4)));
    let service =
        SubscriptionQueryService::new(PageEngine::new(store, PagingConfig::default()));

    let query = ListSubscriptionsQuery {
        filter: SubscriptionFilter::default(),
        page: PageRequest::new(3),
    };
    let page = service.list_subscriptions(&query).await.unwrap();
    let ids: Vec<&str> =
        page.items.iter().map(|s| s.student_subscription_id.as_str()).collect();
    assert_eq!(ids, vec!["C4", "C3", "C2"]);
    assert_eq!(page.next_anchor_id, "C2");

    let query = ListSubscriptionsQuery {
        filter: SubscriptionFilter {
            compare_token: Some(">=".to_owned()),
            ..SubscriptionFilter::default()
        },
        page: PageRequest::new(3).with_anchor("C1"),
    };
    let page = service.list_subscriptions(&query).await.unwrap();
    let ids: Vec<&str> =
        page.items.iter().map(|s| s.student_subscription_id.as_str()).collect();
    assert_eq!(ids, vec!["C2", "C3", "C4"]);
    assert_eq!(page.prev_anchor_id, "");
}

#[tokio::test]
async fn test_unknown_timezone_is_invalid_argument() {
    let store = Arc::new(MemoryStore::new(numbered(1)));
    let service =
        SubscriptionQueryService::new(PageEngine::new(store, PagingConfig::default()));
    let query = ListSubscriptionsQuery {
        filter: SubscriptionFilter {
            timezone: Some("Mars/Olympus".to_owned()),
            ..SubscriptionFilter::default()
        },
        page: PageRequest::new(3),
    };
    let err = service.list_subscriptions(&query).await.unwrap_err();
    assert!(err.is_invalid_argument());
}
