use roster_core::{PageRequest, PageResult, StudentSubscription, SubscriptionFilter};
use roster_storage::{KeysetStore, SatelliteStore};

use crate::ServiceError;
use crate::engine::PageEngine;

/// One student subscription listing request.
#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsQuery {
    pub filter: SubscriptionFilter,
    pub page: PageRequest,
}

pub struct SubscriptionQueryService<S> {
    engine: PageEngine<S>,
}

impl<S> SubscriptionQueryService<S>
where
    S: KeysetStore<StudentSubscription> + SatelliteStore<StudentSubscription>,
{
    #[must_use]
    pub const fn new(engine: PageEngine<S>) -> Self {
        Self { engine }
    }

    pub async fn list_subscriptions(
        &self,
        query: &ListSubscriptionsQuery,
    ) -> Result<PageResult<StudentSubscription>, ServiceError> {
        let filters = query.filter.compose()?;
        self.engine.paginate(&filters, query.filter.sort_key(), &query.page).await
    }
}
