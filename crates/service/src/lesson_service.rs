use roster_core::{Lesson, LessonFilter, PageRequest, PageResult};
use roster_storage::{KeysetStore, SatelliteStore};

use crate::ServiceError;
use crate::engine::PageEngine;

/// One lesson listing request.
#[derive(Debug, Clone, Default)]
pub struct ListLessonsQuery {
    pub filter: LessonFilter,
    /// Locations the caller may see. Empty means unrestricted.
    pub allowed_location_ids: Vec<String>,
    pub page: PageRequest,
}

pub struct LessonQueryService<S> {
    engine: PageEngine<S>,
}

impl<S> LessonQueryService<S>
where
    S: KeysetStore<Lesson> + SatelliteStore<Lesson>,
{
    #[must_use]
    pub const fn new(engine: PageEngine<S>) -> Self {
        Self { engine }
    }

    pub async fn list_lessons(
        &self,
        query: &ListLessonsQuery,
    ) -> Result<PageResult<Lesson>, ServiceError> {
        let Some(location_ids) =
            permitted_locations(&query.filter.location_ids, &query.allowed_location_ids)
        else {
            tracing::debug!("requested locations are outside the allowed set");
            return Ok(PageResult::empty(0));
        };
        let filter = LessonFilter { location_ids, ..query.filter.clone() };
        let filters = filter.compose()?;
        self.engine.paginate(&filters, filter.sort_key(), &query.page).await
    }
}

/// Locations to filter on, or `None` when the request and the allowed set do not overlap.
fn permitted_locations(requested: &[String], allowed: &[String]) -> Option<Vec<String>> {
    match (requested.is_empty(), allowed.is_empty()) {
        (_, true) => Some(requested.to_vec()),
        (true, false) => Some(allowed.to_vec()),
        (false, false) => {
            let both: Vec<String> =
                requested.iter().filter(|id| allowed.contains(id)).cloned().collect();
            (!both.is_empty()).then_some(both)
        },
    }
}
