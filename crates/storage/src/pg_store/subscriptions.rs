use std::collections::HashMap;

use async_trait::async_trait;
use roster_core::StudentSubscription;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::error::StorageError;
use crate::traits::SatelliteStore;

use super::PgStore;

pub(crate) fn row_to_subscription(row: &PgRow) -> Result<StudentSubscription, StorageError> {
    Ok(StudentSubscription {
        student_subscription_id: row.try_get("student_subscription_id")?,
        subscription_id: row.try_get("subscription_id")?,
        student_id: row.try_get("student_id")?,
        course_id: row.try_get("course_id")?,
        grade: row.try_get("grade_id")?,
        student_name: row.try_get("student_name")?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
        created_at: row.try_get("created_at")?,
        location_ids: Vec::new(),
        class_id: None,
    })
}

async fn locations_by_subscription(
    store: &PgStore,
    subscription_ids: &[String],
) -> Result<HashMap<String, Vec<String>>, StorageError> {
    let rows = sqlx::query(
        "SELECT student_subscription_id, location_id
           FROM lesson_student_subscription_access_path
           WHERE student_subscription_id = ANY($1) AND deleted_at IS NULL
           ORDER BY student_subscription_id, location_id",
    )
    .bind(subscription_ids)
    .fetch_all(&store.pool)
    .await?;
    let mut locations: HashMap<String, Vec<String>> = HashMap::new();
    for row in &rows {
        locations
            .entry(row.try_get("student_subscription_id")?)
            .or_default()
            .push(row.try_get("location_id")?);
    }
    Ok(locations)
}

/// Class of each `(student_id, course_id)` pair. A student joins at most one class per course.
async fn classes_by_student_course(
    store: &PgStore,
    student_ids: Vec<String>,
    course_ids: Vec<String>,
) -> Result<HashMap<(String, String), String>, StorageError> {
    let rows = sqlx::query(
        "SELECT cm.user_id, c.course_id, cm.class_id
           FROM class_member cm
           JOIN class c ON c.class_id = cm.class_id
           WHERE cm.deleted_at IS NULL
             AND (cm.user_id, c.course_id) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))
           ORDER BY cm.user_id, c.course_id, cm.class_id",
    )
    .bind(student_ids)
    .bind(course_ids)
    .fetch_all(&store.pool)
    .await?;
    let mut classes = HashMap::with_capacity(rows.len());
    for row in &rows {
        classes
            .entry((row.try_get("user_id")?, row.try_get("course_id")?))
            .or_insert(row.try_get("class_id")?);
    }
    Ok(classes)
}

#[async_trait]
impl SatelliteStore<StudentSubscription> for PgStore {
    async fn attach_satellites(
        &self,
        items: &mut [StudentSubscription],
    ) -> Result<(), StorageError> {
        if items.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = items.iter().map(|s| s.student_subscription_id.clone()).collect();
        let (student_ids, course_ids): (Vec<String>, Vec<String>) =
            items.iter().map(|s| (s.student_id.clone(), s.course_id.clone())).unzip();

        let mut locations = locations_by_subscription(self, &ids).await?;
        let classes = classes_by_student_course(self, student_ids, course_ids).await?;

        for item in items.iter_mut() {
            item.location_ids = locations.remove(&item.student_subscription_id).unwrap_or_default();
            item.class_id =
                classes.get(&(item.student_id.clone(), item.course_id.clone())).cloned();
        }
        Ok(())
    }
}
