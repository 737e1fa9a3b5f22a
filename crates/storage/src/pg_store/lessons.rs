use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::{Lesson, LessonLearner};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::error::StorageError;
use crate::mapping::parse_stored;
use crate::traits::SatelliteStore;

use super::PgStore;

pub(crate) fn row_to_lesson(row: &PgRow) -> Result<Lesson, StorageError> {
    let start_time: DateTime<Utc> = row.try_get("start_time")?;
    let end_time: DateTime<Utc> = row.try_get("end_time")?;
    let scheduling_status = parse_stored(
        "scheduling_status",
        row.try_get::<Option<String>, _>("scheduling_status")?.as_deref(),
    )
    .unwrap_or_default();
    Ok(Lesson {
        lesson_id: row.try_get("lesson_id")?,
        name: row.try_get("name")?,
        center_id: row.try_get("center_id")?,
        course_id: row.try_get("course_id")?,
        class_id: row.try_get("class_id")?,
        start_time,
        end_time,
        teaching_method: parse_stored(
            "teaching_method",
            row.try_get::<Option<String>, _>("teaching_method")?.as_deref(),
        ),
        teaching_medium: parse_stored(
            "teaching_medium",
            row.try_get::<Option<String>, _>("teaching_medium")?.as_deref(),
        ),
        scheduling_status,
        teacher_ids: Vec::new(),
        learners: Vec::new(),
    })
}

async fn teachers_by_lesson(
    store: &PgStore,
    lesson_ids: &[String],
) -> Result<HashMap<String, Vec<String>>, StorageError> {
    let rows = sqlx::query(
        "SELECT lesson_id, teacher_id
           FROM lessons_teachers
           WHERE lesson_id = ANY($1) AND deleted_at IS NULL
           ORDER BY lesson_id, teacher_id",
    )
    .bind(lesson_ids)
    .fetch_all(&store.pool)
    .await?;
    let mut teachers: HashMap<String, Vec<String>> = HashMap::new();
    for row in &rows {
        teachers.entry(row.try_get("lesson_id")?).or_default().push(row.try_get("teacher_id")?);
    }
    Ok(teachers)
}

async fn learners_by_lesson(
    store: &PgStore,
    lesson_ids: &[String],
) -> Result<HashMap<String, Vec<LessonLearner>>, StorageError> {
    let rows = sqlx::query(
        "SELECT lesson_id, user_id, course_id, attendance_status
           FROM lesson_members
           WHERE lesson_id = ANY($1) AND deleted_at IS NULL
           ORDER BY lesson_id, user_id",
    )
    .bind(lesson_ids)
    .fetch_all(&store.pool)
    .await?;
    let mut learners: HashMap<String, Vec<LessonLearner>> = HashMap::new();
    for row in &rows {
        learners.entry(row.try_get("lesson_id")?).or_default().push(LessonLearner {
            student_id: row.try_get("user_id")?,
            course_id: row.try_get("course_id")?,
            attendance_status: row.try_get("attendance_status")?,
        });
    }
    Ok(learners)
}

#[async_trait]
impl SatelliteStore<Lesson> for PgStore {
    async fn attach_satellites(&self, items: &mut [Lesson]) -> Result<(), StorageError> {
        if items.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = items.iter().map(|l| l.lesson_id.clone()).collect();
        let mut teachers = teachers_by_lesson(self, &ids).await?;
        let mut learners = learners_by_lesson(self, &ids).await?;
        for lesson in items.iter_mut() {
            lesson.teacher_ids = teachers.remove(&lesson.lesson_id).unwrap_or_default();
            lesson.learners = learners.remove(&lesson.lesson_id).unwrap_or_default();
        }
        Ok(())
    }
}
