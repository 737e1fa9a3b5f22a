//! Index documents and their mapping onto listings.
//!
//! Documents embed their satellites, so mapping a hit yields a complete entity. Names are
//! indexed twice: as given, and whitespace-stripped under `*_normalized` keyword fields for
//! substring matching.

use chrono::{DateTime, Utc};
use roster_core::{
    IndexNames, Lesson, LessonField, LessonLearner, LessonRelation, Listing, StudentSubscription,
    SubscriptionField, SubscriptionRelation,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::mapping::parse_stored;

/// How a listing maps onto an index.
pub trait EsListing: Listing + Sized {
    type Document: DeserializeOwned + Send + 'static;

    fn index(indices: &IndexNames) -> &str;

    fn field_path(field: Self::Field) -> &'static str;

    /// Nested path of a relation, `None` when its fields are plain (possibly array) fields
    /// of the root document.
    fn relation_path(relation: Self::Relation) -> Option<&'static str>;

    fn is_live(doc: &Self::Document) -> bool;

    fn from_document(id: String, doc: Self::Document) -> Self;
}

#[derive(Debug, Clone, Deserialize)]
pub struct LessonDocument {
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub center_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub teaching_method: Option<String>,
    #[serde(default)]
    pub teaching_medium: Option<String>,
    #[serde(default)]
    pub scheduling_status: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lessons_teachers: Vec<TeacherDocument>,
    #[serde(default)]
    pub lesson_members: Vec<MemberDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherDocument {
    pub teacher_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberDocument {
    pub student_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub attendance_status: Option<String>,
}

impl EsListing for Lesson {
    type Document = LessonDocument;

    fn index(indices: &IndexNames) -> &str {
        &indices.lessons
    }

    fn field_path(field: LessonField) -> &'static str {
        match field {
            LessonField::LessonId => "lesson_id",
            LessonField::StartTime => "start_time",
            LessonField::EndTime => "end_time",
            LessonField::CenterId => "center_id",
            LessonField::CourseId => "course_id",
            LessonField::ClassId => "class_id",
            LessonField::SchedulingStatus => "scheduling_status",
            LessonField::ResourcePath => "resource_path",
            LessonField::TeacherId => "lessons_teachers.teacher_id",
            LessonField::MemberStudentId => "lesson_members.student_id",
            LessonField::MemberCourseId => "lesson_members.course_id",
            LessonField::MemberGrade => "lesson_members.grade",
            LessonField::MemberName => "lesson_members.name_normalized",
            LessonField::MemberPhoneticName => "lesson_members.full_name_phonetic_normalized",
        }
    }

    fn relation_path(relation: LessonRelation) -> Option<&'static str> {
        match relation {
            LessonRelation::Teachers => Some("lessons_teachers"),
            LessonRelation::Members => Some("lesson_members"),
        }
    }

    fn is_live(doc: &LessonDocument) -> bool {
        doc.deleted_at.is_none()
    }

    fn from_document(id: String, doc: LessonDocument) -> Self {
        Self {
            lesson_id: doc.lesson_id.unwrap_or(id),
            name: doc.name,
            center_id: doc.center_id,
            course_id: doc.course_id,
            class_id: doc.class_id,
            start_time: doc.start_time,
            end_time: doc.end_time,
            teaching_method: parse_stored("teaching_method", doc.teaching_method.as_deref()),
            teaching_medium: parse_stored("teaching_medium", doc.teaching_medium.as_deref()),
            scheduling_status: parse_stored(
                "scheduling_status",
                doc.scheduling_status.as_deref(),
            )
            .unwrap_or_default(),
            teacher_ids: doc.lessons_teachers.into_iter().map(|t| t.teacher_id).collect(),
            learners: doc
                .lesson_members
                .into_iter()
                .map(|m| LessonLearner {
                    student_id: m.student_id,
                    course_id: m.course_id,
                    attendance_status: m.attendance_status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionDocument {
    #[serde(default)]
    pub student_subscription_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    pub student_id: String,
    pub course_id: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_ids: Vec<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

impl EsListing for StudentSubscription {
    type Document = SubscriptionDocument;

    fn index(indices: &IndexNames) -> &str {
        &indices.subscriptions
    }

    fn field_path(field: SubscriptionField) -> &'static str {
        match field {
            SubscriptionField::SubscriptionId => "student_subscription_id",
            SubscriptionField::StudentId => "student_id",
            SubscriptionField::CourseId => "course_id",
            SubscriptionField::StartAt => "start_at",
            SubscriptionField::EndAt => "end_at",
            SubscriptionField::CreatedAt => "created_at",
            SubscriptionField::ResourcePath => "resource_path",
            SubscriptionField::Grade => "grade",
            SubscriptionField::StudentName => "student_name_normalized",
            SubscriptionField::StudentPhoneticName => "full_name_phonetic_normalized",
            SubscriptionField::LocationId => "location_ids",
            SubscriptionField::ClassId => "class_id",
            SubscriptionField::EnrollmentStatus => "enrollment_status_histories.enrollment_status",
            SubscriptionField::EnrollmentEndDate => "enrollment_status_histories.end_date",
        }
    }

    fn relation_path(relation: SubscriptionRelation) -> Option<&'static str> {
        match relation {
            SubscriptionRelation::AccessPaths | SubscriptionRelation::ClassMembership => None,
            SubscriptionRelation::Enrollment => Some("enrollment_status_histories"),
        }
    }

    fn is_live(doc: &SubscriptionDocument) -> bool {
        doc.deleted_at.is_none()
    }

    fn from_document(id: String, doc: SubscriptionDocument) -> Self {
        Self {
            student_subscription_id: doc.student_subscription_id.unwrap_or(id),
            subscription_id: doc.subscription_id,
            student_id: doc.student_id,
            course_id: doc.course_id,
            grade: doc.grade,
            student_name: doc.student_name,
            start_at: doc.start_at,
            end_at: doc.end_at,
            created_at: doc.created_at,
            location_ids: doc.location_ids,
            class_id: doc.class_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use roster_core::SchedulingStatus;

    use super::*;

    #[test]
    fn test_lesson_document_embeds_satellites() {
        let doc: LessonDocument = serde_json::from_value(serde_json::json!({
            "start_time": "2022-06-27T01:00:00Z",
            "end_time": "2022-06-27T02:00:00Z",
            "scheduling_status": "LESSON_SCHEDULING_STATUS_COMPLETED",
            "teaching_method": "LESSON_TEACHING_METHOD_GROUP",
            "lessons_teachers": [{"teacher_id": "t1"}, {"teacher_id": "t2"}],
            "lesson_members": [{"student_id": "s1", "course_id": "c1"}]
        }))
        .unwrap_or_else(|e| panic!("document should parse: {e}"));
        assert!(Lesson::is_live(&doc));

        let lesson = Lesson::from_document("l-9".to_owned(), doc);
        assert_eq!(lesson.lesson_id, "l-9");
        assert_eq!(lesson.scheduling_status, SchedulingStatus::Completed);
        assert_eq!(lesson.teacher_ids, vec!["t1".to_owned(), "t2".to_owned()]);
        assert_eq!(lesson.learners.len(), 1);
        assert_eq!(lesson.learners[0].course_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_deleted_subscription_is_not_live() {
        let doc: SubscriptionDocument = serde_json::from_value(serde_json::json!({
            "student_id": "s1",
            "course_id": "c1",
            "created_at": "2022-01-01T00:00:00Z",
            "deleted_at": "2022-02-01T00:00:00Z"
        }))
        .unwrap_or_else(|e| panic!("document should parse: {e}"));
        assert!(!StudentSubscription::is_live(&doc));
    }
}
