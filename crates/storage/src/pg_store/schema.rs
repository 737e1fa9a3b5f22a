//! Table and column mapping of each listing.

use roster_core::{
    Lesson, LessonField, LessonRelation, Listing, StudentSubscription, SubscriptionField,
    SubscriptionRelation,
};
use sqlx::postgres::PgRow;

use crate::error::StorageError;

/// A satellite table joined through a correlated `EXISTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgRelation {
    /// `FROM` list of the subquery, aliased.
    pub from: &'static str,
    /// Join condition against the primary alias, including the satellite's liveness check.
    pub correlate: &'static str,
}

/// How a listing maps onto PostgreSQL tables.
pub trait PgListing: Listing + Sized {
    /// Primary `FROM` clause, including one-to-one joins.
    const FROM: &'static str;
    /// Columns read by [`PgListing::from_row`].
    const SELECT: &'static str;
    /// Condition satisfied by every live row.
    const LIVE: &'static str;
    /// Qualified primary id column.
    const ID_COLUMN: &'static str;

    fn column(field: Self::Field) -> &'static str;

    fn relation(relation: Self::Relation) -> PgRelation;

    fn from_row(row: &PgRow) -> Result<Self, StorageError>;
}

impl PgListing for Lesson {
    const FROM: &'static str = "lessons l";
    const SELECT: &'static str = "l.lesson_id, l.name, l.center_id, l.course_id, l.class_id, \
        l.start_time, l.end_time, l.teaching_method, l.teaching_medium, l.scheduling_status";
    const LIVE: &'static str = "l.deleted_at IS NULL";
    const ID_COLUMN: &'static str = "l.lesson_id";

    fn column(field: LessonField) -> &'static str {
        match field {
            LessonField::LessonId => "l.lesson_id",
            LessonField::StartTime => "l.start_time",
            LessonField::EndTime => "l.end_time",
            LessonField::CenterId => "l.center_id",
            LessonField::CourseId => "l.course_id",
            LessonField::ClassId => "l.class_id",
            LessonField::SchedulingStatus => "l.scheduling_status",
            LessonField::ResourcePath => "l.resource_path",
            LessonField::TeacherId => "lt.teacher_id",
            LessonField::MemberStudentId => "lm.user_id",
            LessonField::MemberCourseId => "lm.course_id",
            LessonField::MemberGrade => "ubi.grade_id",
            LessonField::MemberName => "ubi.name",
            LessonField::MemberPhoneticName => "ubi.full_name_phonetic",
        }
    }

    fn relation(relation: LessonRelation) -> PgRelation {
        match relation {
            LessonRelation::Teachers => PgRelation {
                from: "lessons_teachers lt",
                correlate: "lt.lesson_id = l.lesson_id AND lt.deleted_at IS NULL",
            },
            LessonRelation::Members => PgRelation {
                from: "lesson_members lm LEFT JOIN user_basic_info ubi \
                    ON ubi.user_id = lm.user_id AND ubi.deleted_at IS NULL",
                correlate: "lm.lesson_id = l.lesson_id AND lm.deleted_at IS NULL",
            },
        }
    }

    fn from_row(row: &PgRow) -> Result<Self, StorageError> {
        super::lessons::row_to_lesson(row)
    }
}

impl PgListing for StudentSubscription {
    const FROM: &'static str = "lesson_student_subscriptions lss LEFT JOIN user_basic_info ubi \
        ON ubi.user_id = lss.student_id AND ubi.deleted_at IS NULL";
    const SELECT: &'static str = "lss.student_subscription_id, lss.subscription_id, \
        lss.student_id, lss.course_id, lss.start_at, lss.end_at, lss.created_at, \
        ubi.grade_id, ubi.name AS student_name";
    const LIVE: &'static str = "lss.deleted_at IS NULL";
    const ID_COLUMN: &'static str = "lss.student_subscription_id";

    fn column(field: SubscriptionField) -> &'static str {
        match field {
            SubscriptionField::SubscriptionId => "lss.student_subscription_id",
            SubscriptionField::StudentId => "lss.student_id",
            SubscriptionField::CourseId => "lss.course_id",
            SubscriptionField::StartAt => "lss.start_at",
            SubscriptionField::EndAt => "lss.end_at",
            SubscriptionField::CreatedAt => "lss.created_at",
            SubscriptionField::ResourcePath => "lss.resource_path",
            SubscriptionField::Grade => "ubi.grade_id",
            SubscriptionField::StudentName => "ubi.name",
            SubscriptionField::StudentPhoneticName => "ubi.full_name_phonetic",
            SubscriptionField::LocationId => "ap.location_id",
            SubscriptionField::ClassId => "cm.class_id",
            SubscriptionField::EnrollmentStatus => "sesh.enrollment_status",
            SubscriptionField::EnrollmentEndDate => "sesh.end_date",
        }
    }

    fn relation(relation: SubscriptionRelation) -> PgRelation {
        match relation {
            SubscriptionRelation::AccessPaths => PgRelation {
                from: "lesson_student_subscription_access_path ap",
                correlate: "ap.student_subscription_id = lss.student_subscription_id \
                    AND ap.deleted_at IS NULL",
            },
            SubscriptionRelation::ClassMembership => PgRelation {
                from: "class_member cm JOIN class c ON c.class_id = cm.class_id",
                correlate: "cm.user_id = lss.student_id AND c.course_id = lss.course_id \
                    AND cm.deleted_at IS NULL",
            },
            SubscriptionRelation::Enrollment => PgRelation {
                from: "student_enrollment_status_history sesh",
                correlate: "sesh.student_id = lss.student_id AND sesh.deleted_at IS NULL",
            },
        }
    }

    fn from_row(row: &PgRow) -> Result<Self, StorageError> {
        super::subscriptions::row_to_subscription(row)
    }
}
