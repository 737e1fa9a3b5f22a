//! Student subscription listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::parse_timezone;
use crate::error::FilterError;
use crate::filter::FilterSet;
use crate::listing::Listing;
use crate::predicate::Predicate;
use crate::sort::SortKey;
use crate::value::{CompareOp, Value, ValueList};

/// Enrollment statuses under which a student's subscriptions are listed.
pub const LISTABLE_ENROLLMENT_STATUSES: [&str; 2] =
    ["STUDENT_ENROLLMENT_STATUS_POTENTIAL", "STUDENT_ENROLLMENT_STATUS_ENROLLED"];

/// Compare token used when the caller does not pick a direction: newest first.
pub const DEFAULT_SUBSCRIPTION_COMPARE_TOKEN: &str = "<";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentSubscription {
    pub student_subscription_id: String,
    pub subscription_id: Option<String>,
    pub student_id: String,
    pub course_id: String,
    pub grade: Option<String>,
    pub student_name: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Filled by the satellite lookup.
    #[serde(default)]
    pub location_ids: Vec<String>,
    /// Filled by the satellite lookup.
    #[serde(default)]
    pub class_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionField {
    SubscriptionId,
    StudentId,
    CourseId,
    StartAt,
    EndAt,
    CreatedAt,
    ResourcePath,
    Grade,
    StudentName,
    StudentPhoneticName,
    LocationId,
    ClassId,
    EnrollmentStatus,
    EnrollmentEndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionRelation {
    /// Locations the subscription grants access to.
    AccessPaths,
    /// Classes the student joined for the subscribed course.
    ClassMembership,
    /// The student's enrollment status history.
    Enrollment,
}

impl Listing for StudentSubscription {
    type Field = SubscriptionField;
    type Relation = SubscriptionRelation;

    const NAME: &'static str = "student_subscriptions";
    const SORT_FIELDS: &'static [SubscriptionField] =
        &[SubscriptionField::CreatedAt, SubscriptionField::SubscriptionId];

    fn id(&self) -> &str {
        &self.student_subscription_id
    }

    fn sort_value(&self, field: SubscriptionField) -> Option<Value> {
        match field {
            SubscriptionField::CreatedAt => Some(Value::Timestamp(self.created_at)),
            SubscriptionField::SubscriptionId => {
                Some(Value::Text(self.student_subscription_id.clone()))
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentCourse {
    pub student_id: String,
    pub course_id: String,
}

/// Sparse subscription filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    /// Relational token picking the direction; `>=` is oldest first, default newest first.
    pub compare_token: Option<String>,
    /// Reference time for "enrollment not ended"; the wall clock when absent.
    pub current_time: Option<DateTime<Utc>>,
    pub school_id: Option<String>,
    /// The subscription must cover this day in `timezone` (UTC when absent).
    pub lesson_date: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub keyword: Option<String>,
    pub course_ids: Vec<String>,
    pub grades: Vec<String>,
    pub class_ids: Vec<String>,
    pub location_ids: Vec<String>,
    pub subscription_ids: Vec<String>,
    pub student_courses: Vec<StudentCourse>,
}

impl SubscriptionFilter {
    #[must_use]
    pub fn sort_key(&self) -> SortKey<StudentSubscription> {
        SortKey::from_compare_token(
            self.compare_token.as_deref().unwrap_or(DEFAULT_SUBSCRIPTION_COMPARE_TOKEN),
        )
    }

    /// Validates the inputs and composes the filter set.
    ///
    /// # Errors
    /// Returns `FilterError::UnknownTimezone` for an unrecognised timezone name.
    pub fn compose(&self) -> Result<FilterSet<StudentSubscription>, FilterError> {
        use SubscriptionField as F;

        let now = self.current_time.unwrap_or_else(Utc::now);
        let timezone = match self.timezone.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => parse_timezone(name)?,
            None => chrono_tz::UTC,
        };

        let enrollment = Predicate::related(
            SubscriptionRelation::Enrollment,
            Predicate::and(vec![
                Predicate::InSet {
                    field: F::EnrollmentStatus,
                    values: LISTABLE_ENROLLMENT_STATUSES.into_iter().collect::<ValueList>(),
                },
                Predicate::or(vec![
                    Predicate::Missing { field: F::EnrollmentEndDate },
                    Predicate::compare(F::EnrollmentEndDate, CompareOp::Gt, now),
                ]),
            ]),
        );

        let lesson_date = self.lesson_date.map(|instant| {
            let date = instant.with_timezone(&timezone).date_naive();
            Predicate::and(vec![
                Predicate::LocalDate { field: F::StartAt, timezone, op: CompareOp::Le, date },
                Predicate::LocalDate { field: F::EndAt, timezone, op: CompareOp::Ge, date },
            ])
        });

        let keyword =
            self.keyword.as_deref().map(str::trim).filter(|kw| !kw.is_empty()).and_then(|kw| {
                let matches: Vec<_> = [F::StudentName, F::StudentPhoneticName]
                    .into_iter()
                    .filter_map(|field| Predicate::contains(field, kw))
                    .collect();
                (!matches.is_empty()).then(|| Predicate::or(matches))
            });

        let pairs = (!self.student_courses.is_empty()).then(|| Predicate::PairIn {
            first: F::StudentId,
            second: F::CourseId,
            pairs: self
                .student_courses
                .iter()
                .map(|sc| (sc.student_id.clone(), sc.course_id.clone()))
                .collect(),
        });

        Ok(FilterSet::builder()
            .require(enrollment)
            .maybe(
                self.school_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|id| Predicate::eq(F::ResourcePath, id)),
            )
            .maybe(lesson_date)
            .maybe(Predicate::any_of_text(F::CourseId, &self.course_ids))
            .maybe(pairs)
            .maybe(Predicate::any_of_text(F::SubscriptionId, &self.subscription_ids))
            .maybe(Predicate::any_of_text(F::Grade, &self.grades))
            .maybe(keyword)
            .maybe(
                Predicate::any_of_text(F::ClassId, &self.class_ids)
                    .map(|p| Predicate::related(SubscriptionRelation::ClassMembership, p)),
            )
            .maybe(
                Predicate::any_of_text(F::LocationId, &self.location_ids)
                    .map(|p| Predicate::related(SubscriptionRelation::AccessPaths, p)),
            )
            .build())
    }
}
