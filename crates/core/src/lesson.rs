//! Lesson listing: entity, filterable fields, and the filter composer.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::clock::{parse_time_of_day, parse_timezone};
use crate::error::FilterError;
use crate::filter::FilterSet;
use crate::listing::Listing;
use crate::predicate::Predicate;
use crate::sort::SortKey;
use crate::value::{CompareOp, Value, ValueList};

macro_rules! stored_enum {
    ($name:ident, $label:literal, { $($variant:ident => $stored:literal),+ $(,)? }) => {
        impl $name {
            /// Stored string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $stored),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = FilterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($stored => Ok(Self::$variant),)+
                    _ => Err(FilterError::InvalidEnum { field: $label, value: s.to_owned() }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulingStatus {
    #[default]
    Published,
    Draft,
    Completed,
    Canceled,
}

stored_enum!(SchedulingStatus, "scheduling status", {
    Published => "LESSON_SCHEDULING_STATUS_PUBLISHED",
    Draft => "LESSON_SCHEDULING_STATUS_DRAFT",
    Completed => "LESSON_SCHEDULING_STATUS_COMPLETED",
    Canceled => "LESSON_SCHEDULING_STATUS_CANCELED",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeachingMethod {
    Individual,
    Group,
}

stored_enum!(TeachingMethod, "teaching method", {
    Individual => "LESSON_TEACHING_METHOD_INDIVIDUAL",
    Group => "LESSON_TEACHING_METHOD_GROUP",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeachingMedium {
    Offline,
    Online,
    Hybrid,
}

stored_enum!(TeachingMedium, "teaching medium", {
    Offline => "LESSON_TEACHING_MEDIUM_OFFLINE",
    Online => "LESSON_TEACHING_MEDIUM_ONLINE",
    Hybrid => "LESSON_TEACHING_MEDIUM_HYBRID",
});

/// A student attending a lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonLearner {
    pub student_id: String,
    pub course_id: Option<String>,
    pub attendance_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_id: String,
    pub name: Option<String>,
    pub center_id: Option<String>,
    pub course_id: Option<String>,
    pub class_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub teaching_method: Option<TeachingMethod>,
    pub teaching_medium: Option<TeachingMedium>,
    pub scheduling_status: SchedulingStatus,
    /// Filled by the satellite lookup.
    #[serde(default)]
    pub teacher_ids: Vec<String>,
    /// Filled by the satellite lookup.
    #[serde(default)]
    pub learners: Vec<LessonLearner>,
}

/// Columns a lesson predicate may reference. `Member*` fields live on the lesson members
/// relation, `TeacherId` on the lesson teachers relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonField {
    LessonId,
    StartTime,
    EndTime,
    CenterId,
    CourseId,
    ClassId,
    SchedulingStatus,
    ResourcePath,
    TeacherId,
    MemberStudentId,
    MemberCourseId,
    MemberGrade,
    MemberName,
    MemberPhoneticName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonRelation {
    Teachers,
    Members,
}

impl Listing for Lesson {
    type Field = LessonField;
    type Relation = LessonRelation;

    const NAME: &'static str = "lessons";
    const SORT_FIELDS: &'static [LessonField] =
        &[LessonField::StartTime, LessonField::EndTime, LessonField::LessonId];

    fn id(&self) -> &str {
        &self.lesson_id
    }

    fn sort_value(&self, field: LessonField) -> Option<Value> {
        match field {
            LessonField::StartTime => Some(Value::Timestamp(self.start_time)),
            LessonField::EndTime => Some(Value::Timestamp(self.end_time)),
            LessonField::LessonId => Some(Value::Text(self.lesson_id.clone())),
            _ => None,
        }
    }
}

/// Which side of "now" a lesson listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonTime {
    /// Upcoming lessons, earliest first.
    #[default]
    Future,
    /// Finished or started lessons, latest first.
    Past,
}

impl LessonTime {
    /// Comparison of `start_time` against the current time. Also fixes the sort direction.
    #[must_use]
    pub const fn compare_token(self) -> &'static str {
        match self {
            Self::Future => ">=",
            Self::Past => "<",
        }
    }

    const fn start_time_op(self) -> CompareOp {
        match self {
            Self::Future => CompareOp::Ge,
            Self::Past => CompareOp::Lt,
        }
    }
}

/// Sparse lesson filter inputs. Every field is optional; empty lists and blank strings
/// impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonFilter {
    pub lesson_time: LessonTime,
    pub current_time: Option<DateTime<Utc>>,
    pub school_id: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub days_of_week: Vec<Weekday>,
    /// `HH:MM:SS`, compared against the local end time.
    pub from_time: Option<String>,
    /// `HH:MM:SS`, compared against the local start time.
    pub to_time: Option<String>,
    pub timezone: Option<String>,
    pub keyword: Option<String>,
    pub location_ids: Vec<String>,
    pub teacher_ids: Vec<String>,
    pub student_ids: Vec<String>,
    pub course_ids: Vec<String>,
    pub grades: Vec<String>,
    pub class_ids: Vec<String>,
    pub scheduling_statuses: Vec<SchedulingStatus>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl LessonFilter {
    #[must_use]
    pub fn sort_key(&self) -> SortKey<Lesson> {
        SortKey::from_compare_token(self.lesson_time.compare_token())
    }

    /// Validates the inputs and composes the filter set.
    ///
    /// # Errors
    /// Returns `FilterError` for a missing current time, an unknown timezone, a timezone
    /// missing while a day-of-week or time-of-day filter is set, or an unparsable time.
    pub fn compose(&self) -> Result<FilterSet<Lesson>, FilterError> {
        let now = self.current_time.ok_or(FilterError::MissingCurrentTime)?;
        let from_time = non_blank(self.from_time.as_ref()).map(parse_time_of_day).transpose()?;
        let to_time = non_blank(self.to_time.as_ref()).map(parse_time_of_day).transpose()?;

        let needs_timezone =
            !self.days_of_week.is_empty() || from_time.is_some() || to_time.is_some();
        let timezone = match non_blank(self.timezone.as_ref()) {
            Some(name) => Some(parse_timezone(name)?),
            None if needs_timezone => return Err(FilterError::MissingTimezone),
            None => None,
        };

        let school = non_blank(self.school_id.as_ref())
            .map(|id| Predicate::eq(LessonField::ResourcePath, id));
        let mut builder = FilterSet::builder()
            .require(Predicate::compare(
                LessonField::StartTime,
                self.lesson_time.start_time_op(),
                now,
            ))
            .maybe(school)
            .maybe(self.from_date.map(|d| Predicate::compare(LessonField::EndTime, CompareOp::Ge, d)))
            .maybe(
                self.to_date.map(|d| Predicate::compare(LessonField::StartTime, CompareOp::Le, d)),
            );

        if let Some(tz) = timezone {
            if !self.days_of_week.is_empty() {
                builder = builder.require(Predicate::LocalDayOfWeek {
                    field: LessonField::StartTime,
                    timezone: tz,
                    days: self.days_of_week.clone(),
                });
            }
            if let Some(time) = from_time {
                builder = builder.require(Predicate::LocalTimeOfDay {
                    field: LessonField::EndTime,
                    timezone: tz,
                    op: CompareOp::Ge,
                    time,
                });
            }
            if let Some(time) = to_time {
                builder = builder.require(Predicate::LocalTimeOfDay {
                    field: LessonField::StartTime,
                    timezone: tz,
                    op: CompareOp::Le,
                    time,
                });
            }
        }

        let keyword = non_blank(self.keyword.as_ref()).and_then(|kw| {
            let matches: Vec<_> = [LessonField::MemberName, LessonField::MemberPhoneticName]
                .into_iter()
                .filter_map(|field| Predicate::contains(field, kw))
                .collect();
            (!matches.is_empty())
                .then(|| Predicate::related(LessonRelation::Members, Predicate::or(matches)))
        });

        let courses = (!self.course_ids.is_empty()).then(|| {
            let on_lesson = Predicate::any_of_text(LessonField::CourseId, &self.course_ids);
            let on_member = Predicate::any_of_text(LessonField::MemberCourseId, &self.course_ids)
                .map(|p| Predicate::related(LessonRelation::Members, p));
            Predicate::or(on_lesson.into_iter().chain(on_member).collect())
        });

        let statuses = Predicate::any_of(
            LessonField::SchedulingStatus,
            self.scheduling_statuses.iter().map(|s| s.as_str()).collect::<ValueList>(),
        );

        Ok(builder
            .maybe(keyword)
            .maybe(Predicate::any_of_text(LessonField::CenterId, &self.location_ids))
            .maybe(
                Predicate::any_of_text(LessonField::TeacherId, &self.teacher_ids)
                    .map(|p| Predicate::related(LessonRelation::Teachers, p)),
            )
            .maybe(
                Predicate::any_of_text(LessonField::MemberStudentId, &self.student_ids)
                    .map(|p| Predicate::related(LessonRelation::Members, p)),
            )
            .maybe(
                Predicate::any_of_text(LessonField::MemberGrade, &self.grades)
                    .map(|p| Predicate::related(LessonRelation::Members, p)),
            )
            .maybe(courses)
            .maybe(Predicate::any_of_text(LessonField::ClassId, &self.class_ids))
            .maybe(statuses)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::sort::SortOrder;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 6, 27, 3, 0, 0).single().unwrap_or_default()
    }

    fn base_filter() -> LessonFilter {
        LessonFilter { current_time: Some(now()), ..LessonFilter::default() }
    }

    fn clauses(set: &FilterSet<Lesson>) -> Vec<Predicate<Lesson>> {
        match set.predicate() {
            Some(Predicate::All(children)) => children.clone(),
            Some(single) => vec![single.clone()],
            None => vec![],
        }
    }

    #[test]
    fn test_minimal_filter_is_time_bound_only() {
        let set = base_filter().compose().unwrap_or_default();
        assert_eq!(
            clauses(&set),
            vec![Predicate::compare(LessonField::StartTime, CompareOp::Ge, now())]
        );
    }

    #[test]
    fn test_past_lessons_sort_descending() {
        let filter = LessonFilter { lesson_time: LessonTime::Past, ..base_filter() };
        assert_eq!(filter.sort_key().order(), SortOrder::Descending);
        let set = filter.compose().unwrap_or_default();
        assert_eq!(
            clauses(&set)[0],
            Predicate::compare(LessonField::StartTime, CompareOp::Lt, now())
        );
        assert_eq!(base_filter().sort_key().order(), SortOrder::Ascending);
    }

    #[test]
    fn test_missing_current_time_is_rejected() {
        assert_eq!(LessonFilter::default().compose(), Err(FilterError::MissingCurrentTime));
    }

    #[test]
    fn test_wall_clock_filters_require_timezone() {
        let filter = LessonFilter { days_of_week: vec![Weekday::Mon], ..base_filter() };
        assert_eq!(filter.compose(), Err(FilterError::MissingTimezone));

        let filter = LessonFilter { from_time: Some("09:00:00".to_owned()), ..base_filter() };
        assert_eq!(filter.compose(), Err(FilterError::MissingTimezone));

        let filter = LessonFilter {
            to_time: Some("17:00:00".to_owned()),
            timezone: Some("  ".to_owned()),
            ..base_filter()
        };
        assert_eq!(filter.compose(), Err(FilterError::MissingTimezone));
    }

    #[test]
    fn test_malformed_time_is_rejected_before_timezone_check() {
        let filter = LessonFilter { from_time: Some("9 o'clock".to_owned()), ..base_filter() };
        assert!(matches!(filter.compose(), Err(FilterError::InvalidTimeOfDay { .. })));
    }

    #[test]
    fn test_wall_clock_filters_carry_timezone() {
        let filter = LessonFilter {
            days_of_week: vec![Weekday::Sun, Weekday::Sat],
            from_time: Some("09:00:00".to_owned()),
            to_time: Some("17:30:00".to_owned()),
            timezone: Some("Asia/Ho_Chi_Minh".to_owned()),
            ..base_filter()
        };
        let set = filter.compose().unwrap_or_default();
        let all = clauses(&set);
        assert_eq!(all.len(), 4);
        assert!(all.iter().any(|p| matches!(
            p,
            Predicate::LocalDayOfWeek { timezone, days, .. }
                if *timezone == chrono_tz::Asia::Ho_Chi_Minh && days.len() == 2
        )));
        assert!(all.iter().any(|p| matches!(
            p,
            Predicate::LocalTimeOfDay { field: LessonField::EndTime, op: CompareOp::Ge, .. }
        )));
        assert!(all.iter().any(|p| matches!(
            p,
            Predicate::LocalTimeOfDay { field: LessonField::StartTime, op: CompareOp::Le, .. }
        )));
    }

    #[test]
    fn test_keyword_matches_name_or_phonetic_name() {
        let filter = LessonFilter { keyword: Some("Ta ro".to_owned()), ..base_filter() };
        let set = filter.compose().unwrap_or_default();
        let expected = Predicate::related(
            LessonRelation::Members,
            Predicate::Any(vec![
                Predicate::Contains { field: LessonField::MemberName, needle: "Taro".to_owned() },
                Predicate::Contains {
                    field: LessonField::MemberPhoneticName,
                    needle: "Taro".to_owned(),
                },
            ]),
        );
        assert!(clauses(&set).contains(&expected));
    }

    #[test]
    fn test_course_filter_matches_lesson_or_member_course() {
        let filter = LessonFilter { course_ids: vec!["c1".to_owned()], ..base_filter() };
        let set = filter.compose().unwrap_or_default();
        let course = clauses(&set).pop();
        assert!(matches!(course, Some(Predicate::Any(ref alts)) if alts.len() == 2));
    }

    #[test]
    fn test_blank_inputs_impose_nothing() {
        let filter = LessonFilter {
            school_id: Some(String::new()),
            keyword: Some("   ".to_owned()),
            from_time: Some(String::new()),
            ..base_filter()
        };
        assert_eq!(clauses(&filter.compose().unwrap_or_default()).len(), 1);
    }

    #[test]
    fn test_relation_filters_compose_independently() {
        let filter = LessonFilter {
            school_id: Some("5".to_owned()),
            location_ids: vec!["loc-1".to_owned(), "loc-2".to_owned()],
            teacher_ids: vec!["t1".to_owned()],
            student_ids: vec!["s1".to_owned()],
            grades: vec!["g1".to_owned()],
            class_ids: vec!["k1".to_owned()],
            scheduling_statuses: vec![SchedulingStatus::Published, SchedulingStatus::Draft],
            ..base_filter()
        };
        let all = clauses(&filter.compose().unwrap_or_default());
        assert_eq!(all.len(), 8);
        assert!(all.contains(&Predicate::InSet {
            field: LessonField::SchedulingStatus,
            values: ValueList::Text(vec![
                "LESSON_SCHEDULING_STATUS_PUBLISHED".to_owned(),
                "LESSON_SCHEDULING_STATUS_DRAFT".to_owned(),
            ]),
        }));
    }

    #[test]
    fn test_stored_enum_round_trip() {
        for status in [
            SchedulingStatus::Published,
            SchedulingStatus::Draft,
            SchedulingStatus::Completed,
            SchedulingStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<SchedulingStatus>(), Ok(status));
        }
        assert!("LESSON_TEACHING_METHOD_SOLO".parse::<TeachingMethod>().is_err());
    }
}
