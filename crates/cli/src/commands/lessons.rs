use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use roster_core::clock::{format_seconds_of_day, weekday_from_index};
use roster_core::{LessonFilter, LessonTime, SchedulingStatus};
use roster_service::{LessonQueryService, ListLessonsQuery, PageEngine};
use roster_storage::StoreBackend;

use super::{PageArgs, parse_instant, print_json};

#[derive(Args, Debug)]
pub(crate) struct LessonArgs {
    #[command(flatten)]
    page: PageArgs,
    /// List lessons that started before now, latest first
    #[arg(long)]
    past: bool,
    /// Reference time instead of the wall clock
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
    #[arg(long)]
    school: Option<String>,
    /// Lessons ending on or after this instant
    #[arg(long, value_parser = parse_instant)]
    from_date: Option<DateTime<Utc>>,
    /// Lessons starting on or before this instant
    #[arg(long, value_parser = parse_instant)]
    to_date: Option<DateTime<Utc>>,
    /// Day of week, 0 = Sunday; repeatable
    #[arg(long = "day", value_parser = clap::value_parser!(i64).range(0..=6))]
    days: Vec<i64>,
    /// Local end time lower bound, HH:MM[:SS]
    #[arg(long, conflicts_with = "from_seconds")]
    from_time: Option<String>,
    /// Local start time upper bound, HH:MM[:SS]
    #[arg(long, conflicts_with = "to_seconds")]
    to_time: Option<String>,
    /// Same as --from-time, in seconds since midnight
    #[arg(long)]
    from_seconds: Option<i64>,
    /// Same as --to-time, in seconds since midnight
    #[arg(long)]
    to_seconds: Option<i64>,
    /// IANA timezone for day and time-of-day filters
    #[arg(long)]
    timezone: Option<String>,
    /// Matches a learner's name or phonetic name
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long = "location")]
    locations: Vec<String>,
    /// Locations the caller may see; intersected with --location
    #[arg(long = "allowed-location")]
    allowed_locations: Vec<String>,
    #[arg(long = "teacher")]
    teachers: Vec<String>,
    #[arg(long = "student")]
    students: Vec<String>,
    #[arg(long = "course")]
    courses: Vec<String>,
    #[arg(long = "grade")]
    grades: Vec<String>,
    #[arg(long = "class")]
    classes: Vec<String>,
    /// Stored status, e.g. LESSON_SCHEDULING_STATUS_PUBLISHED
    #[arg(long = "status")]
    statuses: Vec<SchedulingStatus>,
}

impl LessonArgs {
    fn into_query(self) -> Result<ListLessonsQuery> {
        let days_of_week =
            self.days.into_iter().map(weekday_from_index).collect::<Result<Vec<_>, _>>()?;
        let request = self.page.request();
        let filter = LessonFilter {
            lesson_time: if self.past { LessonTime::Past } else { LessonTime::Future },
            current_time: Some(self.now.unwrap_or_else(Utc::now)),
            school_id: self.school,
            from_date: self.from_date,
            to_date: self.to_date,
            days_of_week,
            from_time: self.from_time.or_else(|| self.from_seconds.map(format_seconds_of_day)),
            to_time: self.to_time.or_else(|| self.to_seconds.map(format_seconds_of_day)),
            timezone: self.timezone,
            keyword: self.keyword,
            location_ids: self.locations,
            teacher_ids: self.teachers,
            student_ids: self.students,
            course_ids: self.courses,
            grades: self.grades,
            class_ids: self.classes,
            scheduling_statuses: self.statuses,
        };
        Ok(ListLessonsQuery { filter, allowed_location_ids: self.allowed_locations, page: request })
    }
}

pub(crate) async fn run(engine: PageEngine<StoreBackend>, args: LessonArgs) -> Result<()> {
    let query = args.into_query()?;
    let page = LessonQueryService::new(engine).list_lessons(&query).await?;
    print_json(&page)
}
