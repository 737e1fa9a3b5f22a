use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use roster_core::{StudentCourse, SubscriptionFilter};
use roster_service::{ListSubscriptionsQuery, PageEngine, SubscriptionQueryService};
use roster_storage::StoreBackend;

use super::{PageArgs, parse_instant, print_json};

#[derive(Args, Debug)]
pub(crate) struct SubscriptionArgs {
    #[command(flatten)]
    page: PageArgs,
    /// List oldest first
    #[arg(long)]
    oldest_first: bool,
    /// Reference time for enrollment checks instead of the wall clock
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
    #[arg(long)]
    school: Option<String>,
    /// Subscriptions covering this day
    #[arg(long, value_parser = parse_instant)]
    lesson_date: Option<DateTime<Utc>>,
    /// IANA timezone for --lesson-date, UTC when absent
    #[arg(long)]
    timezone: Option<String>,
    /// Matches the student's name or phonetic name
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long = "course")]
    courses: Vec<String>,
    #[arg(long = "grade")]
    grades: Vec<String>,
    #[arg(long = "class")]
    classes: Vec<String>,
    #[arg(long = "location")]
    locations: Vec<String>,
    #[arg(long = "subscription")]
    subscriptions: Vec<String>,
    /// STUDENT_ID:COURSE_ID pair; repeatable
    #[arg(long = "student-course", value_parser = parse_student_course)]
    student_courses: Vec<StudentCourse>,
}

fn parse_student_course(value: &str) -> Result<StudentCourse, String> {
    match value.split_once(':') {
        Some((student_id, course_id)) if !student_id.is_empty() && !course_id.is_empty() => {
            Ok(StudentCourse { student_id: student_id.to_owned(), course_id: course_id.to_owned() })
        },
        _ => Err(format!("expected STUDENT_ID:COURSE_ID, got {value:?}")),
    }
}

impl SubscriptionArgs {
    fn into_query(self) -> ListSubscriptionsQuery {
        let request = self.page.request();
        let filter = SubscriptionFilter {
            compare_token: self.oldest_first.then(|| ">=".to_owned()),
            current_time: self.now,
            school_id: self.school,
            lesson_date: self.lesson_date,
            timezone: self.timezone,
            keyword: self.keyword,
            course_ids: self.courses,
            grades: self.grades,
            class_ids: self.classes,
            location_ids: self.locations,
            subscription_ids: self.subscriptions,
            student_courses: self.student_courses,
        };
        ListSubscriptionsQuery { filter, page: request }
    }
}

pub(crate) async fn run(engine: PageEngine<StoreBackend>, args: SubscriptionArgs) -> Result<()> {
    let query = args.into_query();
    let page = SubscriptionQueryService::new(engine).list_subscriptions(&query).await?;
    print_json(&page)
}
