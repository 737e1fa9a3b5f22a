//! Service layer for roster listings
//!
//! Turns listing requests into filter sets and runs them through the keyset pagination
//! engine against whichever store backs it.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]

mod engine;
mod error;
mod lesson_service;
mod subscription_service;

pub use engine::PageEngine;
pub use error::{QueryStage, ServiceError};
pub use lesson_service::{LessonQueryService, ListLessonsQuery};
pub use subscription_service::{ListSubscriptionsQuery, SubscriptionQueryService};

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod test_support;
