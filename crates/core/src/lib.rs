//! Core types for roster-paging
//!
//! Listing entities, the backend-neutral predicate tree, sort keys and boundaries, and page
//! types shared by the storage and service crates.

pub mod clock;
pub mod constants;
pub mod env_config;
mod error;
mod filter;
mod lesson;
mod listing;
mod page;
mod predicate;
mod sort;
mod subscription;
mod value;

pub use constants::*;
pub use env_config::{IndexNames, PagingConfig, env_parse_with_default};
pub use error::*;
pub use filter::*;
pub use lesson::*;
pub use listing::*;
pub use page::*;
pub use predicate::*;
pub use sort::*;
pub use subscription::*;
pub use value::*;
