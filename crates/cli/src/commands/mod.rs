pub(crate) mod lessons;
pub(crate) mod subscriptions;

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use roster_core::PageRequest;
use serde::Serialize;

/// Paging flags shared by every listing.
#[derive(Args, Debug)]
pub(crate) struct PageArgs {
    /// Page size; 0 uses the configured default
    #[arg(short, long, default_value = "0")]
    limit: u32,
    /// Id of the record the page starts after
    #[arg(short, long)]
    anchor: Option<String>,
    /// Abort the request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl PageArgs {
    pub(crate) fn request(&self) -> PageRequest {
        let request = PageRequest::new(self.limit).maybe_anchor(self.anchor.clone());
        match self.timeout_secs {
            Some(secs) => request.with_timeout(Duration::from_secs(secs)),
            None => request,
        }
    }
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 timestamp or YYYY-MM-DD, got {value:?}"))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
