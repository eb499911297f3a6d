use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an RFC 3339 timestamp as used by CloudTrail and IAM
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .context("Failed to parse timestamp")
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a naive UTC instant for display
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
