//! Scan configuration.
//!
//! Values are resolved once at startup and never mutated afterwards. Explicit
//! options win over environment variables, which win over defaults:
//!
//! | Setting                  | Environment variable      | Default |
//! |--------------------------|---------------------------|---------|
//! | bucket                   | `S3_BUCKET`               | -       |
//! | topic                    | `SNS_TOPIC_ARN`           | -       |
//! | access key max age       | `ACCESS_KEY_MAX_AGE_DAYS` | 90      |
//! | failed login threshold   | `FAILED_LOGIN_THRESHOLD`  | 5       |
//! | scan window              | `SCAN_WINDOW_HOURS`       | 2       |

use crate::store::window_start;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use std::env;
use std::str::FromStr;

pub const DEFAULT_ACCESS_KEY_MAX_AGE_DAYS: i64 = 90;
pub const DEFAULT_FAILED_LOGIN_THRESHOLD: usize = 5;
pub const DEFAULT_WINDOW_HOURS: u32 = 2;

/// Immutable settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Bucket holding the trail's log objects.
    pub bucket: String,
    /// Notification topic alerts are published to.
    pub topic: String,
    pub access_key_max_age_days: i64,
    pub failed_login_threshold: usize,
    pub window_hours: u32,
}

impl ScanConfig {
    /// Config with default thresholds.
    pub fn new(bucket: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            topic: topic.into(),
            access_key_max_age_days: DEFAULT_ACCESS_KEY_MAX_AGE_DAYS,
            failed_login_threshold: DEFAULT_FAILED_LOGIN_THRESHOLD,
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }

    /// Reads the whole configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_options(&ScanOptions::default())
    }

    /// Resolves configuration from explicit options with environment fallback.
    pub fn from_options(options: &ScanOptions) -> Result<Self> {
        let bucket = options
            .bucket
            .clone()
            .or_else(|| env::var("S3_BUCKET").ok())
            .ok_or_else(|| {
                anyhow!(
                    "No log bucket configured. Provide one via:\n\
                     - Command-line: --bucket my-trail-bucket\n\
                     - Environment variable: export S3_BUCKET=my-trail-bucket"
                )
            })?;

        let topic = options
            .topic
            .clone()
            .or_else(|| env::var("SNS_TOPIC_ARN").ok())
            .ok_or_else(|| {
                anyhow!(
                    "No notification topic configured. Provide one via:\n\
                     - Command-line: --topic arn:aws:sns:...\n\
                     - Environment variable: export SNS_TOPIC_ARN=arn:aws:sns:..."
                )
            })?;

        let config = Self {
            bucket,
            topic,
            access_key_max_age_days: resolve(
                options.access_key_max_age_days,
                "ACCESS_KEY_MAX_AGE_DAYS",
                DEFAULT_ACCESS_KEY_MAX_AGE_DAYS,
            )?,
            failed_login_threshold: resolve(
                options.failed_login_threshold,
                "FAILED_LOGIN_THRESHOLD",
                DEFAULT_FAILED_LOGIN_THRESHOLD,
            )?,
            window_hours: resolve(
                options.window_hours,
                "SCAN_WINDOW_HOURS",
                DEFAULT_WINDOW_HOURS,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            bail!("Log bucket must not be empty");
        }
        if self.topic.is_empty() {
            bail!("Notification topic must not be empty");
        }
        if self.access_key_max_age_days < 0 {
            bail!(
                "ACCESS_KEY_MAX_AGE_DAYS must not be negative (got {})",
                self.access_key_max_age_days
            );
        }
        if self.failed_login_threshold == 0 {
            bail!("FAILED_LOGIN_THRESHOLD must be at least 1");
        }
        if self.window_hours == 0 {
            bail!("SCAN_WINDOW_HOURS must be at least 1");
        }
        if window_start(Utc::now().naive_utc(), self.window_hours).is_none() {
            bail!(
                "SCAN_WINDOW_HOURS reaches before the earliest supported date (got {})",
                self.window_hours
            );
        }
        Ok(())
    }
}

/// Optional overrides, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub bucket: Option<String>,
    pub topic: Option<String>,
    pub access_key_max_age_days: Option<i64>,
    pub failed_login_threshold: Option<usize>,
    pub window_hours: Option<u32>,
}

fn resolve<T>(explicit: Option<T>, var: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(value) = explicit {
        return Ok(value);
    }
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", var, raw)),
        Err(_) => Ok(default),
    }
}
