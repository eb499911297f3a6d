//! # Trail Audit Alerts
//!
//! Scans recent CloudTrail log objects for security-relevant activity and
//! publishes one alert per finding.
//!
//! ## Detections
//!
//! - **Root console sign-in** - every `ConsoleLogin` by the root principal
//! - **Failed console logins** - users with at least `FAILED_LOGIN_THRESHOLD`
//!   failed sign-ins in the scanned window, one alert per user with the total
//! - **Stale access keys** - keys at least `ACCESS_KEY_MAX_AGE_DAYS` old that
//!   belong to users active in the window
//!
//! ## Architecture
//!
//! - [`store`] - object store contract, local directory store, window selection
//! - [`audit`] - decompression and parsing of log objects into records
//! - [`detect`] - the detection rules
//! - [`credentials`] - access key age checks
//! - [`alerts`] - alert rendering and notification sinks
//! - [`scan`] - the per-invocation pipeline
//! - [`handler`] - invocation entry point
//! - [`config`] - immutable scan configuration
//!
//! Scans are stateless: overlapping windows in consecutive invocations can
//! alert on the same event twice.
//!
//! ## Example Usage
//!
//! ```bash
//! export S3_BUCKET=my-trail SNS_TOPIC_ARN=security-alerts
//! trail-audit scan --log-dir /data/trails --credentials access-keys.json
//! ```

pub mod alerts;
pub mod audit;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod detect;
pub mod error;
pub mod handler;
pub mod scan;
pub mod store;
pub mod utils;
