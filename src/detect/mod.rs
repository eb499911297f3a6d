//! Detection rules over a stream of audit records.
//!
//! Every rule implements [`Detector`]. The scan feeds each decoded record to
//! every detector through [`Detector::observe`], which may emit an outcome
//! immediately, then calls [`Detector::finish`] once the batch is complete so
//! aggregating rules can emit theirs.
//!
//! - [`root_signin`] - console sign-ins by the root principal
//! - [`failed_login`] - clustered failed console sign-ins per user
//! - [`stale_credential`] - access keys past the maximum age for users seen in
//!   the batch

pub mod failed_login;
pub mod root_signin;
pub mod stale_credential;

use crate::audit::AuditRecord;
use crate::config::ScanConfig;
use crate::credentials::{CredentialAgeChecker, CredentialFinding};
use crate::error::ScanError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

pub use failed_login::{FailedLoginDetector, FailedLoginTally, UNKNOWN_PRINCIPAL};
pub use root_signin::RootSigninDetector;
pub use stale_credential::StaleCredentialDetector;

/// A condition that warrants exactly one alert.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    RootSignin {
        record: AuditRecord,
    },
    FailedLoginCluster {
        principal: String,
        count: usize,
    },
    StaleCredential {
        finding: CredentialFinding,
        max_age_days: i64,
    },
}

impl DetectionOutcome {
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::RootSignin { .. } => AlertKind::RootSignin,
            Self::FailedLoginCluster { .. } => AlertKind::FailedLoginCluster,
            Self::StaleCredential { .. } => AlertKind::StaleCredential,
        }
    }

    /// The principal the alert is about, if one is named.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Self::RootSignin { record } => record.user_name(),
            Self::FailedLoginCluster { principal, .. } => Some(principal),
            Self::StaleCredential { finding, .. } => Some(&finding.principal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    RootSignin,
    FailedLoginCluster,
    StaleCredential,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RootSignin => "root_signin",
            Self::FailedLoginCluster => "failed_login_cluster",
            Self::StaleCredential => "stale_credential",
        })
    }
}

/// Outcomes and recovered errors produced when a detector finishes.
#[derive(Debug, Default)]
pub struct Detections {
    pub outcomes: Vec<DetectionOutcome>,
    pub errors: Vec<ScanError>,
}

/// One detection rule.
#[async_trait]
pub trait Detector: Send {
    fn name(&self) -> &'static str;

    /// Inspects one record. Returns an outcome when the record alone is
    /// alert-worthy.
    fn observe(&mut self, record: &AuditRecord) -> Option<DetectionOutcome>;

    /// Emits aggregate outcomes once every record has been observed.
    async fn finish(&mut self, now: NaiveDateTime) -> Detections;
}

/// Builds the detector set for one scan.
///
/// The stale credential rule needs a credential directory; without a checker
/// it is left out.
pub fn default_detectors(
    config: &ScanConfig,
    checker: Option<CredentialAgeChecker>,
) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = vec![
        Box::new(RootSigninDetector),
        Box::new(FailedLoginDetector::new(config.failed_login_threshold)),
    ];
    if let Some(checker) = checker {
        detectors.push(Box::new(StaleCredentialDetector::new(checker)));
    }
    detectors
}
