//! Stale access key detection for users active in the batch.
//!
//! Every distinct user name seen in any record, not only sign-ins, has its
//! access keys checked once the batch is complete.

use super::{DetectionOutcome, Detections, Detector};
use crate::audit::AuditRecord;
use crate::credentials::CredentialAgeChecker;
use crate::error::ScanError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use tracing::warn;

pub struct StaleCredentialDetector {
    checker: CredentialAgeChecker,
    seen: BTreeSet<String>,
}

impl StaleCredentialDetector {
    pub fn new(checker: CredentialAgeChecker) -> Self {
        Self {
            checker,
            seen: BTreeSet::new(),
        }
    }

    pub fn seen_principals(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }
}

#[async_trait]
impl Detector for StaleCredentialDetector {
    fn name(&self) -> &'static str {
        "stale-credential"
    }

    fn observe(&mut self, record: &AuditRecord) -> Option<DetectionOutcome> {
        if let Some(user) = record.user_name() {
            if !self.seen.contains(user) {
                self.seen.insert(user.to_string());
            }
        }
        None
    }

    async fn finish(&mut self, now: NaiveDateTime) -> Detections {
        let mut detections = Detections::default();
        let max_age_days = self.checker.max_age_days();

        for principal in &self.seen {
            match self.checker.check_age(principal, now).await {
                Ok(findings) => detections.outcomes.extend(findings.into_iter().map(|finding| {
                    DetectionOutcome::StaleCredential {
                        finding,
                        max_age_days,
                    }
                })),
                Err(source) => {
                    warn!(
                        principal = principal.as_str(),
                        error = %source,
                        "Skipping access key age check"
                    );
                    detections.errors.push(ScanError::CredentialLookup {
                        principal: principal.clone(),
                        source,
                    });
                }
            }
        }

        detections
    }
}
