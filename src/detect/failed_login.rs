//! Failed console sign-in clustering.
//!
//! Failed console sign-ins are counted per user across the whole batch.
//! After the batch, each user at or above the threshold produces a single
//! outcome carrying the final count.

use super::{DetectionOutcome, Detections, Detector};
use crate::audit::AuditRecord;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Principal name used when a sign-in record carries no user name.
pub const UNKNOWN_PRINCIPAL: &str = "UNKNOWN";

/// Whether `record` is a failed console sign-in.
///
/// A sign-in failed when it has no response payload, or its error message
/// contains `Failed authentication`, or contains `failure` in any case.
pub fn is_failed_console_login(record: &AuditRecord) -> bool {
    if !record.is_console_login() {
        return false;
    }
    let message = record.error_message().unwrap_or("");
    !record.has_response_payload()
        || message.contains("Failed authentication")
        || message.to_lowercase().contains("failure")
}

/// Failed sign-in counts per principal for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedLoginTally {
    counts: HashMap<String, usize>,
}

impl FailedLoginTally {
    pub fn record(&mut self, principal: &str) {
        *self.counts.entry(principal.to_string()).or_default() += 1;
    }

    pub fn count(&self, principal: &str) -> usize {
        self.counts.get(principal).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Principals with at least `threshold` failures, sorted by name.
    pub fn at_or_above(&self, threshold: usize) -> Vec<(String, usize)> {
        let mut over: Vec<(String, usize)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count >= threshold)
            .map(|(principal, count)| (principal.clone(), *count))
            .collect();
        over.sort();
        over
    }
}

#[derive(Debug)]
pub struct FailedLoginDetector {
    threshold: usize,
    tally: FailedLoginTally,
}

impl FailedLoginDetector {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            tally: FailedLoginTally::default(),
        }
    }

    pub fn tally(&self) -> &FailedLoginTally {
        &self.tally
    }
}

#[async_trait]
impl Detector for FailedLoginDetector {
    fn name(&self) -> &'static str {
        "failed-login-cluster"
    }

    fn observe(&mut self, record: &AuditRecord) -> Option<DetectionOutcome> {
        if is_failed_console_login(record) {
            self.tally
                .record(record.user_name().unwrap_or(UNKNOWN_PRINCIPAL));
        }
        None
    }

    async fn finish(&mut self, _now: NaiveDateTime) -> Detections {
        let outcomes = self
            .tally
            .at_or_above(self.threshold)
            .into_iter()
            .map(|(principal, count)| DetectionOutcome::FailedLoginCluster { principal, count })
            .collect();

        Detections {
            outcomes,
            errors: Vec::new(),
        }
    }
}
