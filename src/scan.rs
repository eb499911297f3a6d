//! One scan of the trail bucket.
//!
//! [`ScanOrchestrator`] runs the pipeline for a single invocation:
//!
//! ```text
//! Idle -> Selecting -> Decoding -> Classifying -> Dispatching -> Done
//! ```
//!
//! Only a listing failure aborts the scan. Objects that fail to fetch or
//! decode are logged and skipped but still count as processed. Credential
//! lookups and alert deliveries fail per principal and per alert.
//!
//! Fetching is sequential. Decompression and parsing of the fetched objects
//! runs on rayon's thread pool, each object isolated in its own `Result`.
//! Classification happens afterwards on the calling task, so detectors are
//! never shared between threads.

use crate::alerts::{AlertDispatcher, AlertReport, NotificationSink};
use crate::audit::parser::decode;
use crate::audit::AuditRecord;
use crate::config::ScanConfig;
use crate::credentials::{CredentialAgeChecker, CredentialDirectory};
use crate::detect::{default_detectors, DetectionOutcome};
use crate::error::{DecodeError, ScanError, StoreError};
use crate::store::{window_start, LogObjectRef, LogWindowSelector, ObjectStore};
use crate::utils::progress::ProgressBar;
use crate::utils::time::format_timestamp;
use chrono::{NaiveDateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Selecting,
    Decoding,
    Classifying,
    Dispatching,
    Done,
}

/// What a completed scan did.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Objects attempted, including those that failed to decode.
    pub processed_files: usize,
    pub decode_failures: usize,
    pub records: usize,
    pub credential_failures: usize,
    /// Whether access key ages were checked at all.
    pub credentials_checked: bool,
    /// One report per detection outcome, in dispatch order.
    pub alerts: Vec<AlertReport>,
}

impl ScanSummary {
    pub fn alerts_published(&self) -> usize {
        self.alerts.iter().filter(|a| a.published).count()
    }

    pub fn publish_failures(&self) -> usize {
        self.alerts.len() - self.alerts_published()
    }
}

pub struct ScanOrchestrator {
    config: ScanConfig,
    store: Arc<dyn ObjectStore>,
    dispatcher: AlertDispatcher,
    checker: Option<CredentialAgeChecker>,
    show_progress: bool,
    phase: ScanPhase,
}

impl ScanOrchestrator {
    pub fn new(
        config: ScanConfig,
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let dispatcher = AlertDispatcher::new(sink, config.topic.clone());
        Self {
            config,
            store,
            dispatcher,
            checker: None,
            show_progress: false,
            phase: ScanPhase::Idle,
        }
    }

    /// Enables stale access key checks against `directory`.
    #[must_use]
    pub fn with_credentials(mut self, directory: Arc<dyn CredentialDirectory>) -> Self {
        self.checker = Some(CredentialAgeChecker::new(
            directory,
            self.config.access_key_max_age_days,
        ));
        self
    }

    /// Draws a progress bar on stderr while decoding.
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Scans the window ending now.
    pub async fn run(&mut self) -> Result<ScanSummary, ScanError> {
        self.run_at(Utc::now().naive_utc()).await
    }

    /// Scans the window ending at `now` (naive UTC).
    pub async fn run_at(&mut self, now: NaiveDateTime) -> Result<ScanSummary, ScanError> {
        let mut summary = ScanSummary::default();

        self.enter(ScanPhase::Selecting);
        let cutoff = window_start(now, self.config.window_hours).ok_or(
            ScanError::WindowOutOfRange {
                window_hours: self.config.window_hours,
                now,
            },
        )?;
        let objects = LogWindowSelector::new(self.store.as_ref(), &self.config.bucket)
            .select(cutoff)
            .await
            .map_err(|source| ScanError::StoreListing {
                bucket: self.config.bucket.clone(),
                source,
            })?;
        info!(
            bucket = %self.config.bucket,
            objects = objects.len(),
            "Scanning log objects modified since {}",
            format_timestamp(&cutoff)
        );

        self.enter(ScanPhase::Decoding);
        summary.processed_files = objects.len();
        let records = self.decode_all(&objects, &mut summary).await;
        summary.records = records.len();

        self.enter(ScanPhase::Classifying);
        let outcomes = self.classify(&records, now, &mut summary).await;

        self.enter(ScanPhase::Dispatching);
        for outcome in &outcomes {
            summary.alerts.push(self.dispatcher.dispatch(outcome).await);
        }

        self.enter(ScanPhase::Done);
        info!(
            processed_files = summary.processed_files,
            decode_failures = summary.decode_failures,
            records = summary.records,
            alerts = summary.alerts_published(),
            publish_failures = summary.publish_failures(),
            "Scan complete"
        );

        Ok(summary)
    }

    fn enter(&mut self, phase: ScanPhase) {
        debug!(from = ?self.phase, to = ?phase, "Scan phase");
        self.phase = phase;
    }

    async fn decode_all(
        &self,
        objects: &[LogObjectRef],
        summary: &mut ScanSummary,
    ) -> Vec<AuditRecord> {
        let progress = if self.show_progress {
            ProgressBar::new(objects.len(), "Decoding")
        } else {
            ProgressBar::hidden()
        };

        let mut fetched: Vec<(&LogObjectRef, Result<Vec<u8>, StoreError>)> =
            Vec::with_capacity(objects.len());
        for object in objects {
            let bytes = self.store.get_object(&self.config.bucket, &object.key).await;
            fetched.push((object, bytes));
        }

        let decoded: Vec<(&LogObjectRef, Result<Vec<AuditRecord>, DecodeError>)> = fetched
            .into_par_iter()
            .map(|(object, bytes)| {
                let result = bytes
                    .map_err(DecodeError::from)
                    .and_then(|bytes| decode(&object.key, &bytes));
                progress.inc();
                (object, result)
            })
            .collect();

        let mut records = Vec::new();
        for (object, result) in decoded {
            match result {
                Ok(mut batch) => {
                    debug!(key = %object.key, records = batch.len(), "Decoded log object");
                    records.append(&mut batch);
                }
                Err(source) => {
                    summary.decode_failures += 1;
                    let err = ScanError::ObjectDecode {
                        key: object.key.clone(),
                        source,
                    };
                    warn!("{}", err);
                }
            }
        }

        progress.finish_with_message(&format!(
            "Decoded {} records from {} objects",
            records.len(),
            objects.len()
        ));
        records
    }

    async fn classify(
        &self,
        records: &[AuditRecord],
        now: NaiveDateTime,
        summary: &mut ScanSummary,
    ) -> Vec<DetectionOutcome> {
        summary.credentials_checked = self.checker.is_some();
        if !summary.credentials_checked {
            warn!("No credential directory configured, skipping access key age checks");
        }
        let mut detectors = default_detectors(&self.config, self.checker.clone());
        let mut outcomes = Vec::new();

        for record in records {
            for detector in detectors.iter_mut() {
                if let Some(outcome) = detector.observe(record) {
                    outcomes.push(outcome);
                }
            }
        }

        for detector in detectors.iter_mut() {
            let detections = detector.finish(now).await;
            debug!(
                detector = detector.name(),
                outcomes = detections.outcomes.len(),
                errors = detections.errors.len(),
                "Detector finished"
            );
            summary.credential_failures += detections
                .errors
                .iter()
                .filter(|e| matches!(e, ScanError::CredentialLookup { .. }))
                .count();
            outcomes.extend(detections.outcomes);
        }

        outcomes
    }
}
