//! Root console sign-in detection.
//!
//! Any console sign-in by the root principal is alert-worthy on its own:
//! there is no threshold and no batching.

use super::{DetectionOutcome, Detections, Detector};
use crate::audit::{AuditRecord, IdentityType};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Whether `record` is a console sign-in by the root principal.
pub fn is_root_signin(record: &AuditRecord) -> bool {
    record.is_console_login() && record.identity_type() == Some(IdentityType::Root)
}

#[derive(Debug, Default)]
pub struct RootSigninDetector;

#[async_trait]
impl Detector for RootSigninDetector {
    fn name(&self) -> &'static str {
        "root-signin"
    }

    fn observe(&mut self, record: &AuditRecord) -> Option<DetectionOutcome> {
        is_root_signin(record).then(|| DetectionOutcome::RootSignin {
            record: record.clone(),
        })
    }

    async fn finish(&mut self, _now: NaiveDateTime) -> Detections {
        Detections::default()
    }
}
