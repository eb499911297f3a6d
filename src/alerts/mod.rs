//! Alert rendering and delivery.
//!
//! [`AlertDispatcher`] turns each [`DetectionOutcome`] into a subject line and
//! message body and publishes it to a [`NotificationSink`]. Delivery is
//! attempted exactly once per outcome; failures are logged and reported, never
//! retried.

pub mod sinks;

use crate::detect::{AlertKind, DetectionOutcome};
use crate::error::{PublishError, ScanError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

pub use sinks::{LogSink, WebhookSink};

/// Destination for rendered alerts.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, message: &str)
        -> Result<(), PublishError>;
}

/// A rendered alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub message: String,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertReport {
    pub kind: AlertKind,
    pub principal: Option<String>,
    pub subject: String,
    pub published: bool,
    pub error: Option<String>,
}

/// Renders the subject and body for `outcome`.
pub fn render(outcome: &DetectionOutcome) -> Alert {
    match outcome {
        DetectionOutcome::RootSignin { record } => Alert {
            subject: "ALERT: Root console sign-in detected".to_string(),
            message: serde_json::to_string_pretty(record.raw())
                .unwrap_or_else(|_| record.raw().to_string()),
        },
        DetectionOutcome::FailedLoginCluster { principal, count } => Alert {
            subject: format!(
                "ALERT: {} failed console logins for user {}",
                count, principal
            ),
            message: format!(
                "Detected {} failed console login attempts in the last window for user {}.",
                count, principal
            ),
        },
        DetectionOutcome::StaleCredential {
            finding,
            max_age_days,
        } => Alert {
            subject: format!(
                "ALERT: Access key {} for {} is {} days old",
                finding.credential_id, finding.principal, finding.age_days
            ),
            message: format!(
                "Access key {} for user {} is {} days old (threshold {}). Consider rotating or disabling.",
                finding.credential_id, finding.principal, finding.age_days, max_age_days
            ),
        },
    }
}

/// Publishes rendered alerts to one topic.
#[derive(Clone)]
pub struct AlertDispatcher {
    sink: Arc<dyn NotificationSink>,
    topic: String,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
        }
    }

    /// Renders and publishes one outcome.
    pub async fn dispatch(&self, outcome: &DetectionOutcome) -> AlertReport {
        let alert = render(outcome);
        let mut report = AlertReport {
            kind: outcome.kind(),
            principal: outcome.principal().map(str::to_string),
            subject: alert.subject.clone(),
            published: false,
            error: None,
        };

        match self
            .sink
            .publish(&self.topic, &alert.subject, &alert.message)
            .await
        {
            Ok(()) => {
                info!(kind = %report.kind, subject = %alert.subject, "Published alert");
                report.published = true;
            }
            Err(source) => {
                let err = ScanError::Publish {
                    subject: alert.subject,
                    source,
                };
                error!(kind = %report.kind, "{}", err);
                report.error = Some(err.to_string());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditRecord;
    use crate::credentials::CredentialFinding;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn publish(
            &self,
            topic: &str,
            subject: &str,
            message: &str,
        ) -> Result<(), PublishError> {
            if self.fail {
                return Err(PublishError::Other("topic does not exist".to_string()));
            }
            self.published.lock().unwrap().push((
                topic.to_string(),
                subject.to_string(),
                message.to_string(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_render_root_signin_includes_record() {
        let record = AuditRecord::from_value(json!({
            "eventName": "ConsoleLogin",
            "sourceIPAddress": "203.0.113.7",
            "userIdentity": {"type": "Root"}
        }));
        let alert = render(&DetectionOutcome::RootSignin { record });

        assert!(alert.subject.contains("Root console sign-in"));
        assert!(alert.message.contains("\"sourceIPAddress\": \"203.0.113.7\""));
    }

    #[test]
    fn test_render_failed_logins() {
        let alert = render(&DetectionOutcome::FailedLoginCluster {
            principal: "alice".to_string(),
            count: 5,
        });
        assert_eq!(alert.subject, "ALERT: 5 failed console logins for user alice");
        assert_eq!(
            alert.message,
            "Detected 5 failed console login attempts in the last window for user alice."
        );
    }

    #[test]
    fn test_render_stale_credential() {
        let alert = render(&DetectionOutcome::StaleCredential {
            finding: CredentialFinding {
                principal: "bob".to_string(),
                credential_id: "AKIABOB".to_string(),
                age_days: 91,
            },
            max_age_days: 90,
        });
        assert_eq!(alert.subject, "ALERT: Access key AKIABOB for bob is 91 days old");
        assert!(alert.message.contains("(threshold 90)"));
    }

    #[tokio::test]
    async fn test_dispatch_publishes_to_topic() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = AlertDispatcher::new(sink.clone(), "security-alerts");

        let report = dispatcher
            .dispatch(&DetectionOutcome::FailedLoginCluster {
                principal: "alice".to_string(),
                count: 6,
            })
            .await;

        assert!(report.published);
        assert_eq!(report.principal.as_deref(), Some("alice"));
        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "security-alerts");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_reported() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let dispatcher = AlertDispatcher::new(sink, "security-alerts");

        let report = dispatcher
            .dispatch(&DetectionOutcome::FailedLoginCluster {
                principal: "alice".to_string(),
                count: 6,
            })
            .await;

        assert!(!report.published);
        assert!(report.error.unwrap().contains("topic does not exist"));
    }
}
