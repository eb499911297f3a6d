//! Notification sink implementations.

use super::NotificationSink;
use crate::error::PublishError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::info;

/// Writes alerts to a local stream instead of delivering them.
///
/// Used for dry runs and when no webhook is configured. Alerts go to stderr
/// by default so they survive any log filter and stay out of the result on
/// stdout.
pub struct LogSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl LogSink {
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::with_writer(io::stderr())
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        info!(target: "alert", topic, subject, "Alert raised");

        let mut out = self
            .out
            .lock()
            .map_err(|_| PublishError::Other("alert stream lock poisoned".to_string()))?;
        writeln!(out, "[{}] {}\n{}\n", topic, subject, message)
            .and_then(|()| out.flush())
            .map_err(|e| PublishError::Other(format!("failed to write alert: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    topic: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// POSTs each alert as JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: String,
    client: Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                topic,
                subject,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
