//! Scan a trail bucket and publish alerts.
//!
//! Runs one invocation against a local mirror of the trail bucket
//! (`<log-dir>/<bucket>/...`) and prints the invocation result as JSON on
//! stdout.
//!
//! # Usage
//!
//! ```bash
//! # Log alerts only, default thresholds from the environment
//! trail-audit scan --log-dir /data/trails --bucket my-trail --topic security
//!
//! # Deliver to a webhook, check key ages, keep a CSV of what was sent
//! trail-audit scan --log-dir /data/trails --bucket my-trail --topic security \
//!     --credentials access-keys.json --webhook-url https://hooks.example.com/x \
//!     --export alerts.csv
//! ```

use crate::alerts::{AlertReport, LogSink, NotificationSink, WebhookSink};
use crate::config::{ScanConfig, ScanOptions};
use crate::credentials::InventoryDirectory;
use crate::handler::{handle_invocation, InvocationContext};
use crate::scan::ScanOrchestrator;
use crate::store::FsObjectStore;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Inputs for one scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub log_dir: PathBuf,
    pub options: ScanOptions,
    pub credentials: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub trigger: Option<String>,
    pub request_id: Option<String>,
    pub export: Option<PathBuf>,
    pub progress: bool,
}

pub async fn run(args: ScanArgs) -> Result<()> {
    let config = ScanConfig::from_options(&args.options)?;

    let sink: Arc<dyn NotificationSink> = match &args.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url.clone())?),
        None => {
            info!("No webhook configured, alerts will be written to stderr");
            Arc::new(LogSink::default())
        }
    };

    let store = Arc::new(FsObjectStore::new(&args.log_dir));
    let mut orchestrator = ScanOrchestrator::new(config, store, sink).with_progress(args.progress);

    if let Some(path) = &args.credentials {
        let directory = InventoryDirectory::load(path)?;
        info!(
            principals = directory.principal_count(),
            "Loaded access key inventory"
        );
        orchestrator = orchestrator.with_credentials(Arc::new(directory));
    }

    let trigger = parse_trigger(args.trigger.as_deref());
    let ctx = InvocationContext {
        request_id: args.request_id.clone(),
    };

    let (result, summary) = handle_invocation(&trigger, &ctx, &mut orchestrator).await?;

    if let Some(path) = &args.export {
        export_alerts(path, &summary.alerts)?;
        info!(path = %path.display(), alerts = summary.alerts.len(), "Exported alert report");
    }

    println!(
        "{}",
        serde_json::to_string(&result).context("Failed to serialize invocation result")?
    );
    Ok(())
}

/// Parses the trigger payload; anything that is not JSON is kept as a string.
fn parse_trigger(raw: Option<&str>) -> Value {
    match raw {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        None => Value::Object(serde_json::Map::new()),
    }
}

/// Writes one CSV row per dispatched alert.
pub fn export_alerts(path: &std::path::Path, alerts: &[AlertReport]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    for alert in alerts {
        writer
            .serialize(alert)
            .context("Failed to write CSV record")?;
    }
    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::AlertKind;
    use tempfile::TempDir;

    #[test]
    fn test_parse_trigger() {
        assert_eq!(parse_trigger(None), serde_json::json!({}));
        assert_eq!(
            parse_trigger(Some(r#"{"source": "aws.events"}"#)),
            serde_json::json!({"source": "aws.events"})
        );
        assert_eq!(parse_trigger(Some("cron")), Value::String("cron".to_string()));
    }

    #[test]
    fn test_export_alerts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.csv");
        let alerts = vec![
            AlertReport {
                kind: AlertKind::FailedLoginCluster,
                principal: Some("alice".to_string()),
                subject: "ALERT: 5 failed console logins for user alice".to_string(),
                published: true,
                error: None,
            },
            AlertReport {
                kind: AlertKind::RootSignin,
                principal: None,
                subject: "ALERT: Root console sign-in detected".to_string(),
                published: false,
                error: Some("timeout".to_string()),
            },
        ];

        export_alerts(&path, &alerts).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "kind,principal,subject,published,error");
        assert_eq!(
            lines[1],
            "failed_login_cluster,alice,ALERT: 5 failed console logins for user alice,true,"
        );
        assert_eq!(
            lines[2],
            "root_signin,,ALERT: Root console sign-in detected,false,timeout"
        );
    }
}
