//! Invocation entry point.
//!
//! An external scheduler triggers one scan per invocation. The trigger
//! payload is opaque: it is logged and otherwise ignored.

use crate::error::ScanError;
use crate::scan::{ScanOrchestrator, ScanSummary};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

const TRIGGER_LOG_LIMIT: usize = 1000;

/// Metadata about the current invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: Option<String>,
}

/// Structured result returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status: String,
    pub processed_files: usize,
}

impl From<&ScanSummary> for InvocationResult {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            status: "done".to_string(),
            processed_files: summary.processed_files,
        }
    }
}

/// Runs one scan for a trigger and returns the invocation result with the
/// full summary.
pub async fn handle_invocation(
    trigger: &Value,
    ctx: &InvocationContext,
    orchestrator: &mut ScanOrchestrator,
) -> Result<(InvocationResult, ScanSummary), ScanError> {
    info!(
        request_id = ctx.request_id.as_deref().unwrap_or("-"),
        "Invoked with event: {}",
        truncate(&trigger.to_string(), TRIGGER_LOG_LIMIT)
    );

    let summary = orchestrator.run().await?;
    Ok((InvocationResult::from(&summary), summary))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_camel_case() {
        let result = InvocationResult {
            status: "done".to_string(),
            processed_files: 3,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"status":"done","processedFiles":3}"#
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
    }
}
