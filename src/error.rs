//! Error types for the scan pipeline.
//!
//! Each collaborator has its own error enum. [`ScanError`] is the taxonomy
//! the orchestrator reports: only [`ScanError::WindowOutOfRange`] and
//! [`ScanError::StoreListing`] abort an invocation, every other variant is
//! recovered locally and logged.

use thiserror::Error;

/// Failure talking to the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Failure turning one log object into audit records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to fetch object: {0}")]
    Fetch(#[from] StoreError),

    #[error("failed to decompress object: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("object is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("object has no top-level Records array")]
    MissingRecords,
}

/// Failure looking up a principal's credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The principal does not exist, e.g. it was deleted after the event was
    /// logged. Not an error condition for the scan.
    #[error("principal not found: {0}")]
    NotFound(String),

    #[error("credential lookup failed: {0}")]
    Other(String),
}

/// Failure delivering one alert.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sink rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The window start falls outside the representable date range; aborts
    /// the invocation.
    #[error("scan window of {window_hours} hours ending {now} is out of range")]
    WindowOutOfRange {
        window_hours: u32,
        now: chrono::NaiveDateTime,
    },

    /// Scope of work cannot be determined; aborts the invocation.
    #[error("failed to list log objects in {bucket}: {source}")]
    StoreListing {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to decode {key}: {source}")]
    ObjectDecode {
        key: String,
        #[source]
        source: DecodeError,
    },

    #[error("credential check for {principal} failed: {source}")]
    CredentialLookup {
        principal: String,
        #[source]
        source: CredentialError,
    },

    #[error("failed to publish alert '{subject}': {source}")]
    Publish {
        subject: String,
        #[source]
        source: PublishError,
    },
}
