//! Decoding of CloudTrail log objects into audit records.

use crate::audit::types::AuditRecord;
use crate::error::DecodeError;
use crate::store::{LogObjectRef, ObjectStore};
use crate::utils::reader::open_blob;
use serde::Deserialize;
use serde_json::Value;
use std::io::{BufReader, Read};

/// Top-level shape of a CloudTrail log document.
#[derive(Debug, Deserialize)]
struct TrailDocument {
    #[serde(rename = "Records")]
    records: Option<Vec<Value>>,
}

/// Decompresses and parses one log object's bytes.
///
/// The document must be a JSON object with a `Records` array. Elements of
/// the array are wrapped as-is; their fields are read leniently later on.
pub fn decode(key: &str, bytes: &[u8]) -> Result<Vec<AuditRecord>, DecodeError> {
    let reader = open_blob(key, bytes).map_err(DecodeError::Decompress)?;
    let mut contents = Vec::new();
    BufReader::new(reader)
        .read_to_end(&mut contents)
        .map_err(DecodeError::Decompress)?;

    let document: TrailDocument = serde_json::from_slice(&contents)?;
    let records = document.records.ok_or(DecodeError::MissingRecords)?;

    Ok(records.into_iter().map(AuditRecord::from_value).collect())
}

/// Fetches one object and decodes it.
pub async fn fetch_and_decode(
    store: &dyn ObjectStore,
    bucket: &str,
    object: &LogObjectRef,
) -> Result<Vec<AuditRecord>, DecodeError> {
    let bytes = store.get_object(bucket, &object.key).await?;
    decode(&object.key, &bytes)
}
