//! Access key age checks.
//!
//! The [`CredentialAgeChecker`] asks a [`CredentialDirectory`] for every
//! long-lived credential a principal owns and reports those at or past the
//! configured maximum age.
//!
//! [`InventoryDirectory`] is a file-backed directory built from an access key
//! inventory in the shape IAM's `ListAccessKeys` returns:
//!
//! ```json
//! {
//!   "AccessKeyMetadata": [
//!     {"UserName": "bob", "AccessKeyId": "AKIAEXAMPLE", "Status": "Active",
//!      "CreateDate": "2025-07-08T12:00:00Z"}
//!   ]
//! }
//! ```

use crate::error::CredentialError;
use crate::utils::time::parse_timestamp;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One credential owned by a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub credential_id: String,
    /// Creation instant, naive UTC.
    pub created_at: NaiveDateTime,
}

/// A credential at or past the maximum age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialFinding {
    pub principal: String,
    pub credential_id: String,
    pub age_days: i64,
}

/// Lookup of the credentials a principal owns.
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// Fails with [`CredentialError::NotFound`] when the principal is unknown.
    async fn list_credentials(
        &self,
        principal: &str,
    ) -> Result<Vec<CredentialRecord>, CredentialError>;
}

/// Flags credentials whose age reaches `max_age_days`.
#[derive(Clone)]
pub struct CredentialAgeChecker {
    directory: Arc<dyn CredentialDirectory>,
    max_age_days: i64,
}

impl CredentialAgeChecker {
    pub fn new(directory: Arc<dyn CredentialDirectory>, max_age_days: i64) -> Self {
        Self {
            directory,
            max_age_days,
        }
    }

    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }

    /// Returns the findings for `principal` as of `now`.
    ///
    /// An unknown principal yields no findings. Any other lookup failure is
    /// returned for the caller to log and skip.
    pub async fn check_age(
        &self,
        principal: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<CredentialFinding>, CredentialError> {
        let credentials = match self.directory.list_credentials(principal).await {
            Ok(credentials) => credentials,
            Err(CredentialError::NotFound(_)) => {
                debug!(principal, "Principal no longer exists, skipping key age check");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        Ok(credentials
            .into_iter()
            .filter_map(|credential| {
                let age_days = now.signed_duration_since(credential.created_at).num_days();
                (age_days >= self.max_age_days).then(|| CredentialFinding {
                    principal: principal.to_string(),
                    credential_id: credential.credential_id,
                    age_days,
                })
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccessKeyInventory {
    access_key_metadata: Vec<AccessKeyMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccessKeyMetadata {
    user_name: String,
    access_key_id: String,
    #[allow(dead_code)]
    status: Option<String>,
    create_date: String,
}

/// Credential directory loaded from an access key inventory file.
#[derive(Debug, Clone, Default)]
pub struct InventoryDirectory {
    keys: HashMap<String, Vec<CredentialRecord>>,
}

impl InventoryDirectory {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credential inventory: {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse credential inventory: {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let inventory: AccessKeyInventory = serde_json::from_str(contents)?;
        let mut keys: HashMap<String, Vec<CredentialRecord>> = HashMap::new();

        for key in inventory.access_key_metadata {
            let created = parse_timestamp(&key.create_date).with_context(|| {
                format!(
                    "Invalid CreateDate for access key {}: {}",
                    key.access_key_id, key.create_date
                )
            })?;
            keys.entry(key.user_name).or_default().push(CredentialRecord {
                credential_id: key.access_key_id,
                created_at: created.naive_utc(),
            });
        }

        Ok(Self { keys })
    }

    pub fn principal_count(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait]
impl CredentialDirectory for InventoryDirectory {
    async fn list_credentials(
        &self,
        principal: &str,
    ) -> Result<Vec<CredentialRecord>, CredentialError> {
        self.keys
            .get(principal)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound(principal.to_string()))
    }
}
