//! Object store access for CloudTrail log objects.
//!
//! - [`ObjectStore`] - the listing/retrieval contract the scan depends on
//! - [`fs`] - a directory-backed store for local mirrors of a trail bucket
//! - [`window`] - selection of objects modified inside the scan window

pub mod fs;
pub mod window;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

pub use fs::FsObjectStore;
pub use window::{window_start, LogObjectRef, LogWindowSelector};

/// Listing metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    /// Timezone-aware as reported by the store.
    pub last_modified: DateTime<FixedOffset>,
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page; `None` when the listing is exhausted.
    pub next_token: Option<String>,
}

/// A bucket-style object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of objects in `bucket`, starting after `continuation`.
    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<&str>,
    ) -> Result<ObjectPage, StoreError>;

    /// Fetches the full contents of one object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}
