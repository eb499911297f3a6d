//! Directory-backed object store.
//!
//! Each bucket is a directory under the store root. Keys are the
//! `/`-separated paths of regular files relative to the bucket directory,
//! which matches the layout `aws s3 sync` produces for a trail bucket:
//!
//! ```text
//! <root>/<bucket>/AWSLogs/123456789012/CloudTrail/us-east-1/2025/10/07/...json.gz
//! ```
//!
//! Listings are returned in key order and paginated so the window selector
//! exercises the same continuation logic it needs against a remote store.
//! The bucket tree is walked once per listing: the first page takes a
//! snapshot and continuation pages are served from it.

use super::{ObjectPage, ObjectStore, ObjectSummary};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Sorted keys of one bucket, taken when a listing starts.
#[derive(Debug)]
struct Snapshot {
    bucket: String,
    objects: Arc<Vec<ObjectSummary>>,
}

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    page_size: usize,
    snapshot: Arc<Mutex<Option<Snapshot>>>,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: DEFAULT_PAGE_SIZE,
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the maximum number of objects per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(bucket);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::BucketNotFound(bucket.to_string()))
        }
    }

    fn collect_keys(
        dir: &Path,
        prefix: &str,
        out: &mut Vec<ObjectSummary>,
    ) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;

        for entry in entries {
            let entry = entry.map_err(|source| io_error(dir, source))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };

            let metadata = entry.metadata().map_err(|source| io_error(&path, source))?;
            if metadata.is_dir() {
                Self::collect_keys(&path, &key, out)?;
            } else if metadata.is_file() {
                let modified = metadata
                    .modified()
                    .map_err(|source| io_error(&path, source))?;
                out.push(ObjectSummary {
                    key,
                    last_modified: DateTime::<Utc>::from(modified).fixed_offset(),
                });
            }
        }

        Ok(())
    }

    /// Keys for one page of a listing. A fresh listing walks the bucket;
    /// continuation pages reuse the snapshot of the listing they belong to.
    fn listing(
        &self,
        bucket: &str,
        continuation: Option<&str>,
    ) -> Result<Arc<Vec<ObjectSummary>>, StoreError> {
        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::Other("listing snapshot lock poisoned".to_string()))?;

        if continuation.is_some() {
            if let Some(current) = snapshot.as_ref().filter(|s| s.bucket == bucket) {
                return Ok(Arc::clone(&current.objects));
            }
        }

        let dir = self.bucket_dir(bucket)?;
        let mut all = Vec::new();
        Self::collect_keys(&dir, "", &mut all)?;
        all.sort_by(|a, b| a.key.cmp(&b.key));

        let objects = Arc::new(all);
        *snapshot = Some(Snapshot {
            bucket: bucket.to_string(),
            objects: Arc::clone(&objects),
        });
        Ok(objects)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<&str>,
    ) -> Result<ObjectPage, StoreError> {
        let all = self.listing(bucket, continuation)?;

        let start = match continuation {
            Some(token) => all.partition_point(|obj| obj.key.as_str() <= token),
            None => 0,
        };
        let objects: Vec<ObjectSummary> =
            all.iter().skip(start).take(self.page_size).cloned().collect();

        let next_token = if start + objects.len() < all.len() {
            objects.last().map(|obj| obj.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let dir = self.bucket_dir(bucket)?;
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(StoreError::ObjectNotFound(key.to_string()));
        }

        let path = dir.join(key);
        if !path.is_file() {
            return Err(StoreError::ObjectNotFound(key.to_string()));
        }
        fs::read(&path).map_err(|source| io_error(&path, source))
    }
}
