//! Selection of log objects modified inside the scan window.

use super::ObjectStore;
use crate::error::StoreError;
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

/// Start of the window of `window_hours` ending at `now`.
///
/// `None` when the start falls before the earliest representable instant.
pub fn window_start(now: NaiveDateTime, window_hours: u32) -> Option<NaiveDateTime> {
    now.checked_sub_signed(Duration::hours(i64::from(window_hours)))
}

/// A log object chosen for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogObjectRef {
    pub key: String,
    /// Last-modified instant, normalized to naive UTC.
    pub last_modified: NaiveDateTime,
}

/// Enumerates objects in one bucket whose modification time falls inside a
/// trailing window.
pub struct LogWindowSelector<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> LogWindowSelector<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }

    /// Returns every object with `last_modified >= cutoff`.
    ///
    /// Follows continuation tokens until the listing is exhausted. Any
    /// listing error is returned as-is; the caller treats it as fatal.
    pub async fn select(&self, cutoff: NaiveDateTime) -> Result<Vec<LogObjectRef>, StoreError> {
        let mut selected = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;
        let mut listed = 0usize;

        loop {
            let page = self
                .store
                .list_objects(self.bucket, continuation.as_deref())
                .await?;
            pages += 1;
            listed += page.objects.len();

            selected.extend(
                page.objects
                    .into_iter()
                    .map(|obj| LogObjectRef {
                        key: obj.key,
                        last_modified: obj.last_modified.naive_utc(),
                    })
                    .filter(|obj| obj.last_modified >= cutoff),
            );

            match page.next_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        debug!(
            bucket = self.bucket,
            pages,
            listed,
            selected = selected.len(),
            %cutoff,
            "Selected log objects in window"
        );

        Ok(selected)
    }
}
