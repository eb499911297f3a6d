//! Blob reader with automatic decompression.
//!
//! CloudTrail delivers log objects gzip-compressed (`.json.gz`). Archived
//! trails re-compressed with zstd (`.json.zst`) are handled as well.
//!
//! # Examples
//!
//! ```no_run
//! use trail_audit_alerts::utils::reader::open_blob;
//! use std::io::Read;
//!
//! let bytes = std::fs::read("trail.json.gz").unwrap();
//! let mut reader = open_blob("trail.json.gz", &bytes).unwrap();
//! let mut contents = String::new();
//! reader.read_to_string(&mut contents).unwrap();
//! ```

use flate2::read::GzDecoder;
use std::io::{self, Read};

/// Compression container of a log object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Zstd,
}

impl Codec {
    /// Picks the codec from the object key.
    ///
    /// `.zst` selects zstd; every other key is treated as gzip, the format
    /// CloudTrail writes.
    pub fn for_key(key: &str) -> Self {
        if key.ends_with(".zst") {
            Self::Zstd
        } else {
            Self::Gzip
        }
    }
}

/// Wraps `bytes` in a decompressing reader chosen from `key`.
pub fn open_blob<'a>(key: &str, bytes: &'a [u8]) -> io::Result<Box<dyn Read + Send + 'a>> {
    match Codec::for_key(key) {
        Codec::Gzip => Ok(Box::new(GzDecoder::new(bytes))),
        Codec::Zstd => Ok(Box::new(zstd::Decoder::new(bytes)?)),
    }
}
