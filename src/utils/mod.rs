//! Utility functions and helpers.
//!
//! - [`progress`] - Progress display while log objects are decoded
//! - [`reader`] - Blob reader with automatic decompression
//! - [`time`] - Timestamp parsing and formatting helpers
//!
//! # Examples
//!
//! ```no_run
//! use trail_audit_alerts::utils::time::parse_timestamp;
//!
//! let timestamp = parse_timestamp("2025-10-20T10:30:00Z").unwrap();
//! println!("Parsed: {}", timestamp);
//! ```

pub mod progress;
pub mod reader;
pub mod time;
