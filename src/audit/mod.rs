//! CloudTrail audit record parsing.
//!
//! - [`types`] - the [`AuditRecord`] view over one `Records` entry
//! - [`parser`] - decompression and parsing of whole log objects

pub mod parser;
pub mod types;

pub use types::{AuditRecord, IdentityType, CONSOLE_LOGIN};
