//! Command implementations for the `trail-audit` binary.
//!
//! - [`scan`] - run one scan invocation against a trail bucket and publish
//!   alerts

pub mod scan;
