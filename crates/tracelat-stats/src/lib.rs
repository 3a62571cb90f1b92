//! Aggregation of hop latency across repeated trace runs.

pub mod summary;

pub use summary::{summarize, SUMMARY_VERSION};
