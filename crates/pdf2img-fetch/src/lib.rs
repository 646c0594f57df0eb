//! RangeLoader (spec.md §4.4): fetches a remote PDF's bytes via chunked
//! HTTP byte-range requests so rendering of the first pages can start
//! before the whole document has been transferred.
//!
//! Retry/backoff shape is grounded on
//! `riptide-fetch::fetch::{ReliableHttpClient, RetryConfig}`.

pub mod config;
pub mod loader;
pub mod retry;
pub mod stats;

pub use config::RangeLoaderConfig;
pub use loader::RangeLoader;
pub use retry::RetryConfig;
pub use stats::RangeLoaderStats;
