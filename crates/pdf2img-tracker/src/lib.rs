//! Per-request phase timings, discrete events, and process-wide aggregate
//! metrics (spec.md §4.6). Grounded on `riptide-api::resource_manager`'s
//! atomic-counter aggregation pattern and `riptide-fetch`'s use of
//! `hdrhistogram` for percentile tracking.

pub mod aggregate;
pub mod phase;
pub mod request_tracker;

pub use aggregate::{Aggregates, MetricsSnapshot, Outcome};
pub use phase::{Event, Phase};
pub use request_tracker::{RequestSummary, RequestTracker};
