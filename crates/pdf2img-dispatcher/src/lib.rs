//! Per-request page planning, batch submission, and result collation
//! (spec.md §4.5). Generalizes
//! `riptide-api::handlers::pdf::process_pdf`'s resource-guard acquisition
//! and `ResourceResult` match-dispatch from whole-document processing to
//! per-batch page planning.

pub mod config;
pub mod dispatcher;
pub mod plan;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
