//! HTTP service wiring for pdf2img (spec.md §4.7, §6): axum router,
//! request/response DTOs, and the `ApiError` HTTP boundary. Grounded on
//! `riptide-api::main`'s router/middleware assembly and
//! `riptide-api::errors::ApiError`'s kind-to-status mapping. The
//! dev/ops CLI front-end (`src/bin/pdf2img_cli.rs`) reuses the same
//! `pdf2img_dispatcher::Dispatcher` directly, without going through HTTP.

pub mod dto;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use state::AppState;
