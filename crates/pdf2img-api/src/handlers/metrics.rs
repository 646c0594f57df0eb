use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::json;

/// `GET /metrics` (spec.md §4.7): returns the process-wide aggregate
/// snapshot (spec.md §4.6) as JSON.
pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snap = state.metrics.snapshot();
    Json(json!({
        "successCount": snap.success_count,
        "clientErrorCount": snap.client_error_count,
        "timeoutCount": snap.timeout_count,
        "overloadCount": snap.overload_count,
        "responseP50Ms": snap.response_p50_ms,
        "responseP90Ms": snap.response_p90_ms,
        "responseP99Ms": snap.response_p99_ms,
        "pageRenderP50Ms": snap.page_render_p50_ms,
        "pageRenderP99Ms": snap.page_render_p99_ms,
        "rangeBytesTotal": snap.range_bytes_total,
        "rangeRequestCount": snap.range_request_count,
        "workerTaskCount": snap.worker_task_count,
        "workerAvgExecMs": snap.worker_avg_exec_ms,
        "inFlightCurrent": snap.in_flight_current,
        "inFlightPeak": snap.in_flight_peak,
    }))
}
