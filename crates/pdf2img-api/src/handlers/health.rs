use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

/// `GET /health` (spec.md §4.7, §6): 200 when the HealthMonitor reports
/// healthy, 503 otherwise — mirroring `riptide-api::health::HealthChecker`'s
/// overall-healthy-iff-every-dimension-healthy contract.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let status = state.health.check().await;
    let code = if status.healthy { 200 } else { 503 };
    let body = json!({
        "code": code,
        "message": if status.healthy { "ok" } else { "overloaded" },
        "data": {
            "healthy": status.healthy,
            "status": if status.healthy { "healthy" } else { "overloaded" },
            "reasons": status.reasons,
            "metrics": {
                "cpu": status.metrics.cpu_pct,
                "memory": status.metrics.mem_pct,
                "processRssMb": status.metrics.process_rss_mb,
            },
            "uptime": state.uptime().as_secs(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }
    });
    let status_code = StatusCode::from_u16(code).unwrap_or(StatusCode::OK);
    (status_code, Json(body))
}
