use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::json;

/// `GET /workers` (spec.md §4.7): WorkerPool `stats()` plus the
/// RenderSemaphore's own admission status, for operator visibility into
/// both layers of backpressure.
pub async fn workers(State(state): State<AppState>) -> Json<serde_json::Value> {
    let pool_stats = state.pool.stats();
    let sem_status = state.semaphore.status();
    Json(json!({
        "workers": {
            "count": pool_stats.workers,
            "queued": pool_stats.queued,
            "completed": pool_stats.completed,
            "utilization": pool_stats.utilization,
        },
        "semaphore": {
            "maxInflight": sem_status.max_inflight,
            "inFlight": sem_status.in_flight,
            "queueLen": sem_status.queue_len,
            "queueLimit": sem_status.queue_limit,
        }
    }))
}
