//! HTTP boundary error type (spec.md §7), mirroring
//! `riptide-api::errors::ApiError`'s kind-to-status mapping and
//! structured-JSON-body `IntoResponse` impl.

use crate::dto::DtoError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdf2img_pool::HealthMetrics;
use pdf2img_types::{ConvertError, ErrorKind};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// `Some` only for the two overload kinds (spec.md §6's 503 body).
    pub retry_after_secs: Option<u64>,
    /// Individual rejection reasons, shown verbatim in the overloaded/busy
    /// body's `reasons` array (spec.md §6).
    pub reasons: Vec<String>,
    /// Sampled CPU/memory at rejection time, `Some` only when the
    /// HealthMonitor itself produced the rejection.
    pub metrics: Option<HealthMetrics>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::InvalidInput,
            reasons: vec![message.clone()],
            message,
            retry_after_secs: None,
            metrics: None,
        }
    }

    /// Builds the `Overloaded` rejection carrying the HealthMonitor's
    /// sampled metrics, so the 503 body's `data.metrics` reflects the
    /// measurement that actually triggered the rejection (spec.md §6).
    pub fn overloaded(reasons: Vec<String>, metrics: HealthMetrics) -> Self {
        Self {
            kind: ErrorKind::Overloaded,
            message: reasons.join("; "),
            retry_after_secs: Some(5),
            reasons,
            metrics: Some(metrics),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind.http_status() {
            Some(200) => StatusCode::OK,
            Some(400) => StatusCode::BAD_REQUEST,
            Some(408) => StatusCode::REQUEST_TIMEOUT,
            Some(502) => StatusCode::BAD_GATEWAY,
            Some(503) => StatusCode::SERVICE_UNAVAILABLE,
            Some(500) | None => StatusCode::INTERNAL_SERVER_ERROR,
            Some(other) => StatusCode::from_u16(other).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        let retry_after_secs = match err.kind {
            ErrorKind::Overloaded => Some(5),
            ErrorKind::QueueFull => Some(2),
            _ => None,
        };
        Self {
            kind: err.kind,
            reasons: vec![err.message.clone()],
            message: err.message,
            retry_after_secs,
            metrics: None,
        }
    }
}

impl From<DtoError> for ApiError {
    fn from(err: DtoError) -> Self {
        Self::validation(err.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                tracing::error!(kind = %self.kind, message = %self.message, "request failed");
            }
            StatusCode::BAD_REQUEST => {
                tracing::warn!(kind = %self.kind, message = %self.message, "client error");
            }
            _ => {
                tracing::info!(kind = %self.kind, message = %self.message, "request error");
            }
        }

        let data = match (self.kind, self.retry_after_secs) {
            (ErrorKind::Overloaded, Some(retry_after)) | (ErrorKind::QueueFull, Some(retry_after)) => {
                let metrics = self.metrics.as_ref().map(|m| {
                    json!({
                        "cpu": m.cpu_pct,
                        "memory": m.mem_pct,
                        "processRssMb": m.process_rss_mb,
                    })
                });
                json!({
                    "reasons": self.reasons.clone(),
                    "metrics": metrics,
                    "retryAfter": retry_after,
                })
            }
            _ => json!(null),
        };

        let message = match self.kind {
            ErrorKind::Overloaded => "Service is overloaded, please try again later".to_string(),
            ErrorKind::QueueFull => "Service is busy, please try again later".to_string(),
            _ => self.message,
        };

        let body = Json(json!({
            "code": status.as_u16(),
            "message": message,
            "data": data,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
